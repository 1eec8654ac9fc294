// Library surface for the binary, headless/integration tests and reuse.
pub mod aggregate;
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod live;
pub mod model;
pub mod rest_timer;
pub mod runtime;
pub mod session;
pub mod store;
pub mod time_series;
pub mod transfer;
pub mod ui;
pub mod util;

pub use app::App;
pub use error::{Error, Result};
