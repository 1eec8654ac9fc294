use std::{
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use onerep::{
    aggregate::{self, AggMode, ProgressMode},
    app::App,
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    live::LiveApp,
    model::WorkoutSession,
    runtime::{self, EventPump},
    store::{FileStore, PersistentStore},
    transfer,
    util::{fmt_hms_ms, fmt_number},
};

/// log strength workouts from the terminal and review your progress
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Log sets, rest and RPE for a live workout in a terminal UI, then search history, chart progress and move your data between machines."
)]
pub struct Cli {
    /// directory holding workouts, exercise bank and profile
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// run a workout in the terminal UI (default)
    Live,

    /// list the most recent workouts
    Recent {
        /// how many workouts to show
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },

    /// find workouts by title/note text and exercise
    Search {
        #[clap(short, long, default_value = "")]
        query: String,

        #[clap(short, long, default_value = "")]
        exercise: String,
    },

    /// every exercise that has recorded sets
    Exercises,

    /// show or extend the exercise bank
    Bank {
        #[clap(subcommand)]
        action: Option<BankAction>,
    },

    /// volume trend for one exercise
    Progress {
        exercise: String,

        #[clap(short, long, value_enum, default_value_t = ProgressMode::Daily)]
        mode: ProgressMode,

        /// monthly reduction
        #[clap(short, long, value_enum, default_value_t = AggMode::Avg)]
        agg: AggMode,
    },

    /// totals over all workouts
    Stats,

    /// write everything to a JSON file
    Export {
        /// defaults to onerep-export-YYYY-MM-DD.json in the current directory
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// replace everything with the contents of an exported file
    Import { path: PathBuf },

    /// show or change the profile name
    Profile {
        #[clap(long)]
        first: Option<String>,

        #[clap(long)]
        last: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum BankAction {
    List,
    Add { name: Vec<String> },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = FileConfigStore::new().load();

    if let Err(e) = setup_logging(&config) {
        eprintln!("onerep: logging disabled: {e:#}");
    }
    setup_panic_handler();

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.resolved_data_dir());
    info!(data_dir = %data_dir.display(), "starting");
    let app = App::new(FileStore::with_dir(&data_dir));

    let result = match cli.command.clone().unwrap_or(Command::Live) {
        Command::Live => run_live(app, &config),
        command => run_command(app, command, &config, &mut io::stdout()),
    };
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::prelude::*;

    let log_dir = AppDirs::log_dir();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;

    let log_file = log_dir.join(format!(
        "onerep-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("opening {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .try_init()?;
    Ok(())
}

fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("panic: {panic_info}");
        // leave the terminal usable
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(panic_info);
    }));
}

fn run_live(app: App, config: &Config) -> anyhow::Result<()> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut live = LiveApp::new(app, config.recent_limit);
    let pump = EventPump::terminal(Duration::from_millis(config.tick_ms.max(1)));
    let result = start_tui(&mut terminal, &mut live, &pump);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: PersistentStore>(
    terminal: &mut Terminal<B>,
    live: &mut LiveApp<S, SystemClock>,
    pump: &EventPump,
) -> anyhow::Result<()> {
    runtime::run_live(live, pump, |live| {
        terminal.draw(|f| f.render_widget(live, f.area()))?;
        Ok(())
    })?;
    Ok(())
}

fn describe(w: &WorkoutSession) -> String {
    let title = if w.title.is_empty() { "-" } else { w.title.as_str() };
    format!(
        "{}  {:<24}  {:>3} sets  {}",
        w.date,
        title,
        w.sets.len(),
        fmt_hms_ms(w.duration_ms)
    )
}

fn run_command<S: PersistentStore, W: io::Write>(
    mut app: App<S>,
    command: Command,
    config: &Config,
    out: &mut W,
) -> anyhow::Result<()> {
    let history = &app.history;
    match command {
        Command::Live => bail!("the live session needs a terminal"),
        Command::Recent { limit } => {
            for w in history.recent(limit.unwrap_or(config.recent_limit)) {
                writeln!(out, "{}", describe(w))?;
            }
        }
        Command::Search { query, exercise } => {
            let found = aggregate::filter(history.sessions(), &query, &exercise);
            for w in &found {
                writeln!(out, "{}", describe(w))?;
            }
            writeln!(out, "{} workouts", found.len())?;
        }
        Command::Exercises => {
            for name in aggregate::exercise_universe(history.sessions()) {
                writeln!(out, "{name}")?;
            }
        }
        Command::Bank { action } => match action.unwrap_or(BankAction::List) {
            BankAction::List => {
                for (i, name) in history.exercise_bank().iter().enumerate() {
                    writeln!(out, "{:>3}  {name}", i + 1)?;
                }
            }
            BankAction::Add { name } => {
                let name = name.join(" ");
                if name.trim().is_empty() {
                    bail!("exercise name is empty");
                }
                if app.history.add_exercise_to_bank(&name)? {
                    writeln!(out, "added {}", name.trim())?;
                } else {
                    writeln!(out, "{} is already in the bank", name.trim())?;
                }
            }
        },
        Command::Progress {
            exercise,
            mode,
            agg,
        } => {
            let series = aggregate::progress_series(history.sessions(), &exercise, mode, agg);
            if series.is_empty() {
                writeln!(out, "no sets recorded for {exercise}")?;
            }
            let highest = series.iter().map(|p| p.value).fold(0.0_f64, f64::max);
            for point in &series {
                let bar = if highest > 0.0 {
                    (point.value / highest * 40.0).round() as usize
                } else {
                    0
                };
                writeln!(
                    out,
                    "{:<10}  {:>10}  {}",
                    point.label,
                    fmt_number(point.value),
                    "█".repeat(bar)
                )?;
            }
        }
        Command::Stats => {
            let stats = aggregate::overall_stats(history.sessions());
            writeln!(out, "workouts  {}", stats.workouts)?;
            writeln!(out, "time      {}", fmt_hms_ms(stats.total_duration_ms))?;
            writeln!(
                out,
                "avg RPE   {}",
                stats.avg_rpe.map(fmt_number).unwrap_or_else(|| "-".into())
            )?;
        }
        Command::Export { output } => {
            let json = app.export_json()?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(transfer::export_file_name(chrono::Local::now().date_naive()))
            });
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            writeln!(out, "exported {} workouts to {}", history.sessions().len(), path.display())?;
        }
        Command::Import { path } => {
            let json =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let snapshot = app
                .import_json(&json)
                .with_context(|| format!("importing {}", path.display()))?;
            writeln!(
                out,
                "imported {} workouts, {} exercises",
                snapshot.sessions.len(),
                snapshot.exercise_bank.len()
            )?;
        }
        Command::Profile { first, last } => {
            if first.is_some() || last.is_some() {
                app.history.set_profile(
                    first.as_deref().unwrap_or(""),
                    last.as_deref().unwrap_or(""),
                )?;
            }
            let profile = app.history.profile();
            writeln!(out, "{} ({})", profile.display_name(), profile.initials())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use onerep::store::MemoryStore;

    fn run(app: &App<MemoryStore>, args: &[&str]) -> String {
        let cli = Cli::parse_from(std::iter::once("onerep").chain(args.iter().copied()));
        let command = cli.command.unwrap_or(Command::Live);
        let store = app.history.store().clone();
        let mut out = Vec::new();
        run_command(App::new(store), command, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn app_with_workout() -> App<MemoryStore> {
        let mut app = App::new(MemoryStore::new());
        app.session.select_exercise("Squat").unwrap();
        app.session.set_title("Leg Squat Day");
        app.session
            .add_set("Squat", 100.0, 5.0, Some(8.0), "belt")
            .unwrap();
        app.finish_workout().unwrap();
        app
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["onerep"]);
        assert_eq!(cli.data_dir, None);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_cli_data_dir_is_global() {
        let cli = Cli::parse_from(["onerep", "recent", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.command, Some(Command::Recent { limit: None }));
    }

    #[test]
    fn test_cli_progress_flags() {
        let cli = Cli::parse_from(["onerep", "progress", "Squat", "-m", "monthly", "-a", "max"]);
        assert_eq!(
            cli.command,
            Some(Command::Progress {
                exercise: "Squat".into(),
                mode: ProgressMode::Monthly,
                agg: AggMode::Max,
            })
        );

        let cli = Cli::parse_from(["onerep", "progress", "Squat"]);
        assert!(matches!(
            cli.command,
            Some(Command::Progress {
                mode: ProgressMode::Daily,
                agg: AggMode::Avg,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["onerep", "progress", "Squat", "-m", "weekly"]).is_err());
    }

    #[test]
    fn test_cli_bank_add_joins_words() {
        let cli = Cli::parse_from(["onerep", "bank", "add", "Hip", "Thrust"]);
        assert_eq!(
            cli.command,
            Some(Command::Bank {
                action: Some(BankAction::Add {
                    name: vec!["Hip".into(), "Thrust".into()]
                })
            })
        );
    }

    #[test]
    fn test_recent_and_search_output() {
        let app = app_with_workout();
        let out = run(&app, &["recent"]);
        assert!(out.contains("Leg Squat Day"));

        let out = run(&app, &["search", "-q", "squat"]);
        assert!(out.contains("1 workouts"));
        let out = run(&app, &["search", "-q", "push"]);
        assert!(out.contains("0 workouts"));
    }

    #[test]
    fn test_progress_and_stats_output() {
        let app = app_with_workout();
        let out = run(&app, &["progress", "Squat"]);
        assert!(out.contains("500"));
        let out = run(&app, &["stats"]);
        assert!(out.contains("workouts  1"));
        assert!(out.contains("avg RPE   8"));
    }

    #[test]
    fn test_profile_update_keeps_blank_fields() {
        let app = App::new(MemoryStore::new());
        let out = run(&app, &["profile", "--first", "Ada"]);
        assert!(out.contains("Ada Last"));
    }

    #[test]
    fn test_live_command_is_rejected_headless() {
        let app = App::new(MemoryStore::new());
        let mut out = Vec::new();
        assert!(run_command(app, Command::Live, &Config::default(), &mut out).is_err());
    }
}
