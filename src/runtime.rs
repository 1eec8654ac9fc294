//! Event pump for the live screen.
//!
//! Terminal input arrives over a channel from a reader thread; a quiet
//! interval turns into `Tick` so clocks on screen keep moving.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::live::LiveApp;
use crate::store::PersistentStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the tick interval
    Tick,
    /// The input side hung up; the screen should close
    Closed,
}

pub struct EventPump {
    rx: Receiver<LiveEvent>,
    tick: Duration,
}

impl EventPump {
    /// Reads the real terminal on a background thread
    pub fn terminal(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || forward_terminal_events(tx));
        Self::from_channel(rx, tick)
    }

    /// Any producer works, e.g. a test feeding scripted keys
    pub fn from_channel(rx: Receiver<LiveEvent>, tick: Duration) -> Self {
        Self { rx, tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Blocks for at most one tick interval
    pub fn next_event(&self) -> LiveEvent {
        match self.rx.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => LiveEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => LiveEvent::Closed,
        }
    }
}

fn forward_terminal_events(tx: Sender<LiveEvent>) {
    loop {
        let ev = match event::read() {
            // Windows reports releases too
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => LiveEvent::Key(key),
            Ok(Event::Resize(_, _)) => LiveEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "terminal input failed");
                return;
            }
        };
        if tx.send(ev).is_err() {
            debug!("live screen gone, input reader stopping");
            return;
        }
    }
}

/// Redraws, waits for the next event and feeds it to `live` until the
/// user quits or input closes.
pub fn run_live<S, C, F>(live: &mut LiveApp<S, C>, pump: &EventPump, mut draw: F) -> io::Result<()>
where
    S: PersistentStore,
    C: Clock,
    F: FnMut(&LiveApp<S, C>) -> io::Result<()>,
{
    while !live.should_quit {
        draw(live)?;
        live.handle(pump.next_event());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::store::MemoryStore;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> LiveEvent {
        LiveEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn quiet_interval_is_a_tick() {
        let (_tx, rx) = mpsc::channel();
        let pump = EventPump::from_channel(rx, Duration::from_millis(1));
        assert_eq!(pump.next_event(), LiveEvent::Tick);
    }

    #[test]
    fn queued_events_come_first() {
        let (tx, rx) = mpsc::channel();
        tx.send(LiveEvent::Resize).unwrap();
        let pump = EventPump::from_channel(rx, Duration::from_millis(10));
        assert_eq!(pump.next_event(), LiveEvent::Resize);
        assert_eq!(pump.next_event(), LiveEvent::Tick);
    }

    #[test]
    fn hung_up_producer_closes() {
        let (tx, rx) = mpsc::channel::<LiveEvent>();
        drop(tx);
        let pump = EventPump::from_channel(rx, Duration::from_millis(10));
        assert_eq!(pump.next_event(), LiveEvent::Closed);
    }

    #[test]
    fn run_live_draws_until_quit() {
        let (tx, rx) = mpsc::channel();
        for c in "x 1".chars() {
            tx.send(key(KeyCode::Char(c))).unwrap();
        }
        tx.send(key(KeyCode::Enter)).unwrap();
        tx.send(key(KeyCode::Esc)).unwrap();
        let pump = EventPump::from_channel(rx, Duration::from_millis(5));
        let mut live = LiveApp::new(App::new(MemoryStore::new()), 6);

        let mut frames = 0;
        run_live(&mut live, &pump, |_| {
            frames += 1;
            Ok(())
        })
        .unwrap();

        assert!(live.should_quit);
        assert_eq!(frames, 5);
        assert_eq!(live.app.session.selected(), ["Bench Press"]);
    }

    #[test]
    fn run_live_stops_when_input_closes() {
        let (tx, rx) = mpsc::channel::<LiveEvent>();
        drop(tx);
        let pump = EventPump::from_channel(rx, Duration::from_millis(5));
        let mut live = LiveApp::new(App::new(MemoryStore::new()), 6);
        run_live(&mut live, &pump, |_| Ok(())).unwrap();
        assert!(live.should_quit);
    }
}
