use std::sync::mpsc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use onerep::app::App;
use onerep::clock::ManualClock;
use onerep::live::{LiveApp, Screen};
use onerep::runtime::{run_live, EventPump, LiveEvent};
use onerep::store::MemoryStore;

fn send_line(tx: &mpsc::Sender<LiveEvent>, line: &str) {
    for c in line.chars() {
        tx.send(LiveEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
            .unwrap();
    }
    tx.send(LiveEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
}

fn drive(live: &mut LiveApp<MemoryStore, ManualClock>, pump: &EventPump) {
    for _ in 0..500u32 {
        match pump.next_event() {
            // channel drained
            LiveEvent::Tick => break,
            ev => live.handle(ev),
        }
        if live.should_quit {
            break;
        }
    }
}

// Drives a whole workout through the event pump without a TTY
#[test]
fn headless_workout_is_saved() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap());
    let app = App::with_clock(MemoryStore::new(), clock.clone());
    let mut live = LiveApp::new(app, 6);

    let (tx, rx) = mpsc::channel();
    let pump = EventPump::from_channel(rx, Duration::from_millis(5));

    send_line(&tx, "x Bench Press");
    send_line(&tx, "x Dip");
    send_line(&tx, "title Push Day");
    send_line(&tx, "start");
    drive(&mut live, &pump);
    assert_eq!(live.app.session.selected(), ["Bench Press", "Dip"]);

    clock.advance_secs(300);
    send_line(&tx, "set 1 80 8 7.5");
    send_line(&tx, "rest");
    drive(&mut live, &pump);

    clock.advance_secs(90);
    send_line(&tx, "rest");
    send_line(&tx, "set 2 0 12 - bodyweight");
    send_line(&tx, "done");
    drive(&mut live, &pump);
    assert_eq!(live.screen, Screen::Summary);

    tx.send(LiveEvent::Key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE)))
        .unwrap();
    tx.send(LiveEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();
    let mut frames = 0;
    run_live(&mut live, &pump, |_| {
        frames += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(frames, 2);

    assert!(live.should_quit);
    let sessions = live.app.history.sessions();
    assert_eq!(sessions.len(), 1);
    let workout = &sessions[0];
    assert_eq!(workout.title, "Push Day");
    assert_eq!(workout.duration_ms, 390_000);
    assert_eq!(workout.sets.len(), 2);
    assert_eq!(workout.sets[0].rest_sec, 0);
    assert_eq!(workout.sets[1].rest_sec, 90);
    assert_eq!(workout.sets[1].note, "bodyweight");
    assert_eq!(workout.sets[1].rpe, None);
}

#[test]
fn headless_pause_freezes_elapsed() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap());
    let app = App::with_clock(MemoryStore::new(), clock.clone());
    let mut live = LiveApp::new(app, 6);

    let (tx, rx) = mpsc::channel();
    let pump = EventPump::from_channel(rx, Duration::from_millis(5));

    send_line(&tx, "x 1");
    send_line(&tx, "start");
    drive(&mut live, &pump);
    clock.advance_secs(60);
    send_line(&tx, "pause");
    drive(&mut live, &pump);
    clock.advance_secs(600);
    assert_eq!(live.app.session.elapsed().num_seconds(), 60);

    send_line(&tx, "pause");
    drive(&mut live, &pump);
    clock.advance_secs(5);
    assert_eq!(live.app.session.elapsed().num_seconds(), 65);
}

#[test]
fn ticks_without_input_change_nothing() {
    let app = App::new(MemoryStore::new());
    let mut live = LiveApp::new(app, 6);
    let (_tx, rx) = mpsc::channel();
    let pump = EventPump::from_channel(rx, Duration::from_millis(1));

    for _ in 0..5u32 {
        let ev = pump.next_event();
        assert_eq!(ev, LiveEvent::Tick);
        live.handle(ev);
    }
    assert!(!live.should_quit);
    assert!(live.app.session.sets().is_empty());
}
