// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// - Requires a TTY; expectrl allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_workout_is_saved_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let data = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("onerep");
    let cmd = format!("{} live --data-dir {}", bin.display(), data.path().display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    for line in ["x Squat\r", "start\r", "set 1 100 5 8\r", "done\r"] {
        p.send(line)?;
        std::thread::sleep(Duration::from_millis(100));
    }
    // confirm on the summary screen, then quit
    p.send("y")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;

    let saved = std::fs::read_to_string(data.path().join("gt.workouts.v3.json"))?;
    assert!(saved.contains("\"Squat\""));
    Ok(())
}
