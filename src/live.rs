//! Keyboard-driven controller for the live workout screen.
//!
//! The user types short commands into an input line (`x 7`, `start`,
//! `set 1 100 5 8 felt easy`, `done`, ...). Ticks carry no state; the
//! screen recomputes clocks from the session engine on every draw.

use std::str::FromStr;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::app::App;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::runtime::LiveEvent;
use crate::store::PersistentStore;
use crate::util::{fmt_hms_ms, fmt_mmss, fmt_number};

pub const HELP: &str = "x <n|name> select · new <name> · start · pause · rest · set <n> <kg> <reps> [rpe|-] [note] · title <text> · date <YYYY-MM-DD> · done · quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseRef {
    /// 1-based position in the displayed list
    Index(usize),
    Name(String),
}

impl ExerciseRef {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<usize>() {
            Ok(n) => ExerciseRef::Index(n),
            Err(_) => ExerciseRef::Name(raw.to_string()),
        })
    }

    fn resolve<'a>(&self, list: &'a [String]) -> Option<&'a str> {
        match self {
            ExerciseRef::Index(n) => n.checked_sub(1).and_then(|i| list.get(i)).map(String::as_str),
            ExerciseRef::Name(name) => list.iter().find(|e| *e == name).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle(ExerciseRef),
    NewExercise(String),
    Start,
    Pause,
    Rest,
    Set {
        target: ExerciseRef,
        weight: f64,
        reps: f64,
        rpe: Option<f64>,
        note: String,
    },
    Title(String),
    Date(NaiveDate),
    Done,
    Help,
    Quit,
}

fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.ok_or_else(|| Error::validation(field, "missing"))?;
    raw.replace(',', ".")
        .parse::<f64>()
        .map_err(|_| Error::validation(field, format!("`{raw}` is not a number")))
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_lowercase().as_str() {
            "x" | "sel" | "select" => ExerciseRef::parse(rest)
                .map(Command::Toggle)
                .ok_or_else(|| Error::validation("exercise", "missing")),
            "new" | "add" => {
                if rest.is_empty() {
                    Err(Error::validation("exercise", "name is empty"))
                } else {
                    Ok(Command::NewExercise(rest.to_string()))
                }
            }
            "start" => Ok(Command::Start),
            "pause" | "p" | "resume" => Ok(Command::Pause),
            "rest" | "r" => Ok(Command::Rest),
            "set" | "s" => {
                let mut parts = rest.split_whitespace();
                let target = parts
                    .next()
                    .and_then(ExerciseRef::parse)
                    .ok_or_else(|| Error::validation("exercise", "missing"))?;
                let weight = parse_number("weight", parts.next())?;
                let reps = parse_number("reps", parts.next())?;
                let rpe = match parts.next() {
                    None | Some("-") => None,
                    raw => Some(parse_number("rpe", raw)?),
                };
                let note = parts.collect::<Vec<_>>().join(" ");
                Ok(Command::Set {
                    target,
                    weight,
                    reps,
                    rpe,
                    note,
                })
            }
            "title" | "t" => Ok(Command::Title(rest.to_string())),
            "date" => rest
                .parse::<NaiveDate>()
                .map(Command::Date)
                .map_err(|_| Error::validation("date", "expected YYYY-MM-DD")),
            "done" | "finish" => Ok(Command::Done),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" => Ok(Command::Quit),
            other => Err(Error::validation("command", format!("unknown `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Workout,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug)]
pub struct LiveApp<S: PersistentStore, C: Clock> {
    pub app: App<S, C>,
    pub screen: Screen,
    pub input: String,
    pub status: Option<Status>,
    pub should_quit: bool,
    pub recent_limit: usize,
}

impl<S: PersistentStore, C: Clock> LiveApp<S, C> {
    pub fn new(app: App<S, C>, recent_limit: usize) -> Self {
        Self {
            app,
            screen: Screen::Workout,
            input: String::new(),
            status: Some(Status::info(HELP)),
            should_quit: false,
            recent_limit,
        }
    }

    /// Ticks and resizes only need a redraw; elapsed and rest times are
    /// recomputed from the session on every frame.
    pub fn handle(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Key(key) => self.on_key(key),
            LiveEvent::Closed => self.should_quit = true,
            LiveEvent::Resize | LiveEvent::Tick => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Workout => self.on_workout_key(key),
            Screen::Summary => self.on_summary_key(key),
        }
    }

    fn on_workout_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                if !line.trim().is_empty() {
                    self.submit(&line);
                }
            }
            KeyCode::Esc => {
                if self.input.is_empty() {
                    self.should_quit = true;
                } else {
                    self.input.clear();
                }
            }
            _ => {}
        }
    }

    fn on_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => self.confirm_finish(),
            KeyCode::Esc | KeyCode::Char('n') => {
                self.screen = Screen::Workout;
                self.status = None;
            }
            _ => {}
        }
    }

    /// Parses and runs one input line, reporting the outcome in the status line
    pub fn submit(&mut self, line: &str) {
        let outcome = line.parse::<Command>().and_then(|cmd| self.execute(cmd));
        self.status = Some(match outcome {
            Ok(text) => Status::info(text),
            Err(e) => {
                debug!(error = %e, line, "command rejected");
                Status::error(e.to_string())
            }
        });
    }

    pub fn execute(&mut self, cmd: Command) -> Result<String> {
        let session = &mut self.app.session;
        match cmd {
            Command::Toggle(target) => {
                let name = target
                    .resolve(self.app.history.exercise_bank())
                    .or_else(|| target.resolve(session.selected()))
                    .map(str::to_string)
                    .ok_or_else(|| Error::validation("exercise", "not in the bank"))?;
                let selected = session.toggle_exercise(&name)?;
                Ok(if selected {
                    format!("{name} selected")
                } else {
                    format!("{name} removed")
                })
            }
            Command::NewExercise(name) => {
                self.app.add_exercise(&name)?;
                Ok(format!("{} added", name.trim()))
            }
            Command::Start => {
                if session.start() {
                    Ok("workout started".into())
                } else if session.selected().is_empty() {
                    Err(Error::validation("start", "select an exercise first"))
                } else {
                    Ok("already running".into())
                }
            }
            Command::Pause => {
                if !session.toggle_pause() {
                    return Ok("not started yet".into());
                }
                Ok(if session.is_paused() { "paused" } else { "resumed" }.into())
            }
            Command::Rest => {
                if session.is_resting() {
                    let secs = session.stop_rest().unwrap_or(0);
                    Ok(format!("last rest {}", fmt_mmss(secs)))
                } else {
                    session.start_rest();
                    Ok("rest timer running".into())
                }
            }
            Command::Set {
                target,
                weight,
                reps,
                rpe,
                note,
            } => {
                let name = target
                    .resolve(session.selected())
                    .map(str::to_string)
                    .ok_or_else(|| match &target {
                        ExerciseRef::Name(name) => Error::ExerciseNotSelected(name.clone()),
                        ExerciseRef::Index(n) => {
                            Error::validation("exercise", format!("no selected exercise #{n}"))
                        }
                    })?;
                let set = session.add_set(&name, weight, reps, rpe, &note)?;
                Ok(format!(
                    "{} {}kg × {}",
                    set.exercise,
                    fmt_number(set.weight),
                    set.reps
                ))
            }
            Command::Title(title) => {
                session.set_title(title.trim());
                Ok(format!("title: {}", title.trim()))
            }
            Command::Date(date) => {
                session.set_date(date);
                Ok(format!("date: {date}"))
            }
            Command::Done => {
                if session.sets().is_empty() {
                    return Err(Error::EmptySession);
                }
                self.screen = Screen::Summary;
                Ok("enter to save, esc to go back".into())
            }
            Command::Help => Ok(HELP.into()),
            Command::Quit => {
                self.should_quit = true;
                Ok(String::new())
            }
        }
    }

    fn confirm_finish(&mut self) {
        self.screen = Screen::Workout;
        self.status = Some(match self.app.finish_workout() {
            Ok(finished) => match finished.save_error {
                None => Status::info(format!(
                    "saved {} · {} sets",
                    fmt_hms_ms(finished.session.duration_ms),
                    finished.session.sets.len()
                )),
                Some(e) => {
                    warn!(error = %e, "workout not written to disk");
                    Status::error(format!("workout kept but not saved: {e}"))
                }
            },
            Err(e) => Status::error(e.to_string()),
        });
    }
}
