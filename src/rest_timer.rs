use chrono::{DateTime, Utc};

/// Single-slot mailbox for the last completed rest.
///
/// `put` overwrites an unread value; `take` hands the value out once and
/// leaves zero behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestSlot {
    secs: u64,
}

impl RestSlot {
    pub fn put(&mut self, secs: u64) {
        self.secs = secs;
    }

    pub fn take(&mut self) -> u64 {
        std::mem::take(&mut self.secs)
    }

    pub fn peek(&self) -> u64 {
        self.secs
    }
}

/// Start/stop clock between sets, independent of the workout clock
#[derive(Debug, Clone, Default)]
pub struct RestTimer {
    started_at: Option<DateTime<Utc>>,
    last: RestSlot,
}

impl RestTimer {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Returns false if already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Stops the timer and posts the whole seconds rested.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let started = self.started_at.take()?;
        let secs = whole_secs_between(started, now);
        self.last.put(secs);
        Some(secs)
    }

    /// Seconds on the running timer, zero when stopped
    pub fn running_secs(&self, now: DateTime<Utc>) -> u64 {
        self.started_at
            .map(|started| whole_secs_between(started, now))
            .unwrap_or(0)
    }

    pub fn last_rest_secs(&self) -> u64 {
        self.last.peek()
    }

    pub fn take_last_rest(&mut self) -> u64 {
        self.last.take()
    }
}

fn whole_secs_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let ms = (to - from).num_milliseconds().max(0) as u64;
    ms / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn stop_floors_to_whole_seconds() {
        let mut timer = RestTimer::default();
        timer.start(t0());
        let secs = timer.stop(t0() + Duration::milliseconds(75_999));
        assert_eq!(secs, Some(75));
        assert_eq!(timer.last_rest_secs(), 75);
        assert!(!timer.is_running());
    }

    #[test]
    fn start_while_running_keeps_first_start() {
        let mut timer = RestTimer::default();
        assert!(timer.start(t0()));
        assert!(!timer.start(t0() + Duration::seconds(10)));
        assert_eq!(timer.running_secs(t0() + Duration::seconds(20)), 20);
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut timer = RestTimer::default();
        assert_eq!(timer.stop(t0()), None);
        assert_eq!(timer.last_rest_secs(), 0);
    }

    #[test]
    fn take_clears_slot() {
        let mut timer = RestTimer::default();
        timer.start(t0());
        timer.stop(t0() + Duration::seconds(40));
        assert_eq!(timer.take_last_rest(), 40);
        assert_eq!(timer.take_last_rest(), 0);
    }

    #[test]
    fn unread_value_is_overwritten() {
        let mut slot = RestSlot::default();
        slot.put(30);
        slot.put(45);
        assert_eq!(slot.take(), 45);
    }
}
