use chrono::Duration;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Rounds half away from zero to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `HH:MM:SS`, hours are not wrapped
pub fn fmt_hms(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

pub fn fmt_hms_ms(ms: u64) -> String {
    fmt_hms(Duration::milliseconds(ms.min(i64::MAX as u64) as i64))
}

/// `MM:SS` for rest timers
pub fn fmt_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats a number without a trailing `.0`
pub fn fmt_number(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value.round())
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[7.5, 8.5]), Some(8.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(7.25), 7.3);
        assert_eq!(round_to_tenth(8.0 / 3.0), 2.7);
    }

    #[test]
    fn test_fmt_hms() {
        assert_eq!(fmt_hms(Duration::zero()), "00:00:00");
        assert_eq!(fmt_hms(Duration::milliseconds(3_725_900)), "01:02:05");
        assert_eq!(fmt_hms(Duration::seconds(-5)), "00:00:00");
        assert_eq!(fmt_hms_ms(61_000), "00:01:01");
    }

    #[test]
    fn test_fmt_mmss() {
        assert_eq!(fmt_mmss(75), "01:15");
        assert_eq!(fmt_mmss(0), "00:00");
    }

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(100.0), "100");
        assert_eq!(fmt_number(102.5), "102.5");
    }
}
