use std::fmt;

/// Elapsed wall-clock time split into display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBreakdown {
    pub total_seconds: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl DurationBreakdown {
    pub fn from_millis(elapsed_ms: u64) -> Self {
        let total_seconds = elapsed_ms / 1000;
        Self {
            total_seconds,
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
            millis: elapsed_ms % 1000,
        }
    }
}

/// `1h 1m 1.000s`, `1m 30.000s` or `5.500s`. Fields above the largest
/// non-zero unit are omitted entirely; the fraction is always three digits.
impl fmt::Display for DurationBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.millis;
        if self.total_seconds >= 3600 {
            write!(
                f,
                "{}h {}m {}.{millis:03}s",
                self.hours, self.minutes, self.seconds
            )
        } else if self.total_seconds >= 60 {
            write!(f, "{}m {}.{millis:03}s", self.minutes, self.seconds)
        } else {
            write!(f, "{}.{millis:03}s", self.total_seconds)
        }
    }
}

pub fn format_duration(elapsed_ms: u64) -> String {
    DurationBreakdown::from_millis(elapsed_ms).to_string()
}
