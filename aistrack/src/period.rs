//! History periods used for query windows and live-track staleness.
//!
//! Months and years are fixed-length approximations (30 and 365 days), not
//! calendar arithmetic. Existing historical views depend on this policy.

use std::fmt;
use std::time::Duration;

const HOUR_SECS: u64 = 3_600;
const DAY_SECS: u64 = 86_400;
const WEEK_SECS: u64 = 604_800;
const MONTH_SECS: u64 = 2_592_000;
const YEAR_SECS: u64 = 31_536_000;

/// Length of a history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPeriod {
    #[default]
    Hour,
    Day,
    Week,
    /// 30 days
    Month,
    /// 365 days
    Year,
}

impl HistoryPeriod {
    /// Parse a period name. Unrecognized names fall back to [`HistoryPeriod::Hour`].
    pub fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(HistoryPeriod::Hour)
    }

    /// Parse a period name, returning `None` for unrecognized input.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Some(HistoryPeriod::Hour),
            "day" => Some(HistoryPeriod::Day),
            "week" => Some(HistoryPeriod::Week),
            "month" => Some(HistoryPeriod::Month),
            "year" => Some(HistoryPeriod::Year),
            _ => None,
        }
    }

    pub fn as_secs(&self) -> u64 {
        match self {
            HistoryPeriod::Hour => HOUR_SECS,
            HistoryPeriod::Day => DAY_SECS,
            HistoryPeriod::Week => WEEK_SECS,
            HistoryPeriod::Month => MONTH_SECS,
            HistoryPeriod::Year => YEAR_SECS,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    /// Period length as a signed chrono duration, for timestamp arithmetic.
    pub fn chrono_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.as_secs() as i64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HistoryPeriod::Hour => "hour",
            HistoryPeriod::Day => "day",
            HistoryPeriod::Week => "week",
            HistoryPeriod::Month => "month",
            HistoryPeriod::Year => "year",
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A staleness window expressed as a number of history periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlWindow {
    pub period: HistoryPeriod,
    pub multiplier: u32,
}

impl TtlWindow {
    pub fn new(period: HistoryPeriod, multiplier: u32) -> Self {
        Self { period, multiplier }
    }

    /// Total window length.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.period.as_secs().saturating_mul(self.multiplier as u64))
    }
}

impl Default for TtlWindow {
    fn default() -> Self {
        Self::new(HistoryPeriod::Hour, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_durations() {
        assert_eq!(HistoryPeriod::Hour.as_secs(), 3_600);
        assert_eq!(HistoryPeriod::Day.as_secs(), 86_400);
        assert_eq!(HistoryPeriod::Week.as_secs(), 604_800);
        assert_eq!(HistoryPeriod::Month.as_secs(), 2_592_000);
        assert_eq!(HistoryPeriod::Year.as_secs(), 31_536_000);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(HistoryPeriod::parse("Day"), HistoryPeriod::Day);
        assert_eq!(HistoryPeriod::parse(" WEEK "), HistoryPeriod::Week);
    }

    #[test]
    fn test_unrecognized_period_defaults_to_hour() {
        assert_eq!(HistoryPeriod::parse("fortnight"), HistoryPeriod::Hour);
        assert_eq!(HistoryPeriod::parse(""), HistoryPeriod::Hour);
        assert_eq!(HistoryPeriod::try_parse("fortnight"), None);
    }

    #[test]
    fn test_ttl_window_multiplies_period() {
        let ttl = TtlWindow::new(HistoryPeriod::Day, 3);
        assert_eq!(ttl.duration(), Duration::from_secs(3 * 86_400));
        assert_eq!(TtlWindow::default().duration(), Duration::from_secs(3_600));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for period in [
            HistoryPeriod::Hour,
            HistoryPeriod::Day,
            HistoryPeriod::Week,
            HistoryPeriod::Month,
            HistoryPeriod::Year,
        ] {
            assert_eq!(HistoryPeriod::parse(&period.to_string()), period);
        }
    }
}
