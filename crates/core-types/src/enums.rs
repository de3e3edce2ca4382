use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar intervals understood by the chart provider.
///
/// Serialized with the provider's own spelling (`"15m"`, `"1d"`, ...), so it can be used
/// directly in configuration files and query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
    OneHour,
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }

    /// Intraday intervals are the ones the provider serves only over a limited look-back
    /// window per request.
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Interval::OneMinute
                | Interval::FiveMinutes
                | Interval::FifteenMinutes
                | Interval::ThirtyMinutes
                | Interval::SixtyMinutes
                | Interval::OneHour
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "60m" => Ok(Interval::SixtyMinutes),
            "1h" => Ok(Interval::OneHour),
            "1d" => Ok(Interval::OneDay),
            "5d" => Ok(Interval::FiveDays),
            "1wk" => Ok(Interval::OneWeek),
            "1mo" => Ok(Interval::OneMonth),
            "3mo" => Ok(Interval::ThreeMonths),
            other => Err(CoreError::UnsupportedInterval(other.to_string())),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_spelling() {
        assert_eq!("15m".parse::<Interval>().unwrap(), Interval::FifteenMinutes);
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!(Interval::OneWeek.to_string(), "1wk");
    }

    #[test]
    fn rejects_unknown_interval() {
        assert_eq!(
            "2d".parse::<Interval>(),
            Err(CoreError::UnsupportedInterval("2d".to_string()))
        );
    }

    #[test]
    fn only_sub_daily_intervals_are_intraday() {
        assert!(Interval::FifteenMinutes.is_intraday());
        assert!(Interval::OneHour.is_intraday());
        assert!(!Interval::OneDay.is_intraday());
        assert!(!Interval::OneMonth.is_intraday());
    }

    #[test]
    fn round_trips_through_json_as_string() {
        let json = serde_json::to_string(&Interval::SixtyMinutes).unwrap();
        assert_eq!(json, "\"60m\"");
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Interval::SixtyMinutes);
    }
}
