use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short identifier of a tradable asset (e.g., "AAPL").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// One line of a fresh backtest request: how much money goes into which ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub ticker: Ticker,
    /// The initial investment in the portfolio's currency.
    pub value: f64,
}

/// A held position as the caller stores it between history updates.
///
/// `quantity` is derived once (by a backtest or the first update) and then carried unchanged.
/// `value` is the last recorded price of one share and `startvalue` the original cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPosition {
    pub ticker: Ticker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub startvalue: f64,
}

/// The per-asset record produced alongside a backtest's performance curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalShare {
    pub ticker: Ticker,
    pub startvalue: f64,
    /// Most recent fetched price of one share.
    pub value: f64,
    pub quantity: f64,
}

impl From<FinalShare> for AssetPosition {
    fn from(share: FinalShare) -> Self {
        Self {
            ticker: share.ticker,
            quantity: Some(share.quantity),
            value: Some(share.value),
            startvalue: share.startvalue,
        }
    }
}

/// A point of a backtest's performance curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// A point of a portfolio's persisted performance history.
///
/// Accepts either a `timestamp` (RFC 3339) or a bare `date` on input, so the dated output of a
/// backtest can seed an incremental update. A dated point stands for its whole trading day and
/// is written back with `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WirePerformancePoint", into = "WirePerformancePoint")]
pub struct PerformancePoint {
    /// For a whole-day point, midnight UTC of that day.
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
    /// Set when the point covers its entire UTC date rather than one instant.
    pub whole_day: bool,
}

impl PerformancePoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self {
            timestamp,
            value,
            whole_day: false,
        }
    }

    pub fn for_day(date: NaiveDate, value: Decimal) -> Self {
        Self {
            timestamp: date.and_time(chrono::NaiveTime::MIN).and_utc(),
            value,
            whole_day: true,
        }
    }

    /// Whether the bar at `instant` is already accounted for by this point.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        if self.whole_day {
            instant.date_naive() <= self.timestamp.date_naive()
        } else {
            instant <= self.timestamp
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WirePerformancePoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    value: Decimal,
}

impl TryFrom<WirePerformancePoint> for PerformancePoint {
    type Error = String;

    fn try_from(raw: WirePerformancePoint) -> Result<Self, Self::Error> {
        let stamp = raw
            .timestamp
            .or(raw.date)
            .ok_or_else(|| "performance point needs a `timestamp` or a `date`".to_string())?;
        if let Ok(instant) = DateTime::parse_from_rfc3339(&stamp) {
            return Ok(Self::new(instant.with_timezone(&Utc), raw.value));
        }
        NaiveDate::parse_from_str(&stamp, "%Y-%m-%d")
            .map(|date| Self::for_day(date, raw.value))
            .map_err(|_| format!("unrecognised timestamp: {stamp}"))
    }
}

impl From<PerformancePoint> for WirePerformancePoint {
    fn from(point: PerformancePoint) -> Self {
        let (timestamp, date) = if point.whole_day {
            (None, Some(point.timestamp.date_naive().to_string()))
        } else {
            (
                Some(point.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                None,
            )
        };
        Self {
            timestamp,
            date,
            value: point.value,
        }
    }
}

impl From<DatedValue> for PerformancePoint {
    fn from(point: DatedValue) -> Self {
        Self::for_day(point.date, point.value)
    }
}

/// One portfolio snapshot as submitted for an incremental update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub data: Vec<AssetPosition>,
    #[serde(default)]
    pub history: Vec<PerformancePoint>,
}

impl PortfolioInput {
    /// The most recent recorded point, compared by time rather than by position. A whole-day
    /// point outranks any instant on the same date.
    pub fn last_recorded(&self) -> Option<&PerformancePoint> {
        self.history
            .iter()
            .max_by_key(|p| (p.timestamp.date_naive(), p.whole_day, p.timestamp))
    }
}
