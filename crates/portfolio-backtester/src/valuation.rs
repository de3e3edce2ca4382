use crate::allocation::{checked_price, Holdings};
use crate::error::PortfolioError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{DatedValue, HistoricalSeries, PerformancePoint, Ticker};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Rounds a monetary amount to cents.
pub fn round_money(value: f64) -> Result<Decimal, PortfolioError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or(PortfolioError::Unrepresentable(value))
}

/// Sums `quantity * price` over the holdings, counting a missing price as zero.
fn portfolio_value(
    holdings: &Holdings,
    mut price: impl FnMut(&Ticker) -> Option<f64>,
) -> Result<f64, PortfolioError> {
    holdings.iter().try_fold(0.0, |total, (ticker, quantity)| {
        Ok(match price(ticker) {
            Some(p) => total + quantity * checked_price(ticker, p)?,
            None => total,
        })
    })
}

/// Values the holdings on each date at that date's first price.
pub fn value_by_date(
    series: &HistoricalSeries,
    holdings: &Holdings,
    dates: &[NaiveDate],
) -> Result<Vec<DatedValue>, PortfolioError> {
    dates
        .iter()
        .map(|&date| {
            let total = portfolio_value(holdings, |t| series.price_on(t, date))?;
            Ok(DatedValue {
                date,
                value: round_money(total)?,
            })
        })
        .collect()
}

/// Values the holdings at each instant, using only bars recorded at exactly that instant.
pub fn value_by_timestamp(
    series: &HistoricalSeries,
    holdings: &Holdings,
    timestamps: &[DateTime<Utc>],
) -> Result<Vec<PerformancePoint>, PortfolioError> {
    timestamps
        .iter()
        .map(|&timestamp| {
            let total = portfolio_value(holdings, |t| series.price_at(t, timestamp))?;
            Ok(PerformancePoint::new(timestamp, round_money(total)?))
        })
        .collect()
}
