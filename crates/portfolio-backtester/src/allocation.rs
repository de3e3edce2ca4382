use crate::error::PortfolioError;
use chrono::NaiveDate;
use core_types::{Allocation, AssetPosition, HistoricalSeries, Ticker};
use std::collections::BTreeMap;

/// Share quantity held per ticker.
pub type Holdings = BTreeMap<Ticker, f64>;

/// Passes `price` through if it is a positive finite number.
pub fn checked_price(ticker: &Ticker, price: f64) -> Result<f64, PortfolioError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PortfolioError::InvalidPrice {
            ticker: ticker.to_string(),
            price,
        });
    }
    Ok(price)
}

/// Converts an investment into a share quantity at `price`.
pub fn allocate(ticker: &Ticker, investment: f64, price: Option<f64>) -> Result<f64, PortfolioError> {
    let price = price.ok_or_else(|| PortfolioError::NoPriceData {
        ticker: ticker.to_string(),
    })?;
    Ok(investment / checked_price(ticker, price)?)
}

/// Buys every allocation at its first price on `date`.
pub fn allocate_on(
    series: &HistoricalSeries,
    allocations: &[Allocation],
    date: NaiveDate,
) -> Result<Holdings, PortfolioError> {
    allocations
        .iter()
        .map(|a| {
            let quantity = allocate(&a.ticker, a.value, series.price_on(&a.ticker, date))?;
            Ok((a.ticker.clone(), quantity))
        })
        .collect()
}

/// Buys every position's `startvalue` at the first price of its own series.
pub fn allocate_at_first_price(
    series: &HistoricalSeries,
    positions: &[AssetPosition],
) -> Result<Holdings, PortfolioError> {
    positions
        .iter()
        .map(|p| {
            let quantity = allocate(&p.ticker, p.startvalue, series.first_price(&p.ticker))?;
            Ok((p.ticker.clone(), quantity))
        })
        .collect()
}

/// Collects the quantities a previous run stored on each position.
pub fn stored_quantities(positions: &[AssetPosition]) -> Result<Holdings, PortfolioError> {
    positions
        .iter()
        .map(|p| {
            let quantity = p.quantity.ok_or_else(|| PortfolioError::MissingQuantity {
                ticker: p.ticker.to_string(),
            })?;
            Ok((p.ticker.clone(), quantity))
        })
        .collect()
}
