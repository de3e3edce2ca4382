use crate::error::PortfolioError;
use api_client::PriceSource;
use chrono::NaiveDate;
use core_types::{HistoricalSeries, Interval, Ticker};
use futures::future::join_all;
use std::collections::HashSet;

/// Rejects a portfolio that names the same ticker twice.
pub fn ensure_unique_tickers<'a>(
    tickers: impl IntoIterator<Item = &'a Ticker>,
) -> Result<(), PortfolioError> {
    let mut seen = HashSet::new();
    for ticker in tickers {
        if !seen.insert(ticker) {
            return Err(PortfolioError::DuplicateTicker {
                ticker: ticker.to_string(),
            });
        }
    }
    Ok(())
}

/// Concurrently fetches the series of every ticker and gathers them by ticker.
///
/// Results are matched back to their ticker before merging, so completion order never leaks
/// into the output. When several fetches fail, the error of the first ticker in request order
/// is returned.
pub async fn load_series(
    source: &dyn PriceSource,
    tickers: &[Ticker],
    interval: Interval,
    start: NaiveDate,
) -> Result<HistoricalSeries, PortfolioError> {
    let fetch_futures = tickers.iter().map(|ticker| async move {
        let result = source.fetch_series(ticker, interval, start).await;
        (ticker, result)
    });

    let results = join_all(fetch_futures).await;

    let mut series = HistoricalSeries::new();
    for (ticker, result) in results {
        let points = result?;
        tracing::info!(%ticker, %interval, points = points.len(), "Loaded price series.");
        series.insert(ticker.clone(), points);
    }
    Ok(series)
}
