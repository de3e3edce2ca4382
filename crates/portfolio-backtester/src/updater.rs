use crate::alignment::union_timestamps;
use crate::allocation::{allocate_at_first_price, stored_quantities};
use crate::data_handler::{ensure_unique_tickers, load_series};
use crate::error::PortfolioError;
use crate::manager::RunSettings;
use crate::valuation::value_by_timestamp;
use api_client::PriceSource;
use chrono::NaiveDate;
use core_types::{AssetPosition, PerformancePoint, PortfolioInput, Ticker};
use serde::Serialize;

/// Where an incremental update starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryMode {
    /// No history yet: buy at the first available price on or after `start`.
    Bootstrap { start: NaiveDate },
    /// Continue after the last recorded point with the stored quantities. A whole-day point
    /// means every bar of its date is already recorded.
    Resume { last: PerformancePoint },
}

impl HistoryMode {
    pub fn for_input(input: &PortfolioInput, fallback_start: NaiveDate) -> Self {
        match input.last_recorded() {
            Some(point) => HistoryMode::Resume {
                last: point.clone(),
            },
            None => HistoryMode::Bootstrap {
                start: fallback_start,
            },
        }
    }

    /// The first calendar date that has to be fetched.
    pub fn fetch_start(&self) -> NaiveDate {
        match self {
            HistoryMode::Bootstrap { start } => *start,
            HistoryMode::Resume { last } => last.timestamp.date_naive(),
        }
    }
}

/// New performance points plus the refreshed positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryUpdate {
    /// Only the points after the last recorded one. The caller appends them.
    pub history: Vec<PerformancePoint>,
    pub data: Vec<AssetPosition>,
}

/// Extends a stored performance history with every bar since its last point.
///
/// If any asset comes back without data, nothing is valued and the positions are returned
/// unchanged, so a partial fetch never produces a skewed point.
pub async fn update_history(
    source: &dyn PriceSource,
    settings: &RunSettings,
    input: &PortfolioInput,
) -> Result<HistoryUpdate, PortfolioError> {
    ensure_unique_tickers(input.data.iter().map(|p| &p.ticker))?;

    let mode = HistoryMode::for_input(input, settings.fallback_start);
    let stored = match &mode {
        HistoryMode::Resume { .. } => Some(stored_quantities(&input.data)?),
        HistoryMode::Bootstrap { .. } => None,
    };

    let tickers: Vec<Ticker> = input.data.iter().map(|p| p.ticker.clone()).collect();
    let mut series = load_series(
        source,
        &tickers,
        settings.update_interval,
        mode.fetch_start(),
    )
    .await?;

    if let Some(ticker) = series.first_empty() {
        tracing::info!(%ticker, "No price data for an asset, leaving the history unchanged.");
        return Ok(HistoryUpdate {
            history: Vec::new(),
            data: input.data.clone(),
        });
    }

    let quantities = match stored {
        Some(quantities) => quantities,
        None => allocate_at_first_price(&series, &input.data)?,
    };

    if let HistoryMode::Resume { last } = &mode {
        series.retain_after(last);
    }

    let timestamps = union_timestamps(&series);
    let history = value_by_timestamp(&series, &quantities, &timestamps)?;

    let data = input
        .data
        .iter()
        .map(|p| AssetPosition {
            ticker: p.ticker.clone(),
            quantity: quantities.get(&p.ticker).copied(),
            value: series.latest_price(&p.ticker).or(p.value),
            startvalue: p.startvalue,
        })
        .collect();

    tracing::info!(?mode, new_points = history.len(), "History updated.");
    Ok(HistoryUpdate { history, data })
}
