use crate::alignment::common_dates;
use crate::allocation::{allocate_on, checked_price};
use crate::data_handler::{ensure_unique_tickers, load_series};
use crate::error::PortfolioError;
use crate::manager::RunSettings;
use crate::valuation::value_by_date;
use api_client::PriceSource;
use core_types::{Allocation, DatedValue, FinalShare, Ticker};
use serde::Serialize;

/// The result of valuing a fresh portfolio over its full history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestOutcome {
    #[serde(rename = "portfolio_performance")]
    pub performance: Vec<DatedValue>,
    #[serde(rename = "final_shares")]
    pub shares: Vec<FinalShare>,
}

/// Buys each allocation on the first date all assets traded, then values the holdings on every
/// common date.
///
/// An asset without any price data is an error. Assets whose dates never overlap yield an
/// empty outcome.
pub async fn run_backtest(
    source: &dyn PriceSource,
    settings: &RunSettings,
    allocations: &[Allocation],
) -> Result<BacktestOutcome, PortfolioError> {
    ensure_unique_tickers(allocations.iter().map(|a| &a.ticker))?;
    let tickers: Vec<Ticker> = allocations.iter().map(|a| a.ticker.clone()).collect();

    let series = load_series(
        source,
        &tickers,
        settings.backtest_interval,
        settings.backtest_start,
    )
    .await?;

    if let Some(ticker) = series.first_empty() {
        return Err(PortfolioError::NoPriceData {
            ticker: ticker.to_string(),
        });
    }

    let dates = match common_dates(&series) {
        Ok(dates) => dates,
        Err(PortfolioError::NoCommonData) => {
            tracing::warn!(assets = tickers.len(), "Assets share no trading dates, nothing to value.");
            return Ok(BacktestOutcome::default());
        }
        Err(e) => return Err(e),
    };

    let holdings = allocate_on(&series, allocations, dates[0])?;
    let performance = value_by_date(&series, &holdings, &dates)?;

    let shares = allocations
        .iter()
        .map(|a| {
            let latest = series
                .latest_price(&a.ticker)
                .ok_or_else(|| PortfolioError::NoPriceData {
                    ticker: a.ticker.to_string(),
                })?;
            let value = checked_price(&a.ticker, latest)?;
            Ok(FinalShare {
                ticker: a.ticker.clone(),
                startvalue: a.value,
                value,
                quantity: holdings.get(&a.ticker).copied().unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, PortfolioError>>()?;

    tracing::info!(
        points = performance.len(),
        first = %dates[0],
        "Backtest complete."
    );
    Ok(BacktestOutcome { performance, shares })
}
