use crate::backtest::{run_backtest, BacktestOutcome};
use crate::error::PortfolioError;
use crate::updater::{update_history, HistoryUpdate};
use api_client::PriceSource;
use chrono::NaiveDate;
use configuration::Config;
use core_types::{Allocation, Interval, PortfolioInput};
use std::sync::Arc;

/// The intervals and start dates a valuation run fetches with.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub backtest_interval: Interval,
    pub backtest_start: NaiveDate,
    pub update_interval: Interval,
    /// Start of the very first update of a portfolio without history.
    pub fallback_start: NaiveDate,
}

impl From<&Config> for RunSettings {
    fn from(config: &Config) -> Self {
        Self {
            backtest_interval: config.price_source.backtest_interval,
            backtest_start: config.price_source.backtest_start,
            update_interval: config.price_source.update_interval,
            fallback_start: config.history.fallback_start,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Owns the price source and settings shared by backtests and history updates.
#[derive(Clone)]
pub struct PortfolioManager {
    source: Arc<dyn PriceSource>,
    settings: RunSettings,
}

impl PortfolioManager {
    pub fn new(source: Arc<dyn PriceSource>, settings: RunSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Values a fresh portfolio over its full history.
    pub async fn backtest(&self, allocations: &[Allocation]) -> Result<BacktestOutcome, PortfolioError> {
        run_backtest(self.source.as_ref(), &self.settings, allocations).await
    }

    /// Extends a stored performance history up to now.
    pub async fn update(&self, input: &PortfolioInput) -> Result<HistoryUpdate, PortfolioError> {
        update_history(self.source.as_ref(), &self.settings, input).await
    }
}
