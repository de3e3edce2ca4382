//! # Portfolio Backtester
//!
//! Values multi-asset portfolios from fetched price history. A backtest buys fixed share
//! quantities on the first common trading date and values them on every date all assets
//! traded. A history update resumes after the last recorded point and values the held
//! quantities at every new bar of any asset.

pub mod alignment;
pub mod allocation;
pub mod backtest;
pub mod data_handler;
pub mod error;
pub mod manager;
pub mod updater;
pub mod valuation;

pub use backtest::{run_backtest, BacktestOutcome};
pub use error::PortfolioError;
pub use manager::{PortfolioManager, RunSettings};
pub use updater::{update_history, HistoryMode, HistoryUpdate};
