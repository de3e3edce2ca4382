//! # Pulse Core Types
//!
//! The shared vocabulary of the workspace: tickers, fetched price points, the per-run
//! `HistoricalSeries`, and the JSON-facing portfolio records that round-trip through the caller.
//!
//! This is a Layer 0 crate. It has no knowledge of HTTP, configuration or valuation logic.

pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Interval;
pub use error::CoreError;
pub use series::{HistoricalSeries, PricePoint};
pub use structs::{
    Allocation, AssetPosition, DatedValue, FinalShare, PerformancePoint, PortfolioInput, Ticker,
};
