//! # Analytics Engine
//!
//! Risk metrics for a recorded portfolio performance history.
//!
//! The `AnalyticsEngine` is a stateless calculator: it takes the history and the initial
//! investment and produces a `RiskReport`. It has no knowledge of how the history was built.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{RiskAssessment, RiskLevel, RiskReport};
