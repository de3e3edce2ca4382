//! Which instants a portfolio is valued at.
//!
//! A fresh backtest values the portfolio only on calendar dates every asset traded on
//! (intersection). An incremental update values it at every instant any asset has a new bar
//! (union), counting assets without a bar at that instant as zero.

use crate::error::PortfolioError;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::HistoricalSeries;
use std::collections::BTreeSet;

/// Dates present in every asset's series, ascending.
///
/// Fails with `NoCommonData` when there are no series or their dates do not overlap.
pub fn common_dates(series: &HistoricalSeries) -> Result<Vec<NaiveDate>, PortfolioError> {
    let mut sets = series
        .iter()
        .map(|(_, points)| points.iter().map(|p| p.date).collect::<BTreeSet<_>>());

    let mut common = sets.next().ok_or(PortfolioError::NoCommonData)?;
    for dates in sets {
        common.retain(|d| dates.contains(d));
    }

    if common.is_empty() {
        return Err(PortfolioError::NoCommonData);
    }
    Ok(common.into_iter().collect())
}

/// Every timestamp present in any asset's series, ascending and unique.
pub fn union_timestamps(series: &HistoricalSeries) -> Vec<DateTime<Utc>> {
    series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
