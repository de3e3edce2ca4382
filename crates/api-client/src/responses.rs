use crate::error::ApiError;
use chrono::{TimeZone, Utc};
use core_types::PricePoint;
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` where the provider's keys differ from Rust naming.

/// The body of `GET /v8/finance/chart/{ticker}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartErrorBody>,
}

/// Represents an error object embedded in a chart response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    /// Epoch seconds. Absent when the requested range holds no bars.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-wise bar data, parallel to `ChartResult::timestamp`.
/// There are more columns (open, high, low, volume), but only closes are used.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Validates the payload and zips timestamps with closes, skipping null closes.
    pub fn into_price_points(self) -> Result<Vec<PricePoint>, ApiError> {
        if let Some(error) = self.chart.error {
            return Err(ApiError::InvalidData(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ApiError::InvalidData("chart response has no result".to_string()))?;

        if result.timestamp.is_empty() {
            return Ok(Vec::new());
        }

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| ApiError::InvalidData("chart response has no quote column".to_string()))?;

        if closes.len() != result.timestamp.len() {
            return Err(ApiError::InvalidData(format!(
                "{} timestamps but {} closes",
                result.timestamp.len(),
                closes.len()
            )));
        }

        result
            .timestamp
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| close.map(|price| (ts, price)))
            .map(|(ts, price)| {
                let timestamp = Utc
                    .timestamp_opt(ts, 0)
                    .single()
                    .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ts)))?;
                Ok(PricePoint::new(timestamp, price))
            })
            .collect()
    }
}
