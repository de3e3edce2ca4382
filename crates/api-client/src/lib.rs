use crate::error::ApiError;
use crate::responses::ChartResponse;
use crate::retry::{with_backoff, AttemptOutcome};
use crate::windows::{merge_windows, request_windows};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use configuration::PriceSourceConfig;
use core_types::{Interval, PricePoint, Ticker};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use std::sync::Arc;

pub mod error;
pub mod responses;
pub mod retry;
pub mod windows;
// --- Public API ---
pub use retry::{Backoff, RetryDecision, RetryPolicy, Sleeper, TokioSleeper};

/// The abstract interface for a historical price provider.
/// The valuation engine only talks to this trait, so tests can hand it canned series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches close prices for `ticker` from `start` (inclusive, UTC date) up to now,
    /// ascending by timestamp, with null closes already dropped.
    async fn fetch_series(
        &self,
        ticker: &Ticker,
        interval: Interval,
        start: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError>;
}

/// A concrete implementation of `PriceSource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooChartClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    intraday_window_days: i64,
    sleeper: Arc<dyn Sleeper>,
}

impl YahooChartClient {
    pub fn new(config: &PriceSourceConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ApiError::InvalidData(format!("Invalid user agent: {}", e)))?,
        );

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(config.request_timeout())
                .build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from(config),
            intraday_window_days: config.intraday_window_days,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the timer used between throttled attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// One request for one window. A 429 is reported as `Throttled` for the backoff driver.
    async fn fetch_window(
        &self,
        ticker: &Ticker,
        interval: Interval,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<AttemptOutcome<Vec<PricePoint>>, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", from.timestamp().to_string()),
                ("period2", to.timestamp().to_string()),
                ("interval", interval.as_str().to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(AttemptOutcome::Throttled);
        }
        let text = response.text().await?;

        if !status.is_success() {
            // The provider usually explains itself with a chart error object.
            let message = serde_json::from_str::<ChartResponse>(&text)
                .ok()
                .and_then(|body| body.chart.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or(text);
            return Err(ApiError::Status {
                ticker: ticker.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body = serde_json::from_str::<ChartResponse>(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(AttemptOutcome::Completed(body.into_price_points()?))
    }
}

#[async_trait]
impl PriceSource for YahooChartClient {
    async fn fetch_series(
        &self,
        ticker: &Ticker,
        interval: Interval,
        start: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let windows = request_windows(start, Utc::now(), interval, self.intraday_window_days);

        let mut chunks = Vec::with_capacity(windows.len());
        for (from, to) in windows {
            tracing::debug!(%ticker, %interval, %from, %to, "Fetching price window.");
            let points = with_backoff(&self.retry, self.sleeper.as_ref(), ticker.as_str(), || {
                self.fetch_window(ticker, interval, from, to)
            })
            .await?;
            chunks.push(points);
        }

        let series: Vec<PricePoint> = merge_windows(chunks)
            .into_iter()
            .filter(|p| p.date >= start)
            .collect();
        tracing::debug!(%ticker, points = series.len(), "Fetched price series.");
        Ok(series)
    }
}
