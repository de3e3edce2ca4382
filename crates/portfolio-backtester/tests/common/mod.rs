#![allow(dead_code)]

use api_client::error::ApiError;
use api_client::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_types::{Interval, PricePoint, Ticker};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// An in-memory price source that records every request it receives.
#[derive(Default)]
pub struct FakeSource {
    series: HashMap<Ticker, Vec<PricePoint>>,
    throttled: HashMap<Ticker, u32>,
    delays: HashMap<Ticker, Duration>,
    pub calls: Mutex<Vec<(Ticker, Interval, NaiveDate)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.series.insert(Ticker::from(ticker), points);
        self
    }

    /// Makes `ticker` fail as if throttling outlived `attempts` tries.
    pub fn with_throttling(mut self, ticker: &str, attempts: u32) -> Self {
        self.throttled.insert(Ticker::from(ticker), attempts);
        self
    }

    pub fn with_delay(mut self, ticker: &str, delay: Duration) -> Self {
        self.delays.insert(Ticker::from(ticker), delay);
        self
    }

    pub fn calls(&self) -> Vec<(Ticker, Interval, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    async fn fetch_series(
        &self,
        ticker: &Ticker,
        interval: Interval,
        start: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.clone(), interval, start));

        if let Some(delay) = self.delays.get(ticker) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(&attempts) = self.throttled.get(ticker) {
            return Err(ApiError::RateLimited {
                ticker: ticker.to_string(),
                attempts,
            });
        }

        Ok(self
            .series
            .get(ticker)
            .map(|points| points.iter().filter(|p| p.date >= start).cloned().collect())
            .unwrap_or_default())
    }
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily closes at 14:30 UTC.
pub fn daily(entries: &[((i32, u32, u32), f64)]) -> Vec<PricePoint> {
    entries
        .iter()
        .map(|&((y, m, d), price)| PricePoint::new(at(y, m, d, 14, 30), price))
        .collect()
}
