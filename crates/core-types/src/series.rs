use crate::structs::{PerformancePoint, Ticker};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single close price as fetched from the price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            date: timestamp.date_naive(),
            timestamp,
            price,
        }
    }
}

/// The fetched price series of every asset in one valuation run, keyed by ticker.
///
/// Each series is kept ascending by timestamp with no duplicate instants, which lets lookups
/// binary-search instead of scanning. Iteration order is the ticker order, so results do not
/// depend on the order in which concurrent fetches completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    series: BTreeMap<Ticker, Vec<PricePoint>>,
}

impl HistoricalSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the series for `ticker`, sorting it and dropping repeated instants.
    pub fn insert(&mut self, ticker: Ticker, mut points: Vec<PricePoint>) {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        self.series.insert(ticker, points);
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&[PricePoint]> {
        self.series.get(ticker).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &[PricePoint])> {
        self.series.iter().map(|(t, p)| (t, p.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The first ticker whose series holds no points at all, if any.
    pub fn first_empty(&self) -> Option<&Ticker> {
        self.series
            .iter()
            .find(|(_, points)| points.is_empty())
            .map(|(ticker, _)| ticker)
    }

    /// Drops every point already accounted for by the recorded point `last`.
    pub fn retain_after(&mut self, last: &PerformancePoint) {
        for points in self.series.values_mut() {
            points.retain(|p| !last.covers(p.timestamp));
        }
    }

    /// The price recorded at exactly `timestamp`.
    pub fn price_at(&self, ticker: &Ticker, timestamp: DateTime<Utc>) -> Option<f64> {
        let points = self.series.get(ticker)?;
        points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|i| points[i].price)
    }

    /// The first price recorded on `date`.
    pub fn price_on(&self, ticker: &Ticker, date: NaiveDate) -> Option<f64> {
        let points = self.series.get(ticker)?;
        let i = points.partition_point(|p| p.date < date);
        points.get(i).filter(|p| p.date == date).map(|p| p.price)
    }

    pub fn latest_price(&self, ticker: &Ticker) -> Option<f64> {
        self.series.get(ticker)?.last().map(|p| p.price)
    }

    pub fn first_price(&self, ticker: &Ticker) -> Option<f64> {
        self.series.get(ticker)?.first().map(|p| p.price)
    }
}

impl FromIterator<(Ticker, Vec<PricePoint>)> for HistoricalSeries {
    fn from_iter<I: IntoIterator<Item = (Ticker, Vec<PricePoint>)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (ticker, points) in iter {
            series.insert(ticker, points);
        }
        series
    }
}
