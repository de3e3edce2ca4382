use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use core_types::{Interval, PricePoint};

/// Splits `[start, end)` into the request windows the provider will serve for `interval`.
///
/// Intraday bars are only available over a limited look-back per request, so those ranges are
/// cut into consecutive windows of `window_days`. Daily and coarser intervals use one window.
pub fn request_windows(
    start: NaiveDate,
    end: DateTime<Utc>,
    interval: Interval,
    window_days: i64,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut from = start.and_time(NaiveTime::MIN).and_utc();
    if from >= end {
        return Vec::new();
    }
    if !interval.is_intraday() {
        return vec![(from, end)];
    }

    let width = Duration::days(window_days.max(1));
    let mut windows = Vec::new();
    while from < end {
        let to = std::cmp::min(from + width, end);
        windows.push((from, to));
        from = to;
    }
    windows
}

/// Concatenates per-window results, dropping any point not strictly after the last kept one.
///
/// Neighbouring windows share their boundary instant, so the provider may return the same bar
/// twice.
pub fn merge_windows(chunks: Vec<Vec<PricePoint>>) -> Vec<PricePoint> {
    let mut merged: Vec<PricePoint> = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
    for mut chunk in chunks {
        chunk.sort_by_key(|p| p.timestamp);
        for point in chunk {
            if merged.last().is_none_or(|last| point.timestamp > last.timestamp) {
                merged.push(point);
            }
        }
    }
    merged
}
