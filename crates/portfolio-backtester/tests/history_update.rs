mod common;

use common::{at, daily, day, FakeSource};
use core_types::{
    Allocation, AssetPosition, Interval, PerformancePoint, PortfolioInput, PricePoint, Ticker,
};
use portfolio_backtester::{run_backtest, update_history, PortfolioError, RunSettings};
use rust_decimal_macros::dec;
use serde_json::json;

fn position(ticker: &str, quantity: Option<f64>, startvalue: f64) -> AssetPosition {
    AssetPosition {
        ticker: Ticker::from(ticker),
        quantity,
        value: None,
        startvalue,
    }
}

/// Fifteen-minute bars on 2025-03-03, where MSFT misses the 14:45 bar.
fn intraday_source() -> FakeSource {
    FakeSource::new()
        .with_series(
            "AAPL",
            vec![
                PricePoint::new(at(2025, 3, 3, 14, 30), 100.0),
                PricePoint::new(at(2025, 3, 3, 14, 45), 102.0),
                PricePoint::new(at(2025, 3, 3, 15, 0), 101.0),
            ],
        )
        .with_series(
            "MSFT",
            vec![
                PricePoint::new(at(2025, 3, 3, 14, 30), 50.0),
                PricePoint::new(at(2025, 3, 3, 15, 0), 51.0),
            ],
        )
}

fn fresh_portfolio() -> PortfolioInput {
    PortfolioInput {
        data: vec![position("AAPL", None, 3000.0), position("MSFT", None, 5000.0)],
        history: Vec::new(),
    }
}

#[tokio::test]
async fn bootstrap_allocates_at_first_prices_and_zero_fills() {
    let source = intraday_source();
    let update = update_history(&source, &RunSettings::default(), &fresh_portfolio())
        .await
        .unwrap();

    let values: Vec<_> = update.history.iter().map(|p| (p.timestamp, p.value)).collect();
    assert_eq!(
        values,
        vec![
            (at(2025, 3, 3, 14, 30), dec!(8000.00)),
            // MSFT has no 14:45 bar and counts as zero there.
            (at(2025, 3, 3, 14, 45), dec!(3060.00)),
            (at(2025, 3, 3, 15, 0), dec!(8130.00)),
        ]
    );

    assert_eq!(update.data[0].quantity, Some(30.0));
    assert_eq!(update.data[0].value, Some(101.0));
    assert_eq!(update.data[1].quantity, Some(100.0));
    assert_eq!(update.data[1].value, Some(51.0));
    assert_eq!(update.data[1].startvalue, 5000.0);

    let calls = source.calls();
    assert!(calls
        .iter()
        .all(|(_, interval, start)| *interval == Interval::OneDay && *start == day(2025, 3, 1)));
}

#[tokio::test]
async fn bootstrap_ignores_carried_quantities() {
    let source = intraday_source();
    let mut input = fresh_portfolio();
    input.data[0].quantity = Some(999.0);

    let update = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap();
    assert_eq!(update.data[0].quantity, Some(30.0));
}

#[tokio::test]
async fn second_update_is_empty_and_keeps_quantities() {
    let source = intraday_source();
    let settings = RunSettings::default();

    let first = update_history(&source, &settings, &fresh_portfolio())
        .await
        .unwrap();
    let seeded = PortfolioInput {
        data: first.data.clone(),
        history: first.history.clone(),
    };
    let second = update_history(&source, &settings, &seeded).await.unwrap();

    assert!(second.history.is_empty());
    assert_eq!(second.data, first.data);
    // Resumes on the day of the last recorded point.
    assert!(source.calls()[2..]
        .iter()
        .all(|(_, _, start)| *start == day(2025, 3, 3)));
}

#[tokio::test]
async fn delta_is_strictly_after_the_last_recorded_point() {
    let source = intraday_source();
    let last = at(2025, 3, 3, 14, 30);
    let input = PortfolioInput {
        data: vec![
            position("AAPL", Some(30.0), 3000.0),
            position("MSFT", Some(100.0), 5000.0),
        ],
        history: vec![PerformancePoint::new(last, dec!(8000.00))],
    };

    let update = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap();

    assert_eq!(update.history.len(), 2);
    assert!(update.history.iter().all(|p| p.timestamp > last));
    assert!(update
        .history
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn resume_uses_stored_quantities() {
    let source = intraday_source();
    let input = PortfolioInput {
        data: vec![
            position("AAPL", Some(1.0), 3000.0),
            position("MSFT", Some(2.0), 5000.0),
        ],
        history: vec![PerformancePoint::new(at(2025, 3, 3, 14, 45), dec!(1.00))],
    };

    let update = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap();

    assert_eq!(update.history.len(), 1);
    assert_eq!(update.history[0].value, dec!(203.00));
    assert_eq!(update.data[0].quantity, Some(1.0));
}

#[tokio::test]
async fn missing_series_leaves_everything_unchanged() {
    let source = intraday_source();
    let mut input = fresh_portfolio();
    input.data.push(position("TSLA", None, 2000.0));

    let update = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap();

    assert!(update.history.is_empty());
    assert_eq!(update.data, input.data);
}

#[tokio::test]
async fn resume_without_stored_quantity_fails_before_fetching() {
    let source = intraday_source();
    let input = PortfolioInput {
        data: vec![
            position("AAPL", Some(30.0), 3000.0),
            position("MSFT", None, 5000.0),
        ],
        history: vec![PerformancePoint::new(at(2025, 3, 3, 14, 30), dec!(8000.00))],
    };

    let err = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap_err();

    assert!(matches!(err, PortfolioError::MissingQuantity { ticker } if ticker == "MSFT"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn zero_first_price_is_rejected_on_bootstrap() {
    let source = FakeSource::new().with_series(
        "AAPL",
        vec![PricePoint::new(at(2025, 3, 3, 14, 30), 0.0)],
    );
    let input = PortfolioInput {
        data: vec![position("AAPL", None, 3000.0)],
        history: Vec::new(),
    };

    let err = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidPrice { .. }));
}

#[tokio::test]
async fn non_positive_prices_after_resume_are_rejected() {
    let source = FakeSource::new().with_series(
        "AAPL",
        vec![
            PricePoint::new(at(2025, 3, 3, 14, 30), 100.0),
            PricePoint::new(at(2025, 3, 3, 14, 45), 0.0),
            PricePoint::new(at(2025, 3, 3, 15, 0), -5.0),
        ],
    );
    let input = PortfolioInput {
        data: vec![position("AAPL", Some(30.0), 3000.0)],
        history: vec![PerformancePoint::new(at(2025, 3, 3, 14, 30), dec!(3000.00))],
    };

    let err = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PortfolioError::InvalidPrice { ticker, price } if ticker == "AAPL" && price == 0.0
    ));
}

#[tokio::test]
async fn update_seeded_from_a_backtest_adds_nothing_for_recorded_days() {
    let source = FakeSource::new().with_series(
        "AAPL",
        daily(&[((2024, 1, 1), 100.0), ((2024, 1, 2), 110.0)]),
    );
    let settings = RunSettings {
        backtest_start: day(2024, 1, 1),
        ..RunSettings::default()
    };
    let outcome = run_backtest(
        &source,
        &settings,
        &[Allocation {
            ticker: Ticker::from("AAPL"),
            value: 3000.0,
        }],
    )
    .await
    .unwrap();

    // Stored the way a client keeps it: JSON out, JSON back in.
    let stored = json!({
        "data": outcome.shares,
        "history": outcome.performance,
    });
    let seeded: PortfolioInput = serde_json::from_value(stored).unwrap();
    assert!(seeded.history.iter().all(|p| p.whole_day));

    let update = update_history(&source, &settings, &seeded).await.unwrap();
    assert!(update.history.is_empty());
    assert_eq!(update.data[0].quantity, Some(30.0));
    assert_eq!(update.data[0].value, Some(110.0));
}

#[tokio::test]
async fn update_seeded_from_a_backtest_picks_up_the_next_day() {
    let source = FakeSource::new().with_series(
        "AAPL",
        daily(&[((2024, 1, 1), 100.0), ((2024, 1, 2), 110.0), ((2024, 1, 3), 120.0)]),
    );
    let input = PortfolioInput {
        data: vec![position("AAPL", Some(30.0), 3000.0)],
        history: vec![
            PerformancePoint::for_day(day(2024, 1, 1), dec!(3000.00)),
            PerformancePoint::for_day(day(2024, 1, 2), dec!(3300.00)),
        ],
    };

    let update = update_history(&source, &RunSettings::default(), &input)
        .await
        .unwrap();
    assert_eq!(
        update.history,
        vec![PerformancePoint::new(at(2024, 1, 3, 14, 30), dec!(3600.00))]
    );
}
