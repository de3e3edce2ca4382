use crate::{error::AppError, AppState};
use analytics::RiskReport;
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use core_types::{Allocation, PerformancePoint, PortfolioInput};
use portfolio_backtester::{BacktestOutcome, HistoryUpdate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A JSON body whose rejection is reported as an `AppError`.
type JsonBody<T> = WithRejection<Json<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub portfolio: Vec<Allocation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsRequest {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct NewsDigest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    pub history: Vec<PerformancePoint>,
    pub start_value: Decimal,
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

/// # POST /api/backtestportfolio
/// Values a fresh portfolio over its full price history.
pub async fn backtest_portfolio(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): JsonBody<BacktestRequest>,
) -> Result<Json<BacktestOutcome>, AppError> {
    tracing::info!(assets = request.portfolio.len(), "Backtest requested.");
    let outcome = state.portfolio.backtest(&request.portfolio).await?;
    Ok(Json(outcome))
}

/// # POST /api/updateportfolio
/// Extends a stored performance history with the bars recorded since its last point.
pub async fn update_portfolio(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): JsonBody<PortfolioInput>,
) -> Result<Json<HistoryUpdate>, AppError> {
    tracing::info!(
        assets = input.data.len(),
        recorded = input.history.len(),
        "History update requested."
    );
    let update = state.portfolio.update(&input).await?;
    Ok(Json(update))
}

/// # POST /api/getnews
/// Collects articles matching the keywords and returns a digest of them.
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): JsonBody<NewsRequest>,
) -> Result<Json<NewsDigest>, AppError> {
    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or(AppError::SummarizerUnavailable)?;

    let keywords = request
        .keywords
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| state.default_keywords.clone());

    let articles = state.news.fetch_articles(&keywords).await?;
    let summary = summarizer.summarize(&articles).await?;
    Ok(Json(NewsDigest { summary }))
}

/// # POST /api/riskmetrics
pub async fn risk_metrics(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): JsonBody<RiskRequest>,
) -> Result<Json<RiskReport>, AppError> {
    let report = state
        .analytics
        .calculate(&request.history, request.start_value)?;
    Ok(Json(report))
}
