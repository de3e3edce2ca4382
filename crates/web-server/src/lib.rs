use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use analytics::AnalyticsEngine;
use api_client::YahooChartClient;
use configuration::Config;
use news::{NewsSource, WebNewsSource};
use portfolio_backtester::{PortfolioManager, RunSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use summarizer::{ChatSummarizer, Summarize};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub portfolio: PortfolioManager,
    pub analytics: AnalyticsEngine,
    pub news: Arc<dyn NewsSource>,
    /// `None` when no language model key is configured.
    pub summarizer: Option<Arc<dyn Summarize>>,
    pub default_keywords: Vec<String>,
}

impl AppState {
    /// Wires the live price source, news scraper and summarizer from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let price_source = YahooChartClient::new(&config.price_source)?;
        let summarizer = ChatSummarizer::new(&config.summarizer)?
            .map(|s| Arc::new(s) as Arc<dyn Summarize>);

        Ok(Self {
            portfolio: PortfolioManager::new(Arc::new(price_source), RunSettings::from(config)),
            analytics: AnalyticsEngine::new(),
            news: Arc::new(WebNewsSource::new(&config.news)?),
            summarizer,
            default_keywords: config.news.default_keywords.clone(),
        })
    }
}

/// Builds the application router with its middleware.
pub fn router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/backtestportfolio", post(handlers::backtest_portfolio))
        .route("/api/updateportfolio", post(handlers::update_portfolio))
        .route("/api/getnews", post(handlers::get_news))
        .route("/api/riskmetrics", post(handlers::risk_metrics))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit_bytes))
}

/// The main function to configure and run the web server.
/// Tracing is expected to be initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState::from_config(&config)?);
    if state.summarizer.is_none() {
        tracing::warn!("News digests are disabled until a language model API key is configured.");
    }
    let app = router(state, config.server.body_limit_bytes);

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
