use analytics::AnalyticsError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use news::error::NewsError;
use portfolio_backtester::PortfolioError;
use serde_json::json;
use summarizer::error::SummarizerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    #[error("News error: {0}")]
    News(#[from] NewsError),
    #[error("Summarizer error: {0}")]
    Summarizer(#[from] SummarizerError),
    #[error("News summaries are not available: no language model API key is configured")]
    SummarizerUnavailable,
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Portfolio(e) => match e {
                PortfolioError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                PortfolioError::Fetch(_) => StatusCode::BAD_GATEWAY,
                PortfolioError::NoPriceData { .. } => StatusCode::NOT_FOUND,
                PortfolioError::InvalidPrice { .. } | PortfolioError::NoCommonData => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PortfolioError::MissingQuantity { .. } | PortfolioError::DuplicateTicker { .. } => {
                    StatusCode::BAD_REQUEST
                }
                PortfolioError::Unrepresentable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Analytics(e) => match e {
                AnalyticsError::NotEnoughData(_) | AnalyticsError::DivisionByZero(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AnalyticsError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::News(_) | AppError::Summarizer(_) => StatusCode::BAD_GATEWAY,
            AppError::SummarizerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidBody(rejection) => rejection.status(),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::InvalidBody(rejection) => rejection.body_text(),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = ?self, "Internal error.");
                "An internal error occurred".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Upstream failure.");
                self.to_string()
            }
            _ => {
                tracing::warn!(error = %self, "Request rejected.");
                self.to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
