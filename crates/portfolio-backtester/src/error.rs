use api_client::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Failed to fetch price data: {0}")]
    Fetch(#[source] ApiError),

    #[error("Rate limited while fetching {ticker} (gave up after {attempts} attempts)")]
    RateLimited { ticker: String, attempts: u32 },

    #[error("No price data available for {ticker}")]
    NoPriceData { ticker: String },

    #[error("Invalid price {price} for {ticker}")]
    InvalidPrice { ticker: String, price: f64 },

    #[error("The assets share no common price dates")]
    NoCommonData,

    #[error("Position {ticker} has no stored quantity to resume from")]
    MissingQuantity { ticker: String },

    #[error("Ticker {ticker} appears more than once in the portfolio")]
    DuplicateTicker { ticker: String },

    #[error("Portfolio value {0} cannot be represented")]
    Unrepresentable(f64),
}

impl From<ApiError> for PortfolioError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::RateLimited { ticker, attempts } => {
                PortfolioError::RateLimited { ticker, attempts }
            }
            other => PortfolioError::Fetch(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiting_keeps_its_own_kind() {
        let error = PortfolioError::from(ApiError::RateLimited {
            ticker: "AAPL".to_string(),
            attempts: 3,
        });
        assert!(matches!(
            error,
            PortfolioError::RateLimited { ref ticker, attempts: 3 } if ticker == "AAPL"
        ));
    }

    #[test]
    fn other_api_errors_are_fetch_errors() {
        let error = PortfolioError::from(ApiError::InvalidData("bad".to_string()));
        assert!(matches!(error, PortfolioError::Fetch(_)));
        assert_eq!(
            error.to_string(),
            "Failed to fetch price data: Invalid data format from API: bad"
        );
    }
}
