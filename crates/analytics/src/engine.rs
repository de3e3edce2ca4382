use crate::error::AnalyticsError;
use crate::report::{RiskAssessment, RiskReport};
use core_types::PerformancePoint;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// z-score of the one-sided 95% confidence level.
const Z_95: Decimal = Decimal::from_parts(165, 0, 0, false, 2);

/// A stateless calculator for deriving risk metrics from a performance history.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the risk report of `history`, measured against the initial investment.
    ///
    /// Points are taken in timestamp order regardless of how they were submitted.
    pub fn calculate(
        &self,
        history: &[PerformancePoint],
        start_value: Decimal,
    ) -> Result<RiskReport, AnalyticsError> {
        if history.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "need at least 2 history points, got {}",
                history.len()
            )));
        }

        let mut points: Vec<&PerformancePoint> = history.iter().collect();
        points.sort_by_key(|p| p.timestamp);
        let values: Vec<Decimal> = points.iter().map(|p| p.value).collect();

        let total_return = self.total_return(&values, start_value)?;
        let volatility = self.volatility(&values)?;
        let value_at_risk = total_return - Z_95 * volatility;
        let max_drawdown = self.max_drawdown(&values)?;

        let hundred = Decimal::ONE_HUNDRED;
        let total_return_pct = (total_return * hundred).round_dp(2);
        let volatility_pct = (volatility * hundred).round_dp(2);
        let value_at_risk_95_pct = (value_at_risk * hundred).round_dp(2);
        let max_drawdown_pct = (max_drawdown * hundred).round_dp(2);

        tracing::debug!(
            points = values.len(),
            %total_return_pct,
            %volatility_pct,
            %max_drawdown_pct,
            "Calculated risk metrics."
        );

        Ok(RiskReport {
            total_return_pct,
            volatility_pct,
            value_at_risk_95_pct,
            max_drawdown_pct,
            assessment: RiskAssessment::grade(volatility_pct, value_at_risk_95_pct, max_drawdown_pct),
        })
    }

    fn total_return(&self, values: &[Decimal], start_value: Decimal) -> Result<Decimal, AnalyticsError> {
        let last = values
            .last()
            .ok_or_else(|| AnalyticsError::NotEnoughData("empty history".to_string()))?;
        (*last - start_value)
            .checked_div(start_value)
            .ok_or_else(|| AnalyticsError::DivisionByZero("total_return".to_string()))
    }

    /// Population standard deviation of consecutive returns, as a fraction.
    fn volatility(&self, values: &[Decimal]) -> Result<Decimal, AnalyticsError> {
        let returns = values
            .windows(2)
            .map(|w| {
                (w[1] - w[0])
                    .checked_div(w[0])
                    .ok_or_else(|| AnalyticsError::DivisionByZero("volatility".to_string()))
            })
            .collect::<Result<Vec<Decimal>, _>>()?;

        let count = Decimal::from(returns.len());
        let mean = returns.iter().sum::<Decimal>() / count;
        let variance = returns
            .iter()
            .map(|r| (*r - mean) * (*r - mean))
            .sum::<Decimal>()
            / count;

        variance.sqrt().ok_or_else(|| {
            AnalyticsError::InternalError("Failed to calculate square root for variance".to_string())
        })
    }

    /// Largest decline from a running peak, as a fraction of that peak.
    fn max_drawdown(&self, values: &[Decimal]) -> Result<Decimal, AnalyticsError> {
        let mut peak = values[0];
        let mut max_drawdown = Decimal::ZERO;

        for &value in values {
            if value > peak {
                peak = value;
            }
            let drawdown = (peak - value)
                .checked_div(peak)
                .ok_or_else(|| AnalyticsError::DivisionByZero("max_drawdown".to_string()))?;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
        Ok(max_drawdown)
    }
}
