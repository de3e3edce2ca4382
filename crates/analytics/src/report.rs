use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How worrying a single metric looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Risk metrics of a recorded performance history. All figures are percentages rounded to
/// two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Last recorded value against the initial investment.
    pub total_return_pct: Decimal,
    /// Population standard deviation of the period-over-period returns.
    pub volatility_pct: Decimal,
    /// One-sided 95% value at risk: total return minus 1.65 volatilities.
    pub value_at_risk_95_pct: Decimal,
    /// Largest peak-to-trough decline.
    pub max_drawdown_pct: Decimal,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub volatility: RiskLevel,
    pub value_at_risk: RiskLevel,
    pub max_drawdown: RiskLevel,
}

impl RiskAssessment {
    /// Grades each metric against fixed thresholds.
    pub fn grade(volatility_pct: Decimal, value_at_risk_pct: Decimal, max_drawdown_pct: Decimal) -> Self {
        Self {
            volatility: band(volatility_pct, Decimal::from(5), Decimal::from(20)),
            // Losses are negative here, so the scale is flipped.
            value_at_risk: band(-value_at_risk_pct, Decimal::from(2), Decimal::from(5)),
            max_drawdown: band(max_drawdown_pct, Decimal::from(5), Decimal::from(15)),
        }
    }
}

fn band(value: Decimal, low_below: Decimal, high_above: Decimal) -> RiskLevel {
    if value > high_above {
        RiskLevel::High
    } else if value < low_below {
        RiskLevel::Low
    } else {
        RiskLevel::Moderate
    }
}
