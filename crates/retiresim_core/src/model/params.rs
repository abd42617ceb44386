//! Simulation parameter bundle
//!
//! Describes the household's life-cycle plan: contribution schedule,
//! retirement spending, Social Security and pension income, employer
//! match, one-time events, withdrawal strategy, and the optional
//! behavioural-risk block. Unspecified fields take documented defaults;
//! the whole bundle is validated once at the façade so the hot loop can
//! dispatch on small enums.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// How withdrawals are sized during the distribution phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStrategy {
    /// Spending-driven: the inflation-indexed spending gap, grossed up for taxes
    #[default]
    Fixed,
    /// Current-balance-driven: 4% of the portfolio value each year
    Dynamic,
    /// Rate banded between 3% and 5% around an inflation-indexed baseline
    Guardrails,
}

/// Behavioural reaction model for panic selling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehavioralModel {
    #[default]
    None,
    Moderate,
    Severe,
}

/// Optional behavioural-risk block.
///
/// When enabled, a trajectory that sees its portfolio fall past the panic
/// threshold sells a fraction into cash and sits out the recovery delay.
/// Explicit fields override the model presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralRiskParams {
    pub enabled: bool,
    pub model: BehavioralModel,
    /// Peak-to-current drawdown that triggers panic selling (negative fraction)
    pub panic_sell_threshold: Option<f64>,
    /// Fraction of the portfolio sold into cash on panic
    pub panic_sell_pct: Option<f64>,
    /// Months spent in cash before re-entering the market
    pub recovery_delay_months: Option<u32>,
}

/// Fully-resolved panic policy used inside the year loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanicPolicy {
    pub threshold: f64,
    pub sell_fraction: f64,
    pub delay_years: u32,
}

impl BehavioralRiskParams {
    /// Resolve the block into a concrete policy, or `None` when disabled.
    #[must_use]
    pub fn policy(&self) -> Option<PanicPolicy> {
        if !self.enabled {
            return None;
        }
        let (threshold, sell_fraction, delay_months) = match self.model {
            BehavioralModel::None => return None,
            BehavioralModel::Moderate => (-0.25, 0.5, 12),
            BehavioralModel::Severe => (-0.15, 1.0, 24),
        };
        let delay_months = self.recovery_delay_months.unwrap_or(delay_months);
        Some(PanicPolicy {
            threshold: self.panic_sell_threshold.unwrap_or(threshold),
            sell_fraction: self.panic_sell_pct.unwrap_or(sell_fraction),
            delay_years: delay_months.div_ceil(12),
        })
    }
}

/// A one-time (or annually recurring) cash-flow event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneTimeEvent {
    /// Year offset from the start of the projection (1-based)
    pub year: u32,
    /// Signed amount: positive adds to the portfolio, negative subtracts
    pub amount: f64,
    /// When true the amount repeats every year from `year` onward
    #[serde(default)]
    pub recurring: bool,
}

/// The household plan driving one projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Projection horizon in years (1..=80)
    pub time_horizon_years: u32,
    /// Current age; 0 means unset (accumulation throughout)
    pub current_age: u32,
    /// Retirement age; 0 means unset
    pub retirement_age: u32,
    pub monthly_contribution: f64,
    /// Fallback expected annual return when the portfolio is empty
    pub expected_return: f64,
    /// Fallback annual volatility when the portfolio is empty
    pub volatility: f64,
    pub inflation_rate: f64,
    /// Annual growth applied to the employee contribution
    pub contribution_growth: f64,
    pub retirement_monthly_spending: f64,
    pub social_security_monthly: f64,
    /// Social Security onset age, normalized into 62..=70
    pub social_security_start_age: u32,
    /// Employer match as a fraction of the employee contribution
    pub employer_match_pct: f64,
    /// Annual cap on the employer match; 0 means uncapped
    pub employer_match_cap: f64,
    pub pension_monthly: f64,
    pub one_time_events: Vec<OneTimeEvent>,
    pub withdrawal_strategy: WithdrawalStrategy,
    /// Effective tax rate applied to retirement withdrawals, in [0, 1)
    pub retirement_tax_rate: f64,
    /// Drop revolving-credit debts before aggregation
    pub exclude_credit_card_debt: bool,
    /// Age-based equity-to-bond rebalancing of the return distribution
    pub glide_path: bool,
    pub behavioral_risk: Option<BehavioralRiskParams>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            time_horizon_years: 30,
            current_age: 0,
            retirement_age: 0,
            monthly_contribution: 0.0,
            expected_return: 0.07,
            volatility: 0.15,
            inflation_rate: 0.03,
            contribution_growth: 0.02,
            retirement_monthly_spending: 0.0,
            social_security_monthly: 0.0,
            social_security_start_age: 67,
            employer_match_pct: 0.0,
            employer_match_cap: 0.0,
            pension_monthly: 0.0,
            one_time_events: Vec::new(),
            withdrawal_strategy: WithdrawalStrategy::Fixed,
            retirement_tax_rate: 0.0,
            exclude_credit_card_debt: false,
            glide_path: false,
            behavioral_risk: None,
        }
    }
}

impl SimulationParams {
    /// Validate the bundle before any worker starts.
    pub fn validate(&self) -> Result<()> {
        if self.time_horizon_years == 0 || self.time_horizon_years > 80 {
            return Err(EngineError::InvalidArgument(
                "time horizon must be between 1 and 80 years".into(),
            ));
        }
        if self.current_age > 0 && self.retirement_age > 0 && self.retirement_age < self.current_age
        {
            return Err(EngineError::InvalidArgument(
                "retirement age must not precede current age".into(),
            ));
        }
        for (label, value) in [
            ("monthly contribution", self.monthly_contribution),
            ("retirement spending", self.retirement_monthly_spending),
            ("social security amount", self.social_security_monthly),
            ("pension amount", self.pension_monthly),
            ("employer match percentage", self.employer_match_pct),
            ("employer match cap", self.employer_match_cap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "{label} must be non-negative"
                )));
            }
        }
        for (label, value) in [
            ("expected return", self.expected_return),
            ("inflation rate", self.inflation_rate),
            ("contribution growth", self.contribution_growth),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidArgument(format!(
                    "{label} must be finite"
                )));
            }
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(EngineError::InvalidArgument(
                "volatility must be non-negative".into(),
            ));
        }
        if !self.retirement_tax_rate.is_finite()
            || !(0.0..1.0).contains(&self.retirement_tax_rate)
        {
            return Err(EngineError::InvalidArgument(
                "retirement tax rate must be in [0, 1)".into(),
            ));
        }
        for event in &self.one_time_events {
            if event.year == 0 {
                return Err(EngineError::InvalidArgument(
                    "one-time event year offset must be at least 1".into(),
                ));
            }
            if !event.amount.is_finite() {
                return Err(EngineError::InvalidArgument(
                    "one-time event amount must be finite".into(),
                ));
            }
        }
        if let Some(behavioral) = &self.behavioral_risk {
            if behavioral.panic_sell_threshold.is_some_and(|t| t >= 0.0) {
                return Err(EngineError::InvalidArgument(
                    "panic sell threshold must be a negative fraction".into(),
                ));
            }
            if behavioral
                .panic_sell_pct
                .is_some_and(|p| !(0.0..=1.0).contains(&p))
            {
                return Err(EngineError::InvalidArgument(
                    "panic sell fraction must be in [0, 1]".into(),
                ));
            }
        }
        Ok(())
    }

    /// Apply normalizations that are clamps rather than errors.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut params = self.clone();
        params.social_security_start_age = if params.social_security_start_age == 0 {
            67
        } else {
            params.social_security_start_age.clamp(62, 70)
        };
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderate_preset_resolves() {
        let block = BehavioralRiskParams {
            enabled: true,
            model: BehavioralModel::Moderate,
            ..Default::default()
        };
        let policy = block.policy().unwrap();
        assert!((policy.threshold - -0.25).abs() < 1e-12);
        assert!((policy.sell_fraction - 0.5).abs() < 1e-12);
        assert_eq!(policy.delay_years, 1);
    }

    #[test]
    fn explicit_fields_override_preset() {
        let block = BehavioralRiskParams {
            enabled: true,
            model: BehavioralModel::Severe,
            panic_sell_threshold: Some(-0.30),
            panic_sell_pct: Some(0.75),
            recovery_delay_months: Some(30),
        };
        let policy = block.policy().unwrap();
        assert!((policy.threshold - -0.30).abs() < 1e-12);
        assert!((policy.sell_fraction - 0.75).abs() < 1e-12);
        assert_eq!(policy.delay_years, 3);
    }

    #[test]
    fn disabled_block_has_no_policy() {
        let block = BehavioralRiskParams {
            enabled: false,
            model: BehavioralModel::Severe,
            ..Default::default()
        };
        assert!(block.policy().is_none());

        let none_model = BehavioralRiskParams {
            enabled: true,
            model: BehavioralModel::None,
            ..Default::default()
        };
        assert!(none_model.policy().is_none());
    }
}
