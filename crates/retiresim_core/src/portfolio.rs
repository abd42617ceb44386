//! Portfolio aggregator
//!
//! Collapses a heterogeneous collection of assets and debts into the
//! per-run initial state: value-weighted expected return and volatility,
//! starting net worth, and the filtered debt schedule.

use crate::error::Result;
use crate::model::{Portfolio, SimulationParams};

/// Per-run initial state produced by aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioProfile {
    /// Value-weighted expected annual return at t=0
    pub expected_return: f64,
    /// Value-weighted annual volatility at t=0
    pub volatility: f64,
    /// Sum of asset values at t=0
    pub starting_assets: f64,
    /// Assets minus filtered debt balances
    pub starting_net_worth: f64,
    pub debts: Vec<DebtSchedule>,
}

/// Runtime view of one debt, ready for monthly amortization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebtSchedule {
    pub balance: f64,
    pub monthly_rate: f64,
    pub minimum_payment: f64,
}

/// Build the initial state for one run.
///
/// Portfolio return and volatility are value-weighted across assets using
/// effective per-asset parameters. An empty (or zero-value) portfolio falls
/// back to the params-level expected return and volatility, so a cash-less
/// household still projects meaningfully from contributions alone. When
/// `exclude_credit_card_debt` is set, revolving debts are dropped before
/// anything else happens.
pub fn aggregate(portfolio: &Portfolio, params: &SimulationParams) -> Result<PortfolioProfile> {
    let mut total_value = 0.0;
    let mut weighted_return = 0.0;
    let mut weighted_volatility = 0.0;

    for asset in &portfolio.assets {
        let class = portfolio.class_of(asset)?;
        total_value += asset.current_value;
        weighted_return += asset.current_value * asset.effective_return(class);
        weighted_volatility += asset.current_value * asset.effective_volatility(class);
    }

    let (expected_return, volatility) = if total_value > 0.0 {
        (weighted_return / total_value, weighted_volatility / total_value)
    } else {
        (params.expected_return, params.volatility)
    };

    let debts: Vec<DebtSchedule> = portfolio
        .debts
        .iter()
        .filter(|debt| !(params.exclude_credit_card_debt && debt.is_revolving()))
        .filter(|debt| debt.balance > 0.0)
        .map(|debt| DebtSchedule {
            balance: debt.balance,
            monthly_rate: debt.interest_rate.unwrap_or(0.0) / 12.0,
            minimum_payment: debt.minimum_payment.unwrap_or(0.0),
        })
        .collect();

    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();

    Ok(PortfolioProfile {
        expected_return,
        volatility,
        starting_assets: total_value,
        starting_net_worth: total_value - total_debt,
        debts,
    })
}
