//! Portfolio holdings: asset classes, assets, and debts
//!
//! Assets carry a class reference plus optional per-asset overrides for
//! return and volatility. Debts carry a balance, an annual interest rate,
//! and a minimum monthly payment. Debts whose names match a closed set of
//! credit-card keywords are classified as revolving and can be filtered
//! out of the projection.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::{AssetClassId, AssetId, DebtId};
use crate::error::{EngineError, Result};

/// Case-insensitive substrings that mark a debt as revolving credit.
const REVOLVING_KEYWORDS: &[&str] = &[
    "credit card",
    "credit",
    "card",
    "visa",
    "mastercard",
    "amex",
    "american express",
    "discover",
    "chase sapphire",
    "capital one",
    "citi",
    "barclays",
];

/// Immutable reference data describing an asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClass {
    pub name: String,
    /// Default annual return as a fraction (e.g. 0.07)
    pub default_return: f64,
    /// Default annual volatility as a fractional standard deviation
    pub default_volatility: f64,
}

impl AssetClass {
    pub fn new(name: impl Into<String>, default_return: f64, default_volatility: f64) -> Self {
        Self {
            name: name.into(),
            default_return,
            default_volatility,
        }
    }
}

/// A single holding, aggregated at the asset-class level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub name: String,
    pub class_id: AssetClassId,
    pub current_value: f64,
    /// Per-asset annual return override; falls back to the class default
    #[serde(default)]
    pub custom_return: Option<f64>,
    /// Per-asset volatility override; falls back to the class default
    #[serde(default)]
    pub custom_volatility: Option<f64>,
}

impl Asset {
    /// Effective annual return: the override if present, else the class default.
    #[must_use]
    pub fn effective_return(&self, class: &AssetClass) -> f64 {
        self.custom_return.unwrap_or(class.default_return)
    }

    /// Effective annual volatility: the override if present, else the class default.
    #[must_use]
    pub fn effective_volatility(&self, class: &AssetClass) -> f64 {
        self.custom_volatility.unwrap_or(class.default_volatility)
    }
}

/// An outstanding liability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub debt_id: DebtId,
    pub name: String,
    pub balance: f64,
    /// Annual interest rate as a fraction
    #[serde(default)]
    pub interest_rate: Option<f64>,
    /// Minimum monthly payment
    #[serde(default)]
    pub minimum_payment: Option<f64>,
}

impl Debt {
    /// Whether the debt name matches the revolving-credit keyword set.
    #[must_use]
    pub fn is_revolving(&self) -> bool {
        let name = self.name.to_lowercase();
        REVOLVING_KEYWORDS.iter().any(|kw| name.contains(kw))
    }
}

/// The full set of holdings fed into one engine invocation.
///
/// Asset classes are a registry keyed by id; every asset must resolve to a
/// registered class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub asset_classes: FxHashMap<AssetClassId, AssetClass>,
    pub assets: Vec<Asset>,
    pub debts: Vec<Debt>,
}

impl Portfolio {
    /// Resolve an asset's class from the registry.
    pub fn class_of(&self, asset: &Asset) -> Result<&AssetClass> {
        self.asset_classes.get(&asset.class_id).ok_or_else(|| {
            EngineError::InvalidArgument(format!(
                "asset '{}' references unknown asset class {:?}",
                asset.name, asset.class_id
            ))
        })
    }

    /// Reject negative balances before any worker starts.
    pub fn validate(&self) -> Result<()> {
        for asset in &self.assets {
            if !asset.current_value.is_finite() || asset.current_value < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "asset '{}' has a negative or non-finite value",
                    asset.name
                )));
            }
            if asset.custom_volatility.is_some_and(|v| v < 0.0) {
                return Err(EngineError::InvalidArgument(format!(
                    "asset '{}' has a negative volatility override",
                    asset.name
                )));
            }
        }
        for debt in &self.debts {
            if !debt.balance.is_finite() || debt.balance < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "debt '{}' has a negative or non-finite balance",
                    debt.name
                )));
            }
            if debt.interest_rate.is_some_and(|r| r < 0.0) {
                return Err(EngineError::InvalidArgument(format!(
                    "debt '{}' has a negative interest rate",
                    debt.name
                )));
            }
        }
        Ok(())
    }
}
