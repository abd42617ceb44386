//! Shared fixtures for the integration tests

use rustc_hash::FxHashMap;

use crate::model::{Asset, AssetClass, AssetClassId, AssetId, Debt, DebtId, Portfolio};

/// A portfolio holding one asset of one class with the given parameters.
pub fn single_asset_portfolio(value: f64, annual_return: f64, volatility: f64) -> Portfolio {
    let mut asset_classes = FxHashMap::default();
    asset_classes.insert(
        AssetClassId(1),
        AssetClass::new("US Stocks", annual_return, volatility),
    );
    Portfolio {
        asset_classes,
        assets: vec![Asset {
            asset_id: AssetId(1),
            name: "Brokerage".to_string(),
            class_id: AssetClassId(1),
            current_value: value,
            custom_return: None,
            custom_volatility: None,
        }],
        debts: Vec::new(),
    }
}

pub fn debt(id: u16, name: &str, balance: f64) -> Debt {
    Debt {
        debt_id: DebtId(id),
        name: name.to_string(),
        balance,
        interest_rate: None,
        minimum_payment: None,
    }
}
