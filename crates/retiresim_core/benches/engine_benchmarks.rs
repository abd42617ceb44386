//! Criterion benchmarks for the projection engine
//!
//! Run with: cargo bench -p retiresim_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rustc_hash::FxHashMap;

use retiresim_core::model::{
    Asset, AssetClass, AssetClassId, AssetId, Portfolio, SimulationOptions, SimulationParams,
};
use retiresim_core::simulate_with_options;

fn household_portfolio() -> Portfolio {
    let mut asset_classes = FxHashMap::default();
    asset_classes.insert(AssetClassId(1), AssetClass::new("US Stocks", 0.07, 0.15));
    asset_classes.insert(AssetClassId(2), AssetClass::new("Bonds", 0.04, 0.06));
    Portfolio {
        asset_classes,
        assets: vec![
            Asset {
                asset_id: AssetId(1),
                name: "Brokerage".to_string(),
                class_id: AssetClassId(1),
                current_value: 250_000.0,
                custom_return: None,
                custom_volatility: None,
            },
            Asset {
                asset_id: AssetId(2),
                name: "Bond fund".to_string(),
                class_id: AssetClassId(2),
                current_value: 100_000.0,
                custom_return: None,
                custom_volatility: None,
            },
        ],
        debts: Vec::new(),
    }
}

fn household_params(horizon: u32) -> SimulationParams {
    SimulationParams {
        current_age: 40,
        retirement_age: 65,
        time_horizon_years: horizon,
        monthly_contribution: 1_500.0,
        retirement_monthly_spending: 4_500.0,
        social_security_monthly: 2_000.0,
        glide_path: true,
        ..Default::default()
    }
}

fn bench_iteration_counts(c: &mut Criterion) {
    let portfolio = household_portfolio();
    let params = household_params(40);

    let mut group = c.benchmark_group("simulate/iterations");
    for &iterations in &[500usize, 2_000, 5_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &iterations,
            |b, &n| {
                let options = SimulationOptions {
                    iterations: n,
                    seed: Some(42),
                };
                b.iter(|| {
                    black_box(simulate_with_options(&portfolio, &params, &options).unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_horizons(c: &mut Criterion) {
    let portfolio = household_portfolio();

    let mut group = c.benchmark_group("simulate/horizon");
    for &horizon in &[10u32, 40, 80] {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), &horizon, |b, &h| {
            let params = household_params(h);
            let options = SimulationOptions {
                iterations: 1_000,
                seed: Some(42),
            };
            b.iter(|| black_box(simulate_with_options(&portfolio, &params, &options).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_iteration_counts, bench_horizons);
criterion_main!(benches);
