//! Year-loop mechanics: phases, contributions, withdrawals, events,
//! debt amortization, and the behavioural guard

use super::helpers::single_asset_portfolio;
use crate::market::trajectory_rng;
use crate::model::{
    BehavioralModel, BehavioralRiskParams, Debt, DebtId, OneTimeEvent, Phase, Portfolio,
    SimulationOptions, SimulationParams, WithdrawalStrategy,
};
use crate::portfolio::aggregate;
use crate::simulation::simulate_with_options;
use crate::trajectory::{LifeCycle, simulate_trajectory};

fn run_deterministic(
    portfolio: &Portfolio,
    params: &SimulationParams,
) -> crate::trajectory::TrajectoryRecord {
    let params = params.normalized();
    let profile = aggregate(portfolio, &params).unwrap();
    let life = LifeCycle::from_params(&params);
    let mut rng = trajectory_rng(0, 0);
    simulate_trajectory(&profile, &params, &life, &mut rng)
}

#[test]
fn phase_follows_retirement_age() {
    let params = SimulationParams {
        current_age: 30,
        retirement_age: 33,
        time_horizon_years: 5,
        ..Default::default()
    };
    let life = LifeCycle::from_params(&params);
    assert_eq!(life.phase(0), Phase::Accumulation);
    assert_eq!(life.phase(2), Phase::Accumulation);
    assert_eq!(life.phase(3), Phase::Distribution);
    assert_eq!(life.phase(4), Phase::Distribution);
    assert_eq!(life.retirement_offset(), 3);
    assert_eq!(life.first_distribution_year(), Some(3));
    assert_eq!(life.distribution_years(), 2);
}

#[test]
fn unset_ages_mean_accumulation_throughout() {
    let params = SimulationParams {
        time_horizon_years: 10,
        ..Default::default()
    };
    let life = LifeCycle::from_params(&params);
    assert_eq!(life.phase(0), Phase::Accumulation);
    assert_eq!(life.phase(9), Phase::Accumulation);
    assert_eq!(life.retirement_offset(), 0);
    assert!(life.first_distribution_year().is_none());
}

#[test]
fn accumulation_matches_closed_form_with_match_cap() {
    let params = SimulationParams {
        time_horizon_years: 5,
        monthly_contribution: 1_000.0,
        contribution_growth: 0.02,
        employer_match_pct: 0.5,
        employer_match_cap: 3_000.0,
        expected_return: 0.06,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&Portfolio::default(), &params);

    let mut expected = 0.0f64;
    for year in 0..5 {
        expected *= 1.06;
        let employee = 12_000.0 * 1.02f64.powi(year);
        // The 50% match of 6k+ is always capped at 3k.
        let contributed = employee + 3_000.0;
        expected += contributed;

        assert!(
            (record.net_worth[year as usize] - expected).abs() < 1e-6,
            "year {year}: expected {expected}, got {}",
            record.net_worth[year as usize]
        );
        assert!((record.contributions_by_year[year as usize] - contributed).abs() < 1e-6);
    }
    assert!(record.failure_year.is_none());
}

#[test]
fn fixed_withdrawal_nets_income_and_grosses_up_taxes() {
    let params = SimulationParams {
        current_age: 65,
        retirement_age: 65,
        time_horizon_years: 1,
        retirement_monthly_spending: 5_000.0,
        social_security_monthly: 1_000.0,
        social_security_start_age: 65,
        pension_monthly: 500.0,
        retirement_tax_rate: 0.2,
        inflation_rate: 0.0,
        expected_return: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(1_000_000.0, 0.0, 0.0), &params);

    // Gap = 60k - 12k - 6k = 42k, grossed up at 20% tax -> 52.5k.
    assert!((record.withdrawals_by_year[0] - 52_500.0).abs() < 1e-6);
    assert!((record.net_worth[0] - 947_500.0).abs() < 1e-6);
}

#[test]
fn dynamic_withdrawal_takes_four_percent_of_balance() {
    let params = SimulationParams {
        current_age: 65,
        retirement_age: 65,
        time_horizon_years: 3,
        withdrawal_strategy: WithdrawalStrategy::Dynamic,
        retirement_monthly_spending: 9_999.0, // ignored by the strategy
        inflation_rate: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(1_000_000.0, 0.0, 0.0), &params);

    assert!((record.withdrawals_by_year[0] - 40_000.0).abs() < 1e-6);
    assert!((record.withdrawals_by_year[1] - 38_400.0).abs() < 1e-6);
    assert!((record.withdrawals_by_year[2] - 36_864.0).abs() < 1e-6);
}

#[test]
fn guardrails_drop_to_three_percent_below_the_band() {
    let params = SimulationParams {
        current_age: 65,
        retirement_age: 65,
        time_horizon_years: 10,
        withdrawal_strategy: WithdrawalStrategy::Guardrails,
        inflation_rate: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(1_000_000.0, 0.0, 0.0), &params);

    // 4% of the 1M baseline until the balance falls below 800k, then 3%.
    let expected = [
        40_000.0, 40_000.0, 40_000.0, 40_000.0, 40_000.0, 40_000.0, 30_000.0, 30_000.0,
        30_000.0, 30_000.0,
    ];
    for (year, want) in expected.iter().enumerate() {
        assert!(
            (record.withdrawals_by_year[year] - want).abs() < 1e-6,
            "year {year}: expected {want}, got {}",
            record.withdrawals_by_year[year]
        );
    }
}

#[test]
fn guardrails_allow_five_percent_above_the_band() {
    let params = SimulationParams {
        current_age: 65,
        retirement_age: 65,
        time_horizon_years: 2,
        withdrawal_strategy: WithdrawalStrategy::Guardrails,
        inflation_rate: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(1_000_000.0, 0.30, 0.0), &params);

    // Baseline is captured at 1.3M after the first year's return; the
    // second year's 30% growth pushes the balance past 120% of it.
    assert!((record.withdrawals_by_year[0] - 52_000.0).abs() < 1e-6);
    assert!((record.withdrawals_by_year[1] - 65_000.0).abs() < 1e-6);
}

#[test]
fn depletion_during_distribution_records_first_failure_year() {
    let params = SimulationParams {
        current_age: 65,
        retirement_age: 65,
        time_horizon_years: 5,
        retirement_monthly_spending: 10_000.0,
        inflation_rate: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(200_000.0, 0.0, 0.0), &params);

    // 120k/yr against 200k: depleted in the second year.
    assert_eq!(record.failure_year, Some(1));
    assert!((record.net_worth[1]).abs() < 1e-9);
    assert!((record.net_worth[4]).abs() < 1e-9, "stays at zero after ruin");
}

#[test]
fn one_time_and_recurring_events_apply_on_schedule() {
    let params = SimulationParams {
        time_horizon_years: 4,
        expected_return: 0.0,
        volatility: 0.0,
        one_time_events: vec![
            OneTimeEvent {
                year: 1,
                amount: 1_000.0,
                recurring: false,
            },
            OneTimeEvent {
                year: 2,
                amount: -500.0,
                recurring: true,
            },
        ],
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(10_000.0, 0.0, 0.0), &params);

    assert!((record.net_worth[0] - 11_000.0).abs() < 1e-9);
    assert!((record.net_worth[1] - 10_500.0).abs() < 1e-9);
    assert!((record.net_worth[2] - 10_000.0).abs() < 1e-9);
    assert!((record.net_worth[3] - 9_500.0).abs() < 1e-9);
}

#[test]
fn debt_amortizes_monthly_and_settles() {
    let mut portfolio = single_asset_portfolio(10_000.0, 0.0, 0.0);
    portfolio.debts.push(Debt {
        debt_id: DebtId(1),
        name: "Auto loan".to_string(),
        balance: 1_200.0,
        interest_rate: None,
        minimum_payment: Some(100.0),
    });
    let params = SimulationParams {
        time_horizon_years: 2,
        expected_return: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&portfolio, &params);

    // Twelve 100 payments clear the zero-interest balance in year one.
    assert!((record.net_worth[0] - 8_800.0).abs() < 1e-9);
    assert!((record.net_worth[1] - 8_800.0).abs() < 1e-9);
}

#[test]
fn debt_interest_accrues_monthly() {
    let mut portfolio = single_asset_portfolio(100_000.0, 0.0, 0.0);
    portfolio.debts.push(Debt {
        debt_id: DebtId(1),
        name: "Mortgage".to_string(),
        balance: 50_000.0,
        interest_rate: Some(0.06),
        minimum_payment: Some(300.0),
    });
    let params = SimulationParams {
        time_horizon_years: 1,
        expected_return: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&portfolio, &params);

    // Replicate the monthly loop: accrue at rate/12, then pay the minimum.
    let mut balance = 50_000.0f64;
    let mut paid = 0.0f64;
    for _ in 0..12 {
        balance += balance * 0.06 / 12.0;
        let payment = 300.0f64.min(balance);
        balance -= payment;
        paid += payment;
    }
    let expected_net = (100_000.0 - paid) - balance;
    assert!(
        (record.net_worth[0] - expected_net).abs() < 1e-6,
        "expected {expected_net}, got {}",
        record.net_worth[0]
    );
}

#[test]
fn unpayable_debt_flags_accumulation_warning_but_continues() {
    let mut portfolio = single_asset_portfolio(1_000.0, 0.0, 0.0);
    portfolio.debts.push(Debt {
        debt_id: DebtId(1),
        name: "Student loan".to_string(),
        balance: 100_000.0,
        interest_rate: None,
        minimum_payment: Some(5_000.0),
    });
    let params = SimulationParams {
        time_horizon_years: 2,
        monthly_contribution: 0.0,
        expected_return: 0.0,
        volatility: 0.0,
        ..Default::default()
    };
    let record = run_deterministic(&portfolio, &params);

    assert!(record.accumulation_warning);
    assert!(record.failure_year.is_none(), "no ruin outside distribution");
    // 60k paid in year one: portfolio goes negative, debt drops to 40k.
    assert!((record.net_worth[0] - (-59_000.0 - 40_000.0)).abs() < 1e-9);
}

#[test]
fn panic_selling_parks_the_portfolio_in_cash() {
    let params = SimulationParams {
        time_horizon_years: 3,
        inflation_rate: 0.03,
        volatility: 0.0,
        behavioral_risk: Some(BehavioralRiskParams {
            enabled: true,
            model: BehavioralModel::Severe,
            panic_sell_threshold: Some(-0.25),
            panic_sell_pct: Some(1.0),
            recovery_delay_months: Some(12),
        }),
        ..Default::default()
    };
    let record = run_deterministic(&single_asset_portfolio(100_000.0, -0.30, 0.0), &params);

    // Year 1: no drawdown yet, full -30% hit. From year 2 the drawdown
    // exceeds the threshold and the whole portfolio earns the cash rate
    // (inflation - 1% = 2%).
    assert!((record.net_worth[0] - 70_000.0).abs() < 1e-6);
    assert!((record.net_worth[1] - 71_400.0).abs() < 1e-6);
    assert!((record.net_worth[2] - 72_828.0).abs() < 1e-6);
}

#[test]
fn disabled_behavioural_block_changes_nothing() {
    let portfolio = single_asset_portfolio(250_000.0, 0.07, 0.15);
    let options = SimulationOptions {
        iterations: 100,
        seed: Some(404),
    };
    let base = SimulationParams {
        current_age: 50,
        retirement_age: 65,
        time_horizon_years: 30,
        monthly_contribution: 800.0,
        retirement_monthly_spending: 3_000.0,
        ..Default::default()
    };
    let with_disabled_block = SimulationParams {
        behavioral_risk: Some(BehavioralRiskParams {
            enabled: false,
            model: BehavioralModel::Severe,
            ..Default::default()
        }),
        ..base.clone()
    };

    let plain = simulate_with_options(&portfolio, &base, &options).unwrap();
    let guarded = simulate_with_options(&portfolio, &with_disabled_block, &options).unwrap();
    assert_eq!(plain, guarded);
}
