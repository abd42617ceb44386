//! Simulation driver and request façade
//!
//! Validates the parameter bundle, aggregates the portfolio, fans N
//! trajectory computations out over a worker pool, and reduces the result
//! matrix into per-year percentile projections, the summary roll-up,
//! milestones, and insights.
//!
//! Determinism: each trajectory draws from its own child RNG stream
//! derived from `seed + trajectory index` and writes only its own record,
//! so the result is identical for a given (inputs, seed, iterations)
//! regardless of worker count or scheduling order. Cancellation is checked
//! between trajectories, never mid-trajectory; a cancelled run returns
//! [`EngineError::Cancelled`] with no partial output.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{EngineError, Result};
use crate::model::{
    Portfolio, ProjectionResult, ProjectionSummary, SimulationOptions, SimulationParams,
    SimulationProgress, YearProjection,
};
use crate::portfolio::{self, PortfolioProfile};
use crate::trajectory::{LifeCycle, TrajectoryRecord, simulate_trajectory};
use crate::{insights, market, metrics, milestones, stats};

/// Run a projection with default options (5000 trajectories, clock seed).
pub fn simulate(portfolio: &Portfolio, params: &SimulationParams) -> Result<ProjectionResult> {
    simulate_with_options(portfolio, params, &SimulationOptions::default())
}

/// Run a projection with explicit iteration count and seed.
pub fn simulate_with_options(
    portfolio: &Portfolio,
    params: &SimulationParams,
    options: &SimulationOptions,
) -> Result<ProjectionResult> {
    simulate_with_progress(portfolio, params, options, &SimulationProgress::new())
}

/// Run a projection, reporting completion through `progress` and honouring
/// its cancel flag.
pub fn simulate_with_progress(
    portfolio: &Portfolio,
    params: &SimulationParams,
    options: &SimulationOptions,
    progress: &SimulationProgress,
) -> Result<ProjectionResult> {
    params.validate()?;
    portfolio.validate()?;
    let params = params.normalized();

    let profile = portfolio::aggregate(portfolio, &params)?;
    let life = LifeCycle::from_params(&params);
    let iterations = options.iterations.max(1);
    let seed = options.seed.unwrap_or_else(clock_seed);

    progress.reset();
    if progress.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    if profile.starting_assets == 0.0
        && params.monthly_contribution == 0.0
        && params.retirement_monthly_spending == 0.0
    {
        warn!("degenerate inputs: empty portfolio with no contributions or spending");
    }

    let started = Instant::now();
    debug!(
        iterations,
        horizon = params.time_horizon_years,
        seeded = options.seed.is_some(),
        "starting projection run"
    );

    let records = run_trajectories(&profile, &params, &life, iterations, seed, progress)?;
    if records.is_empty() {
        return Err(EngineError::Internal(
            "aggregation over zero trajectories".into(),
        ));
    }

    let projections = aggregate_projections(&records, &params, &life);
    let summary = build_summary(&records, &projections, &profile, &params, &life);
    let milestones = milestones::derive_milestones(&records, &life, profile.starting_net_worth);
    let insights = insights::generate_insights(&summary, &params);

    debug!(
        success_rate = summary.success_rate,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "projection run complete"
    );

    Ok(ProjectionResult {
        projections,
        summary,
        milestones,
        insights,
    })
}

/// Seed for unseeded runs; the result is non-deterministic but all
/// invariants still hold.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
}

#[cfg(feature = "parallel")]
fn run_trajectories(
    profile: &PortfolioProfile,
    params: &SimulationParams,
    life: &LifeCycle,
    iterations: usize,
    seed: u64,
    progress: &SimulationProgress,
) -> Result<Vec<TrajectoryRecord>> {
    let records: Vec<Option<TrajectoryRecord>> = (0..iterations)
        .into_par_iter()
        .map(|index| {
            if progress.is_cancelled() {
                return None;
            }
            let mut rng = market::trajectory_rng(seed, index as u64);
            let record = simulate_trajectory(profile, params, life, &mut rng);
            progress.increment();
            Some(record)
        })
        .collect();

    if progress.is_cancelled() || records.iter().any(Option::is_none) {
        return Err(EngineError::Cancelled);
    }
    Ok(records.into_iter().flatten().collect())
}

#[cfg(not(feature = "parallel"))]
fn run_trajectories(
    profile: &PortfolioProfile,
    params: &SimulationParams,
    life: &LifeCycle,
    iterations: usize,
    seed: u64,
    progress: &SimulationProgress,
) -> Result<Vec<TrajectoryRecord>> {
    let mut records = Vec::with_capacity(iterations);
    for index in 0..iterations {
        if progress.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let mut rng = market::trajectory_rng(seed, index as u64);
        records.push(simulate_trajectory(profile, params, life, &mut rng));
        progress.increment();
    }
    if progress.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    Ok(records)
}

/// Reduce the result matrix into the per-year percentile series.
fn aggregate_projections(
    records: &[TrajectoryRecord],
    params: &SimulationParams,
    life: &LifeCycle,
) -> Vec<YearProjection> {
    let horizon = params.time_horizon_years as usize;
    let n = records.len() as f64;
    let mut projections = Vec::with_capacity(horizon);
    let mut column = vec![0.0f64; records.len()];

    for year in 0..horizon {
        for (slot, record) in column.iter_mut().zip(records) {
            *slot = record.net_worth[year];
        }
        stats::sort_samples(&mut column);

        let mean_contributions = records
            .iter()
            .map(|r| r.contributions_by_year[year])
            .sum::<f64>()
            / n;
        let mean_withdrawals = records
            .iter()
            .map(|r| r.withdrawals_by_year[year])
            .sum::<f64>()
            / n;

        projections.push(YearProjection {
            year: year as u32 + 1,
            age: life.age_at(year),
            p10: stats::percentile_sorted(&column, 0.10),
            p25: stats::percentile_sorted(&column, 0.25),
            p50: stats::percentile_sorted(&column, 0.50),
            p75: stats::percentile_sorted(&column, 0.75),
            p90: stats::percentile_sorted(&column, 0.90),
            phase: life.phase(year),
            mean_contributions,
            mean_withdrawals,
        });
    }
    projections
}

fn build_summary(
    records: &[TrajectoryRecord],
    projections: &[YearProjection],
    profile: &PortfolioProfile,
    params: &SimulationParams,
    life: &LifeCycle,
) -> ProjectionSummary {
    let n = records.len();
    let failures = records.iter().filter(|r| r.failed()).count();
    // A plan that never enters distribution cannot fail, so this is 100
    // by construction when retirement lies beyond the horizon.
    let success_rate = 100.0 * (n - failures) as f64 / n as f64;

    let final_year = projections.last();
    let enhanced = metrics::compute_enhanced(records, life, profile.starting_net_worth);

    ProjectionSummary {
        starting_net_worth: profile.starting_net_worth,
        final_p10: final_year.map_or(0.0, |y| y.p10),
        final_p25: final_year.map_or(0.0, |y| y.p25),
        final_p50: final_year.map_or(0.0, |y| y.p50),
        final_p75: final_year.map_or(0.0, |y| y.p75),
        final_p90: final_year.map_or(0.0, |y| y.p90),
        years: params.time_horizon_years,
        simulations: n,
        success_rate,
        retirement_year: life.retirement_offset(),
        mean_total_contributions: records
            .iter()
            .map(|r| r.contributions_total)
            .sum::<f64>()
            / n as f64,
        mean_total_withdrawals: records.iter().map(|r| r.withdrawals_total).sum::<f64>()
            / n as f64,
        accumulation_warnings: records.iter().filter(|r| r.accumulation_warning).count(),
        enhanced: Some(enhanced),
    }
}
