//! Monte Carlo retirement projection engine
//!
//! A stochastic financial-planning simulator: given a portfolio of assets
//! and debts plus a parameter bundle describing a household's life-cycle
//! plan, it produces year-by-year percentile trajectories of net worth
//! together with risk metrics (success rate, ruin probabilities, safe
//! floor, drawdown/recovery statistics, sequence-of-returns analysis),
//! milestones, and human-readable insights.
//!
//! The engine is deterministic under a seed, fans trajectories out over a
//! worker pool (the default-on `parallel` feature), and is a pure compute
//! leaf: no I/O, callers own any HTTP/persistence surface.
//!
//! ```ignore
//! use retiresim_core::model::{Portfolio, SimulationOptions, SimulationParams};
//!
//! let params = SimulationParams {
//!     current_age: 35,
//!     retirement_age: 65,
//!     time_horizon_years: 40,
//!     monthly_contribution: 1_500.0,
//!     retirement_monthly_spending: 4_500.0,
//!     ..Default::default()
//! };
//! let options = SimulationOptions { iterations: 5_000, seed: Some(42) };
//! let result = retiresim_core::simulate_with_options(&Portfolio::default(), &params, &options)?;
//! println!("success rate: {:.1}%", result.summary.success_rate);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod insights;
pub mod market;
pub mod metrics;
pub mod milestones;
pub mod portfolio;
pub mod simulation;
pub mod stats;
pub mod trajectory;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{EngineError, Result};
pub use simulation::{simulate, simulate_with_options, simulate_with_progress};
