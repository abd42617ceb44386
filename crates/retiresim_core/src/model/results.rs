//! Projection results, risk metrics, and the progress handle
//!
//! Contains the output types of a simulation run: the per-year percentile
//! projections, the summary roll-up with optional enhanced metrics,
//! milestones, insights, and the cloneable progress/cancellation handle
//! shared with the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Life-cycle phase for a projection year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Accumulation,
    Distribution,
}

/// Net-worth percentiles and mean cash flows for a single projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    /// Year offset from the start of the projection (1-based)
    pub year: u32,
    /// Age during this year; 0 when the current age is unset
    pub age: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub phase: Phase,
    /// Mean contributions added this year across trajectories
    pub mean_contributions: f64,
    /// Mean withdrawals (incl. debt service in distribution) across trajectories
    pub mean_withdrawals: f64,
}

/// Probability of ruin at or before a reporting age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinPoint {
    pub age: u32,
    pub probability_pct: f64,
    pub years_out: u32,
}

/// Downside-protection summary: the 5th percentile of per-trajectory minima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeFloor {
    pub value: f64,
    /// Median year (1-based) at which the minimum occurs
    pub year: u32,
    pub age: u32,
    pub description: String,
}

/// Statistics over 20%+ peak-to-trough drawdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAnalysis {
    /// Mean years from trough back to the prior peak, over recovered drawdowns
    pub avg_recovery_years: f64,
    /// Worst observed peak-to-trough decline, as a percentage
    pub worst_drawdown_pct: f64,
    pub avg_drawdowns_per_trajectory: f64,
    /// Share of 20%+ drawdowns that fully recovered, as a percentage
    pub recovered_pct: f64,
}

/// One cohort in the first-decade sequence split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeCohort {
    pub mean_return: f64,
    pub success_rate: f64,
    pub mean_final_wealth: f64,
}

/// A window of heightened sequence-of-returns sensitivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityPeriod {
    pub start_age: u32,
    pub end_age: u32,
    pub risk_factor: f64,
    pub description: String,
}

/// Sensitivity of outcomes to the order in which returns occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    /// Best-minus-worst decile success spread, clamped to [0, 100]
    pub impact_score: f64,
    pub vulnerability_periods: Vec<VulnerabilityPeriod>,
    pub worst_decade: DecadeCohort,
    pub best_decade: DecadeCohort,
    /// Pearson correlation between first-decade mean return and success
    pub return_success_correlation: f64,
}

/// Risk metrics derived from the full trajectory set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMetrics {
    pub median_final_wealth: f64,
    pub ruin_by_age: Vec<RuinPoint>,
    pub safe_floor: SafeFloor,
    pub recovery: RecoveryAnalysis,
    /// Share of trajectories lasting at least half the distribution years
    pub partial_success_rate: f64,
    /// Median years into retirement at ruin, over failing trajectories; 0 if none
    pub median_years_to_ruin: f64,
    /// Median net worth in the year before ruin, over failing trajectories
    pub median_wealth_at_ruin: f64,
    pub sequence: Option<SequenceAnalysis>,
}

/// Scalar roll-up over the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub starting_net_worth: f64,
    pub final_p10: f64,
    pub final_p25: f64,
    pub final_p50: f64,
    pub final_p75: f64,
    pub final_p90: f64,
    pub years: u32,
    pub simulations: usize,
    /// Percent of trajectories never depleted during distribution
    pub success_rate: f64,
    /// Year offset at which distribution begins; 0 when ages are unset
    pub retirement_year: u32,
    pub mean_total_contributions: f64,
    pub mean_total_withdrawals: f64,
    /// Trajectories that went insolvent during accumulation
    pub accumulation_warnings: usize,
    pub enhanced: Option<EnhancedMetrics>,
}

/// A named wealth target and the odds of reaching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub description: String,
    pub target_amount: f64,
    /// Median year (1-based) the target is first crossed; 0 when reached by half or fewer
    pub median_year: u32,
    pub probability_pct: f64,
}

/// Classification of a generated insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Opportunity,
    Info,
    Success,
}

/// A human-readable observation derived from the run metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

/// Complete result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub projections: Vec<YearProjection>,
    pub summary: ProjectionSummary,
    pub milestones: Vec<Milestone>,
    pub insights: Vec<Insight>,
}

impl ProjectionResult {
    /// Median net worth in the final projection year.
    #[must_use]
    pub fn final_p50(&self) -> f64 {
        self.summary.final_p50
    }

    /// The projection row for a given year offset (1-based).
    #[must_use]
    pub fn year(&self, year: u32) -> Option<&YearProjection> {
        self.projections.iter().find(|p| p.year == year)
    }
}

/// Options for one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Number of trajectories to run
    pub iterations: usize,
    /// Seed for the deterministic trajectory streams; `None` derives one
    /// from the wall clock
    pub seed: Option<u64>,
}

impl SimulationOptions {
    pub const DEFAULT_ITERATIONS: usize = 5_000;
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

#[derive(Debug, Default)]
struct ProgressInner {
    completed: AtomicUsize,
    cancelled: AtomicBool,
}

/// Cloneable progress/cancellation handle.
///
/// Workers increment the completed counter after each trajectory and check
/// the cancel flag between trajectories, never mid-trajectory. Cancelling
/// makes the engine return [`crate::EngineError::Cancelled`] without a
/// partial result.
#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    inner: Arc<ProgressInner>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the completed counter for a new run. Leaves the cancel flag alone.
    pub fn reset(&self) {
        self.inner.completed.store(0, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.inner.completed.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }
}
