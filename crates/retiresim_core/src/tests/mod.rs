//! Integration tests for the projection engine
//!
//! Tests are organized by topic:
//! - `facade` - Validation, defaults, and degenerate inputs
//! - `portfolio` - Aggregation, overrides, and debt filtering
//! - `trajectory` - Year-loop mechanics (phases, match, debts, events, panic)
//! - `simulation` - Whole-run invariants: quantile ordering, determinism
//! - `metrics` - Drawdowns, ruin statistics, sequence analysis
//! - `scenarios` - End-to-end household scenarios

mod helpers;
mod trajectory;
