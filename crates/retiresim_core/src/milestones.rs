//! Milestone derivation
//!
//! A curated list of wealth targets plus the retirement marker. For each
//! target: the probability of ever reaching it, and the median year of the
//! first crossing among trajectories that get there (reported as 0 when
//! half or fewer ever do).

use crate::model::Milestone;
use crate::stats;
use crate::trajectory::{LifeCycle, TrajectoryRecord};

const WEALTH_TARGETS: [(f64, &str); 3] = [
    (500_000.0, "Reach $500k net worth"),
    (1_000_000.0, "Reach $1M net worth"),
    (2_000_000.0, "Reach $2M net worth"),
];

pub fn derive_milestones(
    records: &[TrajectoryRecord],
    life: &LifeCycle,
    starting_net_worth: f64,
) -> Vec<Milestone> {
    let mut milestones = Vec::new();
    if records.is_empty() {
        return milestones;
    }
    let n = records.len() as f64;

    for (target, description) in WEALTH_TARGETS {
        // Already-banked targets are noise; only look forward.
        if target <= starting_net_worth {
            continue;
        }
        let first_years: Vec<f64> = records
            .iter()
            .filter_map(|record| {
                record
                    .net_worth
                    .iter()
                    .position(|&net| net >= target)
                    .map(|year| year as f64)
            })
            .collect();

        let probability_pct = 100.0 * first_years.len() as f64 / n;
        let median_year = if probability_pct > 50.0 {
            stats::median(&first_years).round() as u32 + 1
        } else {
            0
        };

        milestones.push(Milestone {
            description: description.to_string(),
            target_amount: target,
            median_year,
            probability_pct,
        });
    }

    if let Some(first) = life.first_distribution_year() {
        let at_retirement: Vec<f64> = records.iter().map(|r| r.net_worth[first]).collect();
        milestones.push(Milestone {
            description: "Retirement begins".to_string(),
            target_amount: stats::median(&at_retirement),
            median_year: first as u32 + 1,
            probability_pct: 100.0,
        });
    }

    milestones
}
