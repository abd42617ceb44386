//! Enhanced risk metrics over the trajectory set
//!
//! Everything here is a pure function from the per-trajectory records to
//! summary statistics: ruin probabilities by age, the safe floor,
//! drawdown/recovery behaviour, partial success, ruin timing and depth,
//! and sequence-of-returns analysis.

use crate::model::{
    DecadeCohort, EnhancedMetrics, RecoveryAnalysis, RuinPoint, SafeFloor, SequenceAnalysis,
    VulnerabilityPeriod,
};
use crate::stats;
use crate::trajectory::{LifeCycle, TrajectoryRecord};

/// Ages at which ruin probabilities are reported.
const RUIN_REPORTING_AGES: [u32; 6] = [65, 70, 75, 80, 85, 90];

/// Minimum peak-to-trough decline that counts as a drawdown episode.
const DRAWDOWN_THRESHOLD: f64 = 0.20;

/// First-decade window length for sequence analysis.
const SEQUENCE_DECADE_YEARS: usize = 10;

/// A 20%+ peak-to-trough episode found in one trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DrawdownEpisode {
    /// Peak-to-trough decline as a positive fraction
    pub depth: f64,
    pub recovered: bool,
    /// Years from the trough back to the prior peak; 0 when unrecovered
    pub years_to_recover: usize,
}

/// Derive the full metric set from the per-trajectory records.
pub fn compute_enhanced(
    records: &[TrajectoryRecord],
    life: &LifeCycle,
    starting_net_worth: f64,
) -> EnhancedMetrics {
    let finals: Vec<f64> = records.iter().map(TrajectoryRecord::final_net_worth).collect();

    EnhancedMetrics {
        median_final_wealth: stats::median(&finals),
        ruin_by_age: ruin_by_age(records, life),
        safe_floor: safe_floor(records, life),
        recovery: recovery_analysis(records),
        partial_success_rate: partial_success_rate(records, life),
        median_years_to_ruin: median_years_to_ruin(records, life),
        median_wealth_at_ruin: median_wealth_at_ruin(records, starting_net_worth),
        sequence: sequence_analysis(records, life),
    }
}

fn ruin_by_age(records: &[TrajectoryRecord], life: &LifeCycle) -> Vec<RuinPoint> {
    if !life.ages_known() || records.is_empty() {
        return Vec::new();
    }
    let horizon = records[0].net_worth.len();
    if horizon == 0 {
        return Vec::new();
    }
    let first_age = life.age_at(0);
    let last_age = life.age_at(horizon - 1);
    let n = records.len() as f64;

    RUIN_REPORTING_AGES
        .iter()
        .filter(|&&age| age >= first_age && age <= last_age)
        .map(|&age| {
            let ruined = records
                .iter()
                .filter(|r| r.failure_year.is_some_and(|fy| life.age_at(fy) <= age))
                .count();
            RuinPoint {
                age,
                probability_pct: 100.0 * ruined as f64 / n,
                years_out: age - first_age,
            }
        })
        .collect()
}

fn safe_floor(records: &[TrajectoryRecord], life: &LifeCycle) -> SafeFloor {
    let mut minima = Vec::with_capacity(records.len());
    let mut min_years: Vec<f64> = Vec::with_capacity(records.len());

    for record in records {
        let mut low = f64::INFINITY;
        let mut low_year = 0usize;
        for (year, &net) in record.net_worth.iter().enumerate() {
            if net < low {
                low = net;
                low_year = year;
            }
        }
        if low.is_finite() {
            minima.push(low);
            min_years.push(low_year as f64);
        }
    }

    stats::sort_samples(&mut minima);
    let value = stats::percentile_sorted(&minima, 0.05);
    let median_year = stats::median(&min_years).round().max(0.0) as usize;

    SafeFloor {
        value,
        year: median_year as u32 + 1,
        age: life.age_at(median_year),
        description: format!(
            "In 95% of outcomes net worth never falls below ${value:.0}",
        ),
    }
}

/// Scan one net-worth series for 20%+ peak-to-trough episodes.
pub(crate) fn scan_drawdowns(series: &[f64]) -> Vec<DrawdownEpisode> {
    let mut episodes = Vec::new();
    let Some(&first) = series.first() else {
        return episodes;
    };
    let mut peak = first;
    let mut in_drawdown = false;
    let mut trough = first;
    let mut trough_year = 0usize;

    for (year, &value) in series.iter().enumerate().skip(1) {
        if !in_drawdown {
            if value >= peak {
                peak = value;
            } else if peak > 0.0 && (peak - value) / peak >= DRAWDOWN_THRESHOLD {
                in_drawdown = true;
                trough = value;
                trough_year = year;
            }
        } else {
            if value < trough {
                trough = value;
                trough_year = year;
            }
            if value >= peak {
                episodes.push(DrawdownEpisode {
                    depth: (peak - trough) / peak,
                    recovered: true,
                    years_to_recover: year - trough_year,
                });
                in_drawdown = false;
                peak = value;
            }
        }
    }
    if in_drawdown {
        episodes.push(DrawdownEpisode {
            depth: (peak - trough) / peak,
            recovered: false,
            years_to_recover: 0,
        });
    }
    episodes
}

fn recovery_analysis(records: &[TrajectoryRecord]) -> RecoveryAnalysis {
    let mut episode_count = 0usize;
    let mut recovered_count = 0usize;
    let mut recovery_years_sum = 0usize;
    let mut worst_depth: f64 = 0.0;

    for record in records {
        for episode in scan_drawdowns(&record.net_worth) {
            episode_count += 1;
            worst_depth = worst_depth.max(episode.depth);
            if episode.recovered {
                recovered_count += 1;
                recovery_years_sum += episode.years_to_recover;
            }
        }
    }

    let avg_recovery_years = if recovered_count > 0 {
        recovery_years_sum as f64 / recovered_count as f64
    } else {
        0.0
    };
    let recovered_pct = if episode_count > 0 {
        100.0 * recovered_count as f64 / episode_count as f64
    } else {
        100.0
    };

    RecoveryAnalysis {
        avg_recovery_years,
        worst_drawdown_pct: worst_depth * 100.0,
        avg_drawdowns_per_trajectory: if records.is_empty() {
            0.0
        } else {
            episode_count as f64 / records.len() as f64
        },
        recovered_pct,
    }
}

fn partial_success_rate(records: &[TrajectoryRecord], life: &LifeCycle) -> f64 {
    let distribution_years = life.distribution_years();
    let Some(first) = life.first_distribution_year() else {
        return 100.0;
    };
    if records.is_empty() {
        return 100.0;
    }
    let needed = 0.5 * distribution_years as f64;
    let lasted = records
        .iter()
        .filter(|r| match r.failure_year {
            None => true,
            Some(fy) => (fy.saturating_sub(first)) as f64 >= needed,
        })
        .count();
    100.0 * lasted as f64 / records.len() as f64
}

fn median_years_to_ruin(records: &[TrajectoryRecord], life: &LifeCycle) -> f64 {
    let first = life.first_distribution_year().unwrap_or(0);
    let years: Vec<f64> = records
        .iter()
        .filter_map(|r| r.failure_year)
        .map(|fy| (fy.saturating_sub(first) + 1) as f64)
        .collect();
    if years.is_empty() { 0.0 } else { stats::median(&years) }
}

fn median_wealth_at_ruin(records: &[TrajectoryRecord], starting_net_worth: f64) -> f64 {
    let wealth: Vec<f64> = records
        .iter()
        .filter_map(|r| {
            r.failure_year.map(|fy| {
                if fy == 0 {
                    starting_net_worth
                } else {
                    r.net_worth[fy - 1]
                }
            })
        })
        .collect();
    if wealth.is_empty() { 0.0 } else { stats::median(&wealth) }
}

fn sequence_analysis(records: &[TrajectoryRecord], life: &LifeCycle) -> Option<SequenceAnalysis> {
    let first = life.first_distribution_year()?;
    if records.len() < 2 {
        return None;
    }
    let horizon = records[0].annual_returns.len();
    let window_end = (first + SEQUENCE_DECADE_YEARS).min(horizon);
    if window_end <= first {
        return None;
    }

    let decade_means: Vec<f64> = records
        .iter()
        .map(|r| stats::mean(&r.annual_returns[first..window_end]))
        .collect();
    let success_flags: Vec<f64> = records
        .iter()
        .map(|r| if r.failed() { 0.0 } else { 1.0 })
        .collect();

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        decade_means[a]
            .partial_cmp(&decade_means[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cohort_size = (records.len() / 10).max(1);
    let worst = cohort(&order[..cohort_size], &decade_means, records);
    let best = cohort(&order[records.len() - cohort_size..], &decade_means, records);

    let impact_score = (best.success_rate - worst.success_rate).clamp(0.0, 100.0);
    let start_age = life.age_at(first);

    Some(SequenceAnalysis {
        impact_score,
        vulnerability_periods: vec![VulnerabilityPeriod {
            start_age,
            end_age: start_age + 5,
            risk_factor: 2.0,
            description: "The first five retirement years carry roughly twice the \
                          impact of later years on lifetime outcomes"
                .to_string(),
        }],
        worst_decade: worst,
        best_decade: best,
        return_success_correlation: stats::pearson(&decade_means, &success_flags),
    })
}

fn cohort(indices: &[usize], decade_means: &[f64], records: &[TrajectoryRecord]) -> DecadeCohort {
    let n = indices.len().max(1) as f64;
    let mean_return = indices.iter().map(|&i| decade_means[i]).sum::<f64>() / n;
    let successes = indices.iter().filter(|&&i| !records[i].failed()).count();
    let mean_final_wealth = indices
        .iter()
        .map(|&i| records[i].final_net_worth())
        .sum::<f64>()
        / n;
    DecadeCohort {
        mean_return,
        success_rate: 100.0 * successes as f64 / n,
        mean_final_wealth,
    }
}
