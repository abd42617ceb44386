//! Rule-based insight generation
//!
//! A small pure function from the run summary and parameters to a list of
//! human-readable observations, so the rules are independently testable.
//! All thresholds are deterministic given the metrics.

use crate::model::{Insight, InsightKind, ProjectionSummary, SimulationParams};

const DRAWDOWN_WARNING_PCT: f64 = 40.0;
const RECOVERY_WARNING_PCT: f64 = 50.0;
const SEQUENCE_WARNING_SCORE: f64 = 50.0;

/// Emit insights from a run summary. Pure and deterministic given the
/// metrics, so the thresholds are directly testable.
pub fn generate_insights(
    summary: &ProjectionSummary,
    params: &SimulationParams,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if summary.starting_net_worth == 0.0
        && params.monthly_contribution == 0.0
        && params.retirement_monthly_spending == 0.0
    {
        insights.push(Insight {
            kind: InsightKind::Info,
            title: "Nothing to project yet".to_string(),
            message: "Add assets or a monthly contribution to produce a meaningful \
                      projection."
                .to_string(),
        });
        return insights;
    }

    let success = summary.success_rate;
    if success >= 90.0 {
        insights.push(Insight {
            kind: InsightKind::Success,
            title: "On track".to_string(),
            message: format!(
                "The plan succeeds in {success:.0}% of simulated futures. Staying the \
                 course looks sound."
            ),
        });
    } else if success >= 75.0 {
        insights.push(Insight {
            kind: InsightKind::Info,
            title: "Broadly on course".to_string(),
            message: format!(
                "The plan succeeds in {success:.0}% of simulated futures, with some \
                 sensitivity to poor markets."
            ),
        });
    } else if success >= 50.0 {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "Needs work".to_string(),
            message: format!(
                "Only {success:.0}% of simulated futures fund the full plan."
            ),
        });
        let bump = suggested_contribution_bump_pct(success);
        insights.push(Insight {
            kind: InsightKind::Opportunity,
            title: "Raise contributions".to_string(),
            message: format!(
                "Increasing the monthly contribution by about {bump}% would \
                 meaningfully improve the odds."
            ),
        });
    } else {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "At risk".to_string(),
            message: format!(
                "The plan fails in most simulated futures ({:.0}% success). Consider \
                 higher savings, later retirement, or lower spending.",
                success
            ),
        });
    }

    if let Some(metrics) = &summary.enhanced {
        if metrics.recovery.worst_drawdown_pct > DRAWDOWN_WARNING_PCT {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "Deep drawdowns possible".to_string(),
                message: format!(
                    "The worst simulated decline is {:.0}% peak to trough. A more \
                     conservative allocation would soften it.",
                    metrics.recovery.worst_drawdown_pct
                ),
            });
        }
        if metrics.recovery.avg_drawdowns_per_trajectory > 0.0
            && metrics.recovery.recovered_pct < RECOVERY_WARNING_PCT
        {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "Slow recoveries".to_string(),
                message: format!(
                    "Only {:.0}% of major declines recover within the projection \
                     window.",
                    metrics.recovery.recovered_pct
                ),
            });
        }
        if let Some(sequence) = &metrics.sequence
            && sequence.impact_score > SEQUENCE_WARNING_SCORE
        {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "Sequence risk".to_string(),
                message: format!(
                    "Early-retirement market returns swing the outcome heavily \
                     (impact score {:.0}). A cash buffer for the first years after \
                     retiring would reduce it.",
                    sequence.impact_score
                ),
            });
        }
    }

    insights
}

/// Deterministic contribution-bump suggestion for the "needs work" band.
fn suggested_contribution_bump_pct(success_rate: f64) -> u32 {
    (((90.0 - success_rate) / 2.0).ceil() as u32).clamp(10, 50)
}
