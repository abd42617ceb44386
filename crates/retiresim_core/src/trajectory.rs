//! Per-iteration trajectory simulator
//!
//! Advances one household state year-by-year through the accumulation and
//! distribution phases under a drawn market path: contributions and
//! employer match, inflation-indexed spending net of Social Security and
//! pension income, the three withdrawal strategies, one-time events,
//! optional panic-selling, and monthly debt amortization. Records the
//! per-year net worth and cash-flow totals plus the full annual return
//! series for downstream analysis.

use rand::Rng;

use crate::market::{self, GlidePath};
use crate::model::{PanicPolicy, Phase, SimulationParams, WithdrawalStrategy};
use crate::portfolio::{DebtSchedule, PortfolioProfile};

/// Withdrawal rate used by the dynamic strategy and as the guardrails base.
const BASE_WITHDRAWAL_RATE: f64 = 0.04;
const GUARDRAILS_LOWER_RATE: f64 = 0.03;
const GUARDRAILS_UPPER_RATE: f64 = 0.05;
/// Deviation from the inflation-indexed baseline that trips a guardrail.
const GUARDRAILS_BAND: f64 = 0.20;

/// Phase schedule derived once per run from the parameter bundle.
///
/// Ages of zero mean "unset": the household accumulates for the whole
/// horizon and the distribution phase is never entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeCycle {
    current_age: u32,
    retirement_age: u32,
    horizon: u32,
}

impl LifeCycle {
    #[must_use]
    pub fn from_params(params: &SimulationParams) -> Self {
        Self {
            current_age: params.current_age,
            retirement_age: params.retirement_age,
            horizon: params.time_horizon_years,
        }
    }

    #[must_use]
    pub fn ages_known(&self) -> bool {
        self.current_age > 0 && self.retirement_age > 0
    }

    /// Age during a projection year (0-based index); 0 when ages are unset.
    #[must_use]
    pub fn age_at(&self, year: usize) -> u32 {
        if self.current_age == 0 {
            0
        } else {
            self.current_age + year as u32
        }
    }

    /// Phase for a projection year (0-based index).
    #[must_use]
    pub fn phase(&self, year: usize) -> Phase {
        if !self.ages_known() {
            return Phase::Accumulation;
        }
        if self.age_at(year) < self.retirement_age {
            Phase::Accumulation
        } else {
            Phase::Distribution
        }
    }

    /// Year offset at which distribution begins; 0 when ages are unset.
    #[must_use]
    pub fn retirement_offset(&self) -> u32 {
        if self.ages_known() {
            self.retirement_age - self.current_age
        } else {
            0
        }
    }

    /// Index of the first distribution year within the horizon, if any.
    #[must_use]
    pub fn first_distribution_year(&self) -> Option<usize> {
        if !self.ages_known() {
            return None;
        }
        let offset = self.retirement_offset() as usize;
        (offset < self.horizon as usize).then_some(offset)
    }

    /// Number of distribution years inside the horizon.
    #[must_use]
    pub fn distribution_years(&self) -> usize {
        self.first_distribution_year()
            .map_or(0, |first| self.horizon as usize - first)
    }

    /// Glide path anchored at the retirement age, when ages are known.
    #[must_use]
    pub fn glide_path(&self) -> Option<GlidePath> {
        self.ages_known()
            .then(|| GlidePath::new(self.retirement_age))
    }
}

/// Everything one trajectory leaves behind for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRecord {
    /// Net worth (portfolio minus debts) at the end of each year
    pub net_worth: Vec<f64>,
    /// Drawn annual market returns, pre-behavioural
    pub annual_returns: Vec<f64>,
    pub contributions_by_year: Vec<f64>,
    pub withdrawals_by_year: Vec<f64>,
    pub contributions_total: f64,
    pub withdrawals_total: f64,
    /// First year (0-based) the portfolio was depleted during distribution
    pub failure_year: Option<usize>,
    /// The portfolio went insolvent during accumulation
    pub accumulation_warning: bool,
}

impl TrajectoryRecord {
    fn with_capacity(horizon: usize) -> Self {
        Self {
            net_worth: Vec::with_capacity(horizon),
            annual_returns: Vec::with_capacity(horizon),
            contributions_by_year: Vec::with_capacity(horizon),
            withdrawals_by_year: Vec::with_capacity(horizon),
            contributions_total: 0.0,
            withdrawals_total: 0.0,
            failure_year: None,
            accumulation_warning: false,
        }
    }

    /// Net worth in the final projection year.
    #[must_use]
    pub fn final_net_worth(&self) -> f64 {
        self.net_worth.last().copied().unwrap_or(0.0)
    }

    /// Whether the portfolio was ever depleted during distribution.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failure_year.is_some()
    }
}

/// Mutable state advanced through the year loop.
#[derive(Debug, Clone)]
struct TrajectoryState {
    value: f64,
    debts: Vec<DebtSchedule>,
    /// Trailing peak of the portfolio value, for the panic trigger
    peak_value: f64,
    panic_years_left: u32,
    /// Portfolio value at the first distribution year, for guardrails
    guardrails_baseline: Option<f64>,
    retirement_entry_year: usize,
}

impl TrajectoryState {
    fn new(profile: &PortfolioProfile) -> Self {
        Self {
            value: profile.starting_assets,
            debts: profile.debts.clone(),
            peak_value: profile.starting_assets,
            panic_years_left: 0,
            guardrails_baseline: None,
            retirement_entry_year: 0,
        }
    }

    fn debt_total(&self) -> f64 {
        self.debts.iter().map(|d| d.balance).sum()
    }

    /// Floor-and-flag after each mutation block. During distribution a
    /// negative portfolio is ruin; during accumulation it is a warning and
    /// the balance carries so contributions may restore it.
    fn settle(&mut self, phase: Phase, year: usize, record: &mut TrajectoryRecord) {
        if self.value >= 0.0 {
            return;
        }
        match phase {
            Phase::Distribution => {
                self.value = 0.0;
                if record.failure_year.is_none() {
                    record.failure_year = Some(year);
                }
            }
            Phase::Accumulation => {
                record.accumulation_warning = true;
            }
        }
    }
}

/// Run one full trajectory under the given RNG stream.
pub fn simulate_trajectory<R: Rng + ?Sized>(
    profile: &PortfolioProfile,
    params: &SimulationParams,
    life: &LifeCycle,
    rng: &mut R,
) -> TrajectoryRecord {
    let horizon = params.time_horizon_years as usize;
    let mut state = TrajectoryState::new(profile);
    let mut record = TrajectoryRecord::with_capacity(horizon);

    let policy = params.behavioral_risk.as_ref().and_then(|b| b.policy());
    let glide = params.glide_path.then(|| life.glide_path()).flatten();
    // Cash parked after a panic earns 1% below inflation.
    let cash_rate = params.inflation_rate - 0.01;

    for year in 0..horizon {
        let phase = life.phase(year);

        // Draw the annual market return, glide-path adjusted when enabled.
        let (mean, std_dev) = match &glide {
            Some(g) => g.blended(life.age_at(year)),
            None => (profile.expected_return, profile.volatility),
        };
        let drawn = market::draw_annual_return(mean, std_dev, rng);
        record.annual_returns.push(drawn);

        let effective = apply_panic(&policy, &mut state, drawn, cash_rate);
        state.value *= 1.0 + effective;

        let growth_factor = (1.0 + params.contribution_growth).powi(year as i32);
        let inflation_factor = (1.0 + params.inflation_rate).powi(year as i32);

        let mut contributed = 0.0;
        let mut withdrawn = 0.0;

        match phase {
            Phase::Accumulation => {
                let employee = params.monthly_contribution * 12.0 * growth_factor;
                let mut matched = employee * params.employer_match_pct;
                if params.employer_match_cap > 0.0 {
                    matched = matched.min(params.employer_match_cap);
                }
                contributed = employee + matched;
                state.value += contributed;
            }
            Phase::Distribution => {
                if state.guardrails_baseline.is_none() {
                    state.guardrails_baseline = Some(state.value);
                    state.retirement_entry_year = year;
                }
                withdrawn = required_withdrawal(params, life, &state, year, inflation_factor);
                state.value -= withdrawn;
                state.settle(phase, year, &mut record);
            }
        }

        // One-time events: matched year, or every year from it when recurring.
        for event in &params.one_time_events {
            let offset = event.year as usize;
            if offset == year + 1 || (event.recurring && offset <= year + 1) {
                state.value += event.amount;
            }
        }
        state.settle(phase, year, &mut record);

        // Debt service: monthly interest accrual with monthly payments.
        let debt_paid = service_debts(&mut state.debts);
        if debt_paid > 0.0 {
            state.value -= debt_paid;
            if phase == Phase::Distribution {
                withdrawn += debt_paid;
            }
            state.settle(phase, year, &mut record);
        }

        if state.value > state.peak_value {
            state.peak_value = state.value;
        }

        record.net_worth.push(state.value - state.debt_total());
        record.contributions_by_year.push(contributed);
        record.withdrawals_by_year.push(withdrawn);
        record.contributions_total += contributed;
        record.withdrawals_total += withdrawn;
    }

    record
}

/// Behavioural override for the year's return.
///
/// A trajectory already parked in cash blends the cash rate over the sold
/// fraction and counts down the delay. Otherwise the trailing drawdown is
/// checked against the panic threshold; crossing it parks the sold
/// fraction starting this year. Disabled policy means the drawn return
/// passes through untouched and no state is consulted.
fn apply_panic(
    policy: &Option<PanicPolicy>,
    state: &mut TrajectoryState,
    drawn: f64,
    cash_rate: f64,
) -> f64 {
    let Some(policy) = policy else {
        return drawn;
    };
    let parked = |drawn: f64| {
        (1.0 - policy.sell_fraction) * drawn + policy.sell_fraction * cash_rate
    };
    if state.panic_years_left > 0 {
        state.panic_years_left -= 1;
        return parked(drawn);
    }
    if state.peak_value > 0.0 {
        let drawdown = state.value / state.peak_value - 1.0;
        if drawdown <= policy.threshold {
            // The trigger year itself is the first parked year.
            state.panic_years_left = policy.delay_years.saturating_sub(1);
            return parked(drawn);
        }
    }
    drawn
}

/// Gross withdrawal required for one distribution year.
fn required_withdrawal(
    params: &SimulationParams,
    life: &LifeCycle,
    state: &TrajectoryState,
    year: usize,
    inflation_factor: f64,
) -> f64 {
    match params.withdrawal_strategy {
        WithdrawalStrategy::Fixed => {
            let spending = params.retirement_monthly_spending * 12.0 * inflation_factor;
            let age = life.age_at(year);
            let social_security = if age >= params.social_security_start_age {
                params.social_security_monthly * 12.0 * inflation_factor
            } else {
                0.0
            };
            let pension = params.pension_monthly * 12.0 * inflation_factor;
            let gap = (spending - social_security - pension).max(0.0);
            gap / (1.0 - params.retirement_tax_rate)
        }
        WithdrawalStrategy::Dynamic => BASE_WITHDRAWAL_RATE * state.value.max(0.0),
        WithdrawalStrategy::Guardrails => {
            let entry_value = state.guardrails_baseline.unwrap_or(state.value);
            let years_in = (year - state.retirement_entry_year) as i32;
            let baseline = entry_value * (1.0 + params.inflation_rate).powi(years_in);
            let rate = if state.value < (1.0 - GUARDRAILS_BAND) * baseline {
                GUARDRAILS_LOWER_RATE
            } else if state.value > (1.0 + GUARDRAILS_BAND) * baseline {
                GUARDRAILS_UPPER_RATE
            } else {
                BASE_WITHDRAWAL_RATE
            };
            rate * baseline
        }
    }
}

/// Advance all debts by one year of monthly accrual and minimum payments.
/// Returns the total paid; settled debts are dropped from the schedule.
fn service_debts(debts: &mut Vec<DebtSchedule>) -> f64 {
    let mut paid = 0.0;
    for debt in debts.iter_mut() {
        for _ in 0..12 {
            if debt.balance <= 0.0 {
                break;
            }
            debt.balance += debt.balance * debt.monthly_rate;
            let payment = debt.minimum_payment.min(debt.balance);
            debt.balance -= payment;
            paid += payment;
        }
        if debt.balance < 1e-9 {
            debt.balance = 0.0;
        }
    }
    debts.retain(|d| d.balance > 0.0);
    paid
}
