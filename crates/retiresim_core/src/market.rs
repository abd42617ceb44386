//! RNG & distribution layer
//!
//! Seedable pseudo-random streams and the annual-return distribution.
//! Every trajectory draws from its own child stream derived from
//! `seed + trajectory index`, so increasing the trajectory count only
//! appends trajectories and worker scheduling cannot affect the output.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng, distr::Distribution};
use rand_distr::Normal;

/// Stock proxy used by the glide path: (annual return, volatility).
pub const STOCK_PROXY: (f64, f64) = (0.10, 0.18);
/// Bond proxy used by the glide path: (annual return, volatility).
pub const BOND_PROXY: (f64, f64) = (0.04, 0.06);

const EQUITY_SHARE_MAX: f64 = 0.90;
const EQUITY_SHARE_MIN: f64 = 0.40;
const EQUITY_FULL_UNTIL_AGE: u32 = 35;

/// Child stream for trajectory `index` under the run seed.
#[must_use]
pub fn trajectory_rng(seed: u64, index: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_add(index))
}

/// Draw one annual return from Normal(mean, std_dev).
///
/// Zero volatility yields the mean exactly, which is what collapses the
/// five quantile curves onto one deterministic path. Distribution
/// parameters are validated at the façade, so construction cannot fail
/// here; the mean is the fallback regardless.
pub fn draw_annual_return<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    if std_dev <= 0.0 {
        return mean;
    }
    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

/// Age-dependent rebalancing from equities toward bonds.
///
/// The equity share falls linearly from 0.90 at age 35 or below to 0.40 at
/// the retirement age, and stays at 0.40 afterwards. Return mean and
/// volatility are blended between the stock and bond proxies accordingly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlidePath {
    retirement_age: u32,
}

impl GlidePath {
    #[must_use]
    pub fn new(retirement_age: u32) -> Self {
        Self { retirement_age }
    }

    /// Equity share at a given age.
    #[must_use]
    pub fn equity_share(&self, age: u32) -> f64 {
        if age >= self.retirement_age || self.retirement_age <= EQUITY_FULL_UNTIL_AGE {
            return EQUITY_SHARE_MIN;
        }
        if age <= EQUITY_FULL_UNTIL_AGE {
            return EQUITY_SHARE_MAX;
        }
        let span = (self.retirement_age - EQUITY_FULL_UNTIL_AGE) as f64;
        let progressed = (age - EQUITY_FULL_UNTIL_AGE) as f64;
        EQUITY_SHARE_MAX - (EQUITY_SHARE_MAX - EQUITY_SHARE_MIN) * (progressed / span)
    }

    /// Blended (mean, volatility) for the return draw at a given age.
    #[must_use]
    pub fn blended(&self, age: u32) -> (f64, f64) {
        let equity = self.equity_share(age);
        let bonds = 1.0 - equity;
        (
            equity * STOCK_PROXY.0 + bonds * BOND_PROXY.0,
            equity * STOCK_PROXY.1 + bonds * BOND_PROXY.1,
        )
    }
}
