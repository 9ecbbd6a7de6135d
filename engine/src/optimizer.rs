//! Expected value and stopping analytics for the crash game.
//!
//! Under the exponential crash law `P(X >= x) = e^(-λ(x-1))`, stopping at `x` is worth
//! `stake · x · e^(-λ(x-1))`, which peaks at `x* = 1 + 1/λ`. The Monte Carlo estimator replays
//! the sampler as a cross-check of the closed form.

use crate::rng::{sample_crash_point, HazardRate};
use palace_types::casino::{AnalysisSnapshot, RiskTier};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Look-ahead added to the current multiplier by the exponential model.
const EXPONENTIAL_LOOKAHEAD: f64 = 0.5;

/// Look-ahead added to the current multiplier by the decision model.
const DECISION_LOOKAHEAD: f64 = 0.1;

/// Above this multiplier the decision model recommends stopping now.
const DECISION_COMMIT_MULTIPLIER: f64 = 2.0;

/// Probability the flight is still alive at multiplier `x` (for `x >= 1`).
pub fn survival_probability(x: f64, hazard: HazardRate) -> f64 {
    (-hazard.get() * (x - 1.0)).exp()
}

/// Value of cashing out at `x`: the full return weighted by survival.
pub fn expected_value(x: f64, stake: f64, hazard: HazardRate) -> f64 {
    stake * x * survival_probability(x, hazard)
}

/// Maximizer of [`expected_value`]: `1 + 1/λ`.
pub fn optimal_stop_point(hazard: HazardRate) -> f64 {
    1.0 + 1.0 / hazard.get()
}

/// Probability the flight crashes before reaching `x`; zero at or below 1.
pub fn crash_probability_before(x: f64, hazard: HazardRate) -> f64 {
    if x <= 1.0 {
        return 0.0;
    }
    1.0 - survival_probability(x, hazard)
}

/// Sample mean of a Monte Carlo run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloEstimate {
    pub trials: usize,
    pub successes: usize,
    /// Mean of `+stake·stop` on survival and `-stake` on a crash.
    pub mean_outcome: f64,
}

impl MonteCarloEstimate {
    fn from_tally(trials: usize, successes: usize, total: f64) -> Self {
        let mean_outcome = if trials == 0 { 0.0 } else { total / trials as f64 };
        Self {
            trials,
            successes,
            mean_outcome,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.successes as f64 / self.trials as f64
    }
}

fn tally<R: Rng + ?Sized>(
    rng: &mut R,
    hazard: HazardRate,
    stop: f64,
    stake: f64,
    trials: usize,
) -> (usize, f64) {
    let mut successes = 0;
    let mut total = 0.0;
    for _ in 0..trials {
        if sample_crash_point(rng, hazard) >= stop {
            successes += 1;
            total += stake * stop;
        } else {
            total -= stake;
        }
    }
    (successes, total)
}

/// Estimate the value of stopping at `stop` from `trials` simulated flights.
pub fn monte_carlo<R: Rng + ?Sized>(
    rng: &mut R,
    hazard: HazardRate,
    stop: f64,
    stake: f64,
    trials: usize,
) -> MonteCarloEstimate {
    let (successes, total) = tally(rng, hazard, stop, stake, trials);
    MonteCarloEstimate::from_tally(trials, successes, total)
}

/// [`monte_carlo`] split across rayon workers, one ChaCha stream of `seed` per chunk.
#[cfg(feature = "parallel")]
pub fn monte_carlo_parallel(
    seed: u64,
    hazard: HazardRate,
    stop: f64,
    stake: f64,
    trials: usize,
    chunks: usize,
) -> MonteCarloEstimate {
    use crate::rng::GameRng;
    use rayon::prelude::*;

    let chunks = chunks.max(1);
    let per_chunk = trials / chunks;
    let extra = trials % chunks;
    let (successes, total) = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let n = per_chunk + usize::from(chunk < extra);
            let mut rng = GameRng::with_stream(seed, chunk as u64);
            tally(&mut rng, hazard, stop, stake, n)
        })
        .reduce(|| (0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));
    MonteCarloEstimate::from_tally(trials, successes, total)
}

/// Analysis model for a live flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrashModel {
    /// Closed-form exponential law.
    #[default]
    Exponential,
    /// Log-utility decision theory over the current balance.
    Decision,
    /// Simulated flights.
    MonteCarlo,
}

impl FromStr for CrashModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exponential" => Ok(CrashModel::Exponential),
            "decision" => Ok(CrashModel::Decision),
            "montecarlo" | "monte-carlo" => Ok(CrashModel::MonteCarlo),
            other => Err(format!("unknown crash model: {other}")),
        }
    }
}

impl fmt::Display for CrashModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrashModel::Exponential => "exponential",
            CrashModel::Decision => "decision",
            CrashModel::MonteCarlo => "montecarlo",
        };
        f.write_str(name)
    }
}

/// What the analysis sees of a flight in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightView {
    pub multiplier: f64,
    pub stake: u64,
    /// Balance after the stake was taken.
    pub balance: u64,
    pub hazard: HazardRate,
}

/// Snapshot of a flight under `model`. Only [`CrashModel::MonteCarlo`] draws from `rng`.
pub fn analyze_flight<R: Rng + ?Sized>(
    model: CrashModel,
    view: &FlightView,
    rng: &mut R,
    trials: usize,
) -> AnalysisSnapshot {
    match model {
        CrashModel::Exponential => exponential(view),
        CrashModel::Decision => decision(view),
        CrashModel::MonteCarlo => simulated(view, rng, trials),
    }
}

fn exponential(view: &FlightView) -> AnalysisSnapshot {
    let crash = crash_probability_before(view.multiplier + EXPONENTIAL_LOOKAHEAD, view.hazard);
    AnalysisSnapshot {
        win_probability: 1.0 - crash,
        failure_probability: crash,
        expected_value: Some(expected_value(
            view.multiplier,
            view.stake as f64,
            view.hazard,
        )),
        optimal_stop: Some(optimal_stop_point(view.hazard)),
        risk_tier: RiskTier::from_failure(crash),
    }
}

fn decision(view: &FlightView) -> AnalysisSnapshot {
    // ln is undefined at zero; both balances are floored at one chip.
    let balance = view.balance.max(1) as f64;
    let stake = view.stake as f64;
    let gain = stake * view.multiplier;
    let win_utility = (balance + gain).ln() - balance.ln();
    let loss_utility = (balance - stake).max(1.0).ln() - balance.ln();

    let crash = crash_probability_before(view.multiplier + DECISION_LOOKAHEAD, view.hazard);
    let expected_utility = (1.0 - crash) * win_utility + crash * loss_utility;
    let optimal = if view.multiplier > DECISION_COMMIT_MULTIPLIER {
        view.multiplier
    } else {
        optimal_stop_point(view.hazard)
    };

    AnalysisSnapshot {
        win_probability: 1.0 - crash,
        failure_probability: crash,
        expected_value: Some(expected_utility * balance),
        optimal_stop: Some(optimal),
        risk_tier: if expected_utility > 0.0 {
            RiskTier::Favorable
        } else {
            RiskTier::Unfavorable
        },
    }
}

fn simulated<R: Rng + ?Sized>(view: &FlightView, rng: &mut R, trials: usize) -> AnalysisSnapshot {
    let estimate = monte_carlo(rng, view.hazard, view.multiplier, view.stake as f64, trials);
    let success = estimate.success_rate();
    AnalysisSnapshot {
        win_probability: success,
        failure_probability: 1.0 - success,
        expected_value: Some(estimate.mean_outcome),
        optimal_stop: Some(optimal_stop_point(view.hazard)),
        risk_tier: RiskTier::from_success(success),
    }
}
