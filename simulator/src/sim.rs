//! Per-game simulation loops.
//!
//! Every loop plays whole rounds through the engine's game sessions, so settlement, history
//! and statistics run exactly as they do in play. A session that can no longer cover the
//! stake is reset (a rebuy); the house-edge totals are kept outside the session.

use crate::stats::EdgeTally;
use palace_engine::casino::{BlackjackGame, CrashGame, RouletteGame, Tick};
use palace_engine::fit::chi_square;
use palace_engine::optimizer::{expected_value, optimal_stop_point, MonteCarloEstimate};
use palace_engine::{EngineConfig, GameRng, Phase, Strategy};
use palace_types::casino::{
    FrequencyTable, GameError, GoodnessOfFit, HandOutcome, Selection, Stake, WheelBet, BLACKJACK,
    WHEEL_SIZE,
};
use serde::Serialize;
use tracing::debug;

/// Stake used for every simulated round.
pub const BASE_BET: u64 = 100;

/// The player keeps drawing while the bust risk stays at or below this.
const HIT_BUST_LIMIT: f64 = 0.4;

/// Win estimate above which the player stands regardless of bust risk.
const STAND_WIN_ESTIMATE: f64 = 0.5;

fn base_stake() -> Stake {
    Stake::new(BASE_BET).unwrap_or_else(|_| unreachable!("BASE_BET is positive"))
}

/// Fly `rounds` flights, cashing out at the first tick at or above `target`.
pub fn sim_crash(
    config: &EngineConfig,
    rounds: u64,
    target: f64,
    rng: &mut GameRng,
) -> Result<EdgeTally, GameError> {
    let mut game = CrashGame::new(config);
    let stake = base_stake();
    let mut tally = EdgeTally::default();
    for _ in 0..rounds {
        if game.balance() < BASE_BET {
            debug!(balance = game.balance(), "crash rebuy");
            game.reset();
        }
        game.start(stake, rng)?;
        let record = loop {
            if game.multiplier() >= target {
                break game.cash_out()?;
            }
            if let Tick::Crashed(record) = game.tick()? {
                break record;
            }
        };
        tally.record(record.profit, BASE_BET);
        game.next_round()?;
    }
    Ok(tally)
}

/// Named wheel bets the simulator reports on.
pub fn roulette_bets() -> Result<Vec<(&'static str, Selection)>, GameError> {
    Ok(vec![
        ("STRAIGHT_17", Selection::straight(17)?),
        ("SPLIT_17_20", Selection::numbers([17, 20])?),
        ("CORNER_1_5", Selection::numbers([1, 2, 4, 5])?),
        ("FIVE_NUMBER", Selection::numbers([0, 1, 2, 3, 4])?),
        ("DOZEN_1", Selection::dozen(0)?),
        ("COLUMN_1", Selection::column(0)?),
        ("RED", Selection::red()),
        ("BLACK", Selection::black()),
        ("EVEN", Selection::even()),
        ("LOW", Selection::low()),
        ("GREEN", Selection::green()),
        ("FULL_WHEEL", Selection::numbers(0..WHEEL_SIZE)?),
    ])
}

/// Outcome of the wheel run: one row per bet plus the fit of every observed pocket.
#[derive(Clone, Debug)]
pub struct RouletteRun {
    pub bets: Vec<(&'static str, EdgeTally)>,
    pub pockets: FrequencyTable,
    pub fit: GoodnessOfFit,
}

/// Spin each named bet `rounds` times on one wheel.
pub fn sim_roulette(
    config: &EngineConfig,
    rounds: u64,
    rng: &mut GameRng,
) -> Result<RouletteRun, GameError> {
    let mut game = RouletteGame::new(config);
    // Rebuys clear the session's table, so the run keeps its own.
    let mut pockets = FrequencyTable::new(WHEEL_SIZE as usize);
    let mut bets = Vec::new();
    for (label, selection) in roulette_bets()? {
        let bet = WheelBet::new(base_stake(), selection);
        let mut tally = EdgeTally::default();
        for _ in 0..rounds {
            if game.balance() < BASE_BET {
                debug!(balance = game.balance(), "roulette rebuy");
                game.reset();
            }
            let record = game.spin(&bet, rng)?;
            pockets.record(record.number)?;
            tally.record(record.profit, BASE_BET);
        }
        debug!(
            bet = label,
            win_rate = tally.win_rate(),
            win_probability = bet.selection().win_probability(),
            "wheel bet complete"
        );
        bets.push((label, tally));
    }
    let fit = chi_square(&pockets, pockets.total());
    debug!(spins = pockets.total(), statistic = fit.statistic, "wheel run complete");
    Ok(RouletteRun { bets, pockets, fit })
}

/// Play `rounds` hands, drawing while the estimator says the hand is behind and the bust
/// risk is low.
pub fn sim_blackjack(
    config: &EngineConfig,
    rounds: u64,
    strategy: Strategy,
    rng: &mut GameRng,
) -> Result<(EdgeTally, Vec<(HandOutcome, u64)>), GameError> {
    let mut game = BlackjackGame::new(config, rng);
    let stake = base_stake();
    let mut tally = EdgeTally::default();
    let mut outcomes = [
        (HandOutcome::Win, 0),
        (HandOutcome::Blackjack, 0),
        (HandOutcome::Push, 0),
        (HandOutcome::Loss, 0),
        (HandOutcome::Bust, 0),
    ];
    for _ in 0..rounds {
        if game.balance() < BASE_BET {
            debug!(balance = game.balance(), "blackjack rebuy");
            game.reset(rng);
        }
        let before = game.balance();
        let mut outcome = game.deal(stake, rng)?;
        while outcome.is_none() && game.phase() == Phase::Committed {
            let snapshot = game.analyze(strategy)?;
            if game.player_total() >= BLACKJACK
                || snapshot.failure_probability > HIT_BUST_LIMIT
                || snapshot.win_probability > STAND_WIN_ESTIMATE
            {
                outcome = Some(game.stand(rng)?);
            } else {
                outcome = game.hit(rng)?;
            }
        }
        if let Some(outcome) = outcome {
            if let Some(slot) = outcomes.iter_mut().find(|(o, _)| *o == outcome) {
                slot.1 += 1;
            }
        }
        let net = game.balance() as i64 - before as i64;
        tally.record(net, BASE_BET);
        game.next_round()?;
    }
    Ok((tally, outcomes.to_vec()))
}

/// Closed-form expected value at a stop point next to its Monte Carlo estimate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvComparison {
    pub stop: f64,
    pub optimal_stop: f64,
    pub stake: f64,
    /// `stake · x · S(x)`.
    pub closed_form: f64,
    /// Gross return observed over the simulated flights.
    pub monte_carlo: f64,
    /// Mean of `+stake·x` on survival and `-stake` on a crash.
    pub monte_carlo_outcome: f64,
    pub trials: usize,
}

/// Compare the closed form with `trials` simulated flights at `stop`.
pub fn compare_expected_value(
    config: &EngineConfig,
    stop: f64,
    trials: usize,
    seed: u64,
) -> EvComparison {
    let hazard = config.hazard_rate;
    let stake = BASE_BET as f64;
    let estimate = run_monte_carlo(config, stop, stake, trials, seed);
    EvComparison {
        stop,
        optimal_stop: optimal_stop_point(hazard),
        stake,
        closed_form: expected_value(stop, stake, hazard),
        monte_carlo: stake * stop * estimate.success_rate(),
        monte_carlo_outcome: estimate.mean_outcome,
        trials,
    }
}

#[cfg(feature = "parallel")]
fn run_monte_carlo(
    config: &EngineConfig,
    stop: f64,
    stake: f64,
    trials: usize,
    seed: u64,
) -> MonteCarloEstimate {
    let chunks = std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1);
    palace_engine::optimizer::monte_carlo_parallel(
        seed,
        config.hazard_rate,
        stop,
        stake,
        trials,
        chunks,
    )
}

#[cfg(not(feature = "parallel"))]
fn run_monte_carlo(
    config: &EngineConfig,
    stop: f64,
    stake: f64,
    trials: usize,
    seed: u64,
) -> MonteCarloEstimate {
    let mut rng = GameRng::seeded(seed);
    palace_engine::optimizer::monte_carlo(&mut rng, config.hazard_rate, stop, stake, trials)
}
