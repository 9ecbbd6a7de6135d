//! Crash flight.
//!
//! The crash point is sampled and locked when the stake is committed. Each [`CrashGame::tick`]
//! raises the multiplier by the configured step (kept in hundredths); the flight ends either
//! when the player cashes out or when the multiplier reaches the crash point.

use crate::config::EngineConfig;
use crate::optimizer::{analyze_flight, CrashModel, FlightView};
use crate::rng::{GameRng, HazardRate};
use crate::round::{Phase, Round, Wallet};
use palace_types::casino::{
    AnalysisSnapshot, CrashStats, FlightRecord, GameError, History, Stake, FLIGHT_HISTORY_LEN,
    LAUNCH_CENTS,
};
use tracing::info;

/// Result of advancing a flight by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    Flying { multiplier: f64 },
    Crashed(FlightRecord),
}

fn to_cents(multiplier: f64) -> u32 {
    (multiplier * 100.0).round() as u32
}

fn from_cents(cents: u32) -> f64 {
    cents as f64 / 100.0
}

pub struct CrashGame {
    hazard: HazardRate,
    tick_cents: u32,
    trials: usize,
    wallet: Wallet,
    round: Round,
    multiplier_cents: u32,
    crash_cents: u32,
    stats: CrashStats,
    history: History<FlightRecord>,
}

impl CrashGame {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            hazard: config.hazard_rate,
            tick_cents: config.tick_cents.max(1),
            trials: config.monte_carlo_trials,
            wallet: Wallet::new(config.initial_balance),
            round: Round::new(),
            multiplier_cents: LAUNCH_CENTS,
            crash_cents: LAUNCH_CENTS,
            stats: CrashStats::default(),
            history: History::new(FLIGHT_HISTORY_LEN),
        }
    }

    /// Commit `stake` and lock a crash point drawn from `rng`.
    pub fn start(&mut self, stake: Stake, rng: &mut GameRng) -> Result<(), GameError> {
        self.round.commit(&mut self.wallet, stake)?;
        let crash_point = rng.crash_point(self.hazard);
        self.launch(to_cents(crash_point));
        Ok(())
    }

    fn launch(&mut self, crash_cents: u32) {
        self.crash_cents = crash_cents;
        self.multiplier_cents = LAUNCH_CENTS;
    }

    /// Advance the multiplier by one step.
    pub fn tick(&mut self) -> Result<Tick, GameError> {
        if !self.round.is_committed() {
            return Err(GameError::NoActiveRound);
        }
        let next = self.multiplier_cents.saturating_add(self.tick_cents);
        if next >= self.crash_cents {
            self.multiplier_cents = self.crash_cents;
            return self.crash().map(Tick::Crashed);
        }
        self.multiplier_cents = next;
        Ok(Tick::Flying {
            multiplier: self.multiplier(),
        })
    }

    fn crash(&mut self) -> Result<FlightRecord, GameError> {
        let stake = self.round.resolve(&mut self.wallet, 0)?;
        let crash_point = from_cents(self.crash_cents);
        self.stats.record_loss(stake.chips(), crash_point);
        let record = FlightRecord {
            crash_point,
            cashed_out: None,
            won: false,
            profit: -(stake.chips() as i64),
        };
        self.history.push(record);
        info!(
            stake = stake.chips(),
            crash_point,
            balance = self.wallet.balance(),
            "flight crashed"
        );
        Ok(record)
    }

    /// Leave the flight at the current multiplier, collecting `floor(stake × multiplier)`.
    pub fn cash_out(&mut self) -> Result<FlightRecord, GameError> {
        let stake = match (self.round.phase(), self.round.stake()) {
            (Phase::Committed, Some(stake)) => stake,
            _ => return Err(GameError::NoActiveRound),
        };
        let payout = (stake.chips() as u128 * self.multiplier_cents as u128 / 100) as u64;
        self.round.resolve(&mut self.wallet, payout)?;

        let multiplier = self.multiplier();
        let profit = payout.saturating_sub(stake.chips());
        self.stats.record_win(profit, multiplier);
        let record = FlightRecord {
            crash_point: from_cents(self.crash_cents),
            cashed_out: Some(multiplier),
            won: true,
            profit: profit as i64,
        };
        self.history.push(record);
        info!(
            stake = stake.chips(),
            multiplier,
            payout,
            balance = self.wallet.balance(),
            "cashed out"
        );
        Ok(record)
    }

    /// Live analytics for the flight in progress.
    pub fn analyze(
        &self,
        model: CrashModel,
        rng: &mut GameRng,
    ) -> Result<AnalysisSnapshot, GameError> {
        let stake = match (self.round.phase(), self.round.stake()) {
            (Phase::Committed, Some(stake)) => stake,
            _ => return Err(GameError::NoActiveRound),
        };
        let view = FlightView {
            multiplier: self.multiplier(),
            stake: stake.chips(),
            balance: self.wallet.balance(),
            hazard: self.hazard,
        };
        Ok(analyze_flight(model, &view, rng, self.trials))
    }

    /// Return to idle after a flight has ended.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.round.finish()?;
        self.multiplier_cents = LAUNCH_CENTS;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.wallet.reset();
        self.round.reset();
        self.multiplier_cents = LAUNCH_CENTS;
        self.crash_cents = LAUNCH_CENTS;
        self.stats = CrashStats::default();
        self.history.clear();
    }

    pub fn multiplier(&self) -> f64 {
        from_cents(self.multiplier_cents)
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn hazard(&self) -> HazardRate {
        self.hazard
    }

    pub fn stats(&self) -> &CrashStats {
        &self.stats
    }

    /// Most recent flights, oldest first.
    pub fn history(&self) -> &History<FlightRecord> {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_types::casino::RiskTier;

    fn game() -> CrashGame {
        CrashGame::new(&EngineConfig::default())
    }

    fn stake(chips: u64) -> Stake {
        Stake::new(chips).unwrap()
    }

    /// Commit with a known crash point.
    fn rigged(game: &mut CrashGame, chips: u64, crash_cents: u32) {
        game.round.commit(&mut game.wallet, stake(chips)).unwrap();
        game.launch(crash_cents);
    }

    #[test]
    fn test_cash_out_pays_floor_of_multiplier() {
        let mut game = game();
        rigged(&mut game, 15, 300);
        for _ in 0..5 {
            assert!(matches!(game.tick().unwrap(), Tick::Flying { .. }));
        }
        assert_eq!(game.multiplier(), 1.5);
        let record = game.cash_out().unwrap();
        // floor(15 * 1.5) = 22
        assert_eq!(record.profit, 7);
        assert_eq!(record.cashed_out, Some(1.5));
        assert_eq!(game.balance(), 1_007);
        assert_eq!(game.stats().wins, 1);
        assert_eq!(game.phase(), Phase::Resolved);
        assert_eq!(game.cash_out(), Err(GameError::NoActiveRound));
    }

    #[test]
    fn test_crash_ends_flight_at_crash_point() {
        let mut game = game();
        rigged(&mut game, 10, 125);
        assert!(matches!(game.tick().unwrap(), Tick::Flying { .. }));
        assert!(matches!(game.tick().unwrap(), Tick::Flying { .. }));
        match game.tick().unwrap() {
            Tick::Crashed(record) => {
                assert_eq!(record.crash_point, 1.25);
                assert_eq!(record.profit, -10);
                assert!(!record.won);
            }
            other => panic!("expected crash, got {other:?}"),
        }
        assert_eq!(game.multiplier(), 1.25);
        assert_eq!(game.balance(), 990);
        assert_eq!(game.stats().losses, 1);
        assert_eq!(game.stats().max_multiplier, 1.25);
        assert_eq!(game.tick(), Err(GameError::NoActiveRound));
    }

    #[test]
    fn test_start_rejected_mid_flight() {
        let mut game = game();
        let mut rng = GameRng::seeded(1);
        game.start(stake(10), &mut rng).unwrap();
        assert_eq!(
            game.start(stake(10), &mut rng),
            Err(GameError::RoundInProgress)
        );
        assert_eq!(game.next_round(), Err(GameError::RoundInProgress));
        assert_eq!(game.balance(), 990);
    }

    #[test]
    fn test_start_rejects_oversized_stake() {
        let mut game = game();
        let mut rng = GameRng::seeded(1);
        assert_eq!(
            game.start(stake(1_001), &mut rng),
            Err(GameError::InsufficientStake {
                stake: 1_001,
                balance: 1_000
            })
        );
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn test_seeded_flight_always_terminates() {
        let mut game = game();
        let mut rng = GameRng::seeded(77);
        for _ in 0..20 {
            game.start(stake(1), &mut rng).unwrap();
            let mut ticks = 0;
            while let Tick::Flying { .. } = game.tick().unwrap() {
                ticks += 1;
                assert!(ticks < 1_000_000);
            }
            game.next_round().unwrap();
        }
        assert_eq!(game.stats().flights, 20);
        assert_eq!(game.balance(), 980);
        assert_eq!(game.history().len(), 20);
    }

    #[test]
    fn test_history_keeps_last_fifty() {
        let mut game = game();
        for i in 0..60u32 {
            rigged(&mut game, 1, 110 + i);
            game.cash_out().unwrap();
            game.next_round().unwrap();
        }
        assert_eq!(game.history().len(), FLIGHT_HISTORY_LEN);
        assert_eq!(game.history().iter().next().unwrap().crash_point, 1.2);
    }

    #[test]
    fn test_analyze_requires_flight() {
        let mut game = game();
        let mut rng = GameRng::seeded(5);
        assert_eq!(
            game.analyze(CrashModel::Exponential, &mut rng),
            Err(GameError::NoActiveRound)
        );
        rigged(&mut game, 10, 5_000);
        let snapshot = game.analyze(CrashModel::Exponential, &mut rng).unwrap();
        assert_eq!(snapshot.risk_tier, RiskTier::Low);
        assert_eq!(snapshot.optimal_stop, Some(26.0));
        let snapshot = game.analyze(CrashModel::Decision, &mut rng).unwrap();
        assert_eq!(snapshot.risk_tier, RiskTier::Favorable);
    }

    #[test]
    fn test_reset_restores_session() {
        let mut game = game();
        rigged(&mut game, 100, 200);
        game.tick().unwrap();
        game.reset();
        assert_eq!(game.balance(), 1_000);
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.stats(), &CrashStats::default());
        assert!(game.history().is_empty());
        assert_eq!(game.multiplier(), 1.0);
    }
}
