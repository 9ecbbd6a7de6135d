//! Single-zero wheel.
//!
//! A spin runs the whole round in one step: validate the bet, deduct the stake, draw a pocket,
//! record it, and credit the schedule's return if the selection covers it.

use crate::config::EngineConfig;
use crate::fit::chi_square;
use crate::payout::{payout_for, settle};
use crate::rng::GameRng;
use crate::round::{Round, Wallet};
use palace_types::casino::{
    FrequencyTable, GameError, GoodnessOfFit, History, OutcomeFrequency, SpinRecord, WheelBet,
    WheelColor, SPIN_HISTORY_LEN, WHEEL_SIZE,
};
use tracing::info;

pub struct RouletteGame {
    wallet: Wallet,
    round: Round,
    frequencies: FrequencyTable,
    history: History<SpinRecord>,
}

impl RouletteGame {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            wallet: Wallet::new(config.initial_balance),
            round: Round::new(),
            frequencies: FrequencyTable::new(WHEEL_SIZE as usize),
            history: History::new(SPIN_HISTORY_LEN),
        }
    }

    /// Play one spin for `bet`.
    pub fn spin(&mut self, bet: &WheelBet, rng: &mut GameRng) -> Result<SpinRecord, GameError> {
        let selection = bet.selection();
        let payout = payout_for(selection.coverage())?;
        let stake = bet.stake();
        self.round.commit(&mut self.wallet, stake)?;

        let number = rng.spin_wheel();
        self.frequencies.record(number)?;
        let won = selection.contains(number);
        self.round
            .resolve(&mut self.wallet, settle(&payout, stake, won))?;
        self.round.finish()?;

        let record = SpinRecord {
            number,
            color: WheelColor::of(number),
            coverage: selection.coverage(),
            stake: stake.chips(),
            won,
            profit: if won {
                payout.profit(stake)
            } else {
                -(stake.chips() as i64)
            },
        };
        self.history.push(record);
        info!(
            number,
            coverage = record.coverage,
            stake = record.stake,
            won,
            profit = record.profit,
            balance = self.wallet.balance(),
            "wheel settled"
        );
        Ok(record)
    }

    /// Chi-square of observed pockets against a fair wheel.
    pub fn goodness_of_fit(&self) -> GoodnessOfFit {
        chi_square(&self.frequencies, self.frequencies.total())
    }

    /// Spins each pocket should have seen on a fair wheel.
    pub fn expected_frequency(&self) -> f64 {
        self.frequencies.expected_count()
    }

    /// Observed spins per pocket against [`RouletteGame::expected_frequency`].
    pub fn pocket_frequencies(&self) -> Vec<OutcomeFrequency> {
        self.frequencies.against_uniform()
    }

    pub fn reset(&mut self) {
        self.wallet.reset();
        self.round.reset();
        self.frequencies.reset();
        self.history.clear();
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn spins(&self) -> u64 {
        self.frequencies.total()
    }

    /// Last spins, oldest first.
    pub fn history(&self) -> &History<SpinRecord> {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_types::casino::{Selection, Stake};

    fn bet(chips: u64, selection: Selection) -> WheelBet {
        WheelBet::new(Stake::new(chips).unwrap(), selection)
    }

    #[test]
    fn test_spin_settles_against_selection() {
        let mut game = RouletteGame::new(&EngineConfig::default());
        let mut rng = GameRng::seeded(3);
        let mut expected = 1_000i64;
        for _ in 0..200 {
            let record = game.spin(&bet(5, Selection::red()), &mut rng).unwrap();
            assert_eq!(record.won, record.color == WheelColor::Red);
            expected += record.profit;
            assert_eq!(game.balance() as i64, expected);
        }
        assert_eq!(game.spins(), 200);
        assert_eq!(game.history().len(), SPIN_HISTORY_LEN);
    }

    #[test]
    fn test_straight_up_win_pays_thirty_five() {
        let mut game = RouletteGame::new(&EngineConfig::default());
        let mut rng = GameRng::seeded(11);
        loop {
            let record = game
                .spin(&bet(1, Selection::straight(17).unwrap()), &mut rng)
                .unwrap();
            if record.won {
                assert_eq!(record.number, 17);
                assert_eq!(record.profit, 35);
                break;
            }
            assert_eq!(record.profit, -1);
        }
    }

    #[test]
    fn test_insufficient_balance_rejected_before_spin() {
        let mut game = RouletteGame::new(&EngineConfig {
            initial_balance: 10,
            ..EngineConfig::default()
        });
        let mut rng = GameRng::seeded(1);
        assert_eq!(
            game.spin(&bet(11, Selection::black()), &mut rng),
            Err(GameError::InsufficientStake {
                stake: 11,
                balance: 10
            })
        );
        assert_eq!(game.spins(), 0);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_goodness_of_fit_and_reset() {
        let mut game = RouletteGame::new(&EngineConfig {
            initial_balance: 1_000_000,
            ..EngineConfig::default()
        });
        let mut rng = GameRng::seeded(8);
        assert_eq!(game.goodness_of_fit(), GoodnessOfFit::INSUFFICIENT);
        for _ in 0..3_700 {
            game.spin(&bet(1, Selection::even()), &mut rng).unwrap();
        }
        assert_eq!(game.expected_frequency(), 100.0);
        let pockets = game.pocket_frequencies();
        assert_eq!(pockets.len(), WHEEL_SIZE as usize);
        assert_eq!(pockets.iter().map(|p| p.observed).sum::<u64>(), 3_700);
        assert!(pockets.iter().all(|p| p.expected == 100.0));
        assert!(pockets.iter().map(|p| p.deviation()).sum::<f64>().abs() < 1e-9);

        let fit = game.goodness_of_fit();
        // 36 degrees of freedom; a fair wheel stays well under 80.
        assert!(fit.statistic < 80.0, "statistic={}", fit.statistic);

        game.reset();
        assert_eq!(game.balance(), 1_000_000);
        assert_eq!(game.spins(), 0);
        assert_eq!(game.goodness_of_fit(), GoodnessOfFit::INSUFFICIENT);
        assert_eq!(game.expected_frequency(), 0.0);
    }

    #[test]
    fn test_win_rate_tracks_selection_probability() {
        let mut game = RouletteGame::new(&EngineConfig {
            initial_balance: 1_000_000,
            ..EngineConfig::default()
        });
        let mut rng = GameRng::seeded(21);
        let dozen = Selection::dozen(1).unwrap();
        assert!((dozen.win_probability() - 12.0 / 37.0).abs() < 1e-12);
        let spins = 20_000;
        let mut wins = 0;
        for _ in 0..spins {
            if game.spin(&bet(1, dozen.clone()), &mut rng).unwrap().won {
                wins += 1;
            }
        }
        let rate = wins as f64 / spins as f64;
        // Standard error is about 0.0033.
        assert!((rate - dozen.win_probability()).abs() < 0.02, "rate={rate}");
    }
}
