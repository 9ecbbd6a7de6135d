//! Betting round state machine and the balance it settles against.
//!
//! ## Phases
//!
//! A round progresses through three phases:
//! 1. **Idle** - no stake on the table
//! 2. **Committed** - stake deducted, outcome locked
//! 3. **Resolved** - win or loss determined, balance credited
//!
//! A resolved round returns to idle through [`Round::finish`], or implicitly when the next
//! stake is committed. A committed stake can only be resolved, never changed.

use palace_types::casino::{GameError, Stake};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Committed,
    Resolved,
}

/// Chip balance of one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    initial: u64,
    balance: u64,
}

impl Wallet {
    pub fn new(initial: u64) -> Self {
        Self {
            initial,
            balance: initial,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn initial(&self) -> u64 {
        self.initial
    }

    /// Net result since the last reset.
    pub fn net(&self) -> i64 {
        self.balance as i64 - self.initial as i64
    }

    /// Check that `stake` is affordable without touching the balance.
    pub fn check(&self, stake: Stake) -> Result<(), GameError> {
        if stake.chips() > self.balance {
            return Err(GameError::InsufficientStake {
                stake: stake.chips(),
                balance: self.balance,
            });
        }
        Ok(())
    }

    fn debit(&mut self, stake: Stake) -> Result<(), GameError> {
        self.check(stake)?;
        self.balance -= stake.chips();
        Ok(())
    }

    fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        self.balance = self.initial;
    }
}

/// Phase tracker for a single game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    phase: Phase,
    stake: Option<Stake>,
}

impl Round {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_committed(&self) -> bool {
        self.phase == Phase::Committed
    }

    /// Stake of the current or last resolved round.
    pub fn stake(&self) -> Option<Stake> {
        self.stake
    }

    /// Deduct `stake` and lock the round.
    ///
    /// Fails with [`GameError::RoundInProgress`] while a stake is unresolved and with
    /// [`GameError::InsufficientStake`] before any balance change.
    pub fn commit(&mut self, wallet: &mut Wallet, stake: Stake) -> Result<(), GameError> {
        if self.phase == Phase::Committed {
            return Err(GameError::RoundInProgress);
        }
        wallet.debit(stake)?;
        self.phase = Phase::Committed;
        self.stake = Some(stake);
        Ok(())
    }

    /// Credit `payout` (zero on a loss) and close the round.
    pub fn resolve(&mut self, wallet: &mut Wallet, payout: u64) -> Result<Stake, GameError> {
        let stake = match (self.phase, self.stake) {
            (Phase::Committed, Some(stake)) => stake,
            _ => return Err(GameError::NoActiveRound),
        };
        wallet.credit(payout);
        self.phase = Phase::Resolved;
        Ok(stake)
    }

    /// Return a resolved round to idle.
    pub fn finish(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::Committed => Err(GameError::RoundInProgress),
            Phase::Idle | Phase::Resolved => {
                self.phase = Phase::Idle;
                Ok(())
            }
        }
    }

    /// Drop any round state, committed or not. The caller restores the wallet.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
