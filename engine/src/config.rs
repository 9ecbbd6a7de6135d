//! Engine configuration.

use crate::rng::{GameRng, HazardRate};
use palace_types::casino::{
    CARDS_PER_DECK, DEFAULT_MONTE_CARLO_TRIALS, DEFAULT_RESHUFFLE_FLOOR, DEFAULT_SHOE_DECKS,
    DEFAULT_TICK_CENTS, INITIAL_BALANCE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("reshuffle_floor must be below the shoe size (floor={floor}, shoe={shoe})")]
    FloorTooLarge { floor: usize, shoe: usize },
}

/// Tunables shared by every game in a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub hazard_rate: HazardRate,
    /// Multiplier gained per crash tick, in hundredths.
    #[serde(default = "default_tick_cents")]
    pub tick_cents: u32,
    #[serde(default = "default_decks")]
    pub decks: u8,
    #[serde(default = "default_reshuffle_floor")]
    pub reshuffle_floor: usize,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,
    #[serde(default = "default_monte_carlo_trials")]
    pub monte_carlo_trials: usize,
    /// Fixed seed for replay; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_tick_cents() -> u32 {
    DEFAULT_TICK_CENTS
}

fn default_decks() -> u8 {
    DEFAULT_SHOE_DECKS
}

fn default_reshuffle_floor() -> usize {
    DEFAULT_RESHUFFLE_FLOOR
}

fn default_initial_balance() -> u64 {
    INITIAL_BALANCE
}

fn default_monte_carlo_trials() -> usize {
    DEFAULT_MONTE_CARLO_TRIALS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hazard_rate: HazardRate::default(),
            tick_cents: DEFAULT_TICK_CENTS,
            decks: DEFAULT_SHOE_DECKS,
            reshuffle_floor: DEFAULT_RESHUFFLE_FLOOR,
            initial_balance: INITIAL_BALANCE,
            monte_carlo_trials: DEFAULT_MONTE_CARLO_TRIALS,
            seed: None,
        }
    }
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_nonzero("tick_cents", self.tick_cents as u64)?;
        ensure_nonzero("decks", self.decks as u64)?;
        ensure_nonzero("initial_balance", self.initial_balance)?;
        ensure_nonzero("monte_carlo_trials", self.monte_carlo_trials as u64)?;
        let shoe = self.decks as usize * CARDS_PER_DECK;
        if self.reshuffle_floor >= shoe {
            return Err(ConfigError::FloorTooLarge {
                floor: self.reshuffle_floor,
                shoe,
            });
        }
        Ok(())
    }

    /// Generator for this configuration: seeded when a seed is set.
    pub fn rng(&self) -> GameRng {
        match self.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::from_entropy(),
        }
    }
}
