//! Game sessions built on the engine primitives.
//!
//! Each game owns its wallet, round state and statistics; randomness is passed in per call.

pub mod blackjack;
pub mod crash;
pub mod roulette;

pub use blackjack::{hand_return, BlackjackGame};
pub use crash::{CrashGame, Tick};
pub use roulette::RouletteGame;
