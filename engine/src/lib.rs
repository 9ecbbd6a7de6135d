//! Outcome sampling, settlement and live probability analytics for palace games.
//!
//! The primitives ([`rng`], [`payout`], [`shoe`], [`estimator`], [`fit`], [`optimizer`]) are
//! pure functions of their inputs and an injected [`GameRng`]. The [`casino`] module wires
//! them into crash, roulette and blackjack sessions driven by the [`round`] state machine.

pub mod casino;
pub mod config;
pub mod estimator;
pub mod fit;
pub mod optimizer;
pub mod payout;
pub mod rng;
pub mod round;
pub mod shoe;

pub use config::{ConfigError, EngineConfig};
pub use estimator::{Strategy, WinEstimator};
pub use optimizer::CrashModel;
pub use rng::{GameRng, HazardRate};
pub use round::{Phase, Round, Wallet};
pub use shoe::Shoe;
