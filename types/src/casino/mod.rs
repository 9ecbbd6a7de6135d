//! Casino domain types.
//!
//! Defines wagers, cards, frequency tables, analysis snapshots, statistics and constants used
//! by the engine and its clients.

mod analysis;
mod cards;
mod constants;
mod error;
mod history;
mod wager;

pub use analysis::*;
pub use cards::*;
pub use constants::*;
pub use error::*;
pub use history::*;
pub use wager::*;
