//! Shared domain types for the palace games.
//!
//! Everything here is plain data: wagers, cards, frequency tables, analysis snapshots and the
//! error vocabulary. Sampling, settlement and estimation live in `palace-engine`.

pub mod casino;

pub use casino::*;
