use thiserror::Error as ThisError;

/// Recoverable errors raised by wagers and game rounds.
///
/// None of these leave a balance or a shoe partially mutated: validation happens before the
/// stake is deducted or a card is drawn.
#[derive(Clone, Debug, ThisError, PartialEq)]
pub enum GameError {
    #[error("bet covers no outcomes")]
    InvalidSelection,
    #[error("stake must be positive")]
    InvalidStake,
    #[error("stake exceeds balance (stake={stake}, balance={balance})")]
    InsufficientStake { stake: u64, balance: u64 },
    #[error("wheel number out of range (got={0}, max=36)")]
    InvalidNumber(u8),
    #[error("hazard rate must be positive and finite (got={0})")]
    InvalidHazardRate(f64),
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("no round in progress")]
    NoActiveRound,
    #[error("move not allowed in the current phase")]
    InvalidMove,
}
