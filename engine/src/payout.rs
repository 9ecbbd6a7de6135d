//! Wheel payout schedule.
//!
//! Multipliers are total return (stake included) for a bet covering `n` of the 37 pockets.
//! Sizes outside the standard table pay `floor(36 / n)`, truncated in the house's favor.

use palace_types::casino::{GameError, PayoutInfo, Stake};

/// Numerator of the fallback rule and the straight-up return.
const FULL_RETURN: u64 = 36;

/// Standard bet sizes: (coverage, total-return multiplier).
const STANDARD_TABLE: [(usize, u64); 7] = [
    (1, 36),  // straight
    (2, 18),  // split
    (3, 12),  // street
    (4, 9),   // corner
    (6, 6),   // six line
    (12, 3),  // dozen / column
    (18, 2),  // red/black, even/odd, low/high
];

/// Payout for a bet covering `coverage` outcomes.
pub fn payout_for(coverage: usize) -> Result<PayoutInfo, GameError> {
    if coverage == 0 {
        return Err(GameError::InvalidSelection);
    }

    if let Some(&(_, multiplier)) = STANDARD_TABLE.iter().find(|(n, _)| *n == coverage) {
        return Ok(PayoutInfo {
            multiplier,
            label: odds_label(multiplier),
            standard: true,
        });
    }

    let multiplier = FULL_RETURN / coverage as u64;
    Ok(PayoutInfo {
        multiplier,
        label: format!("{} (non-standard)", odds_label(multiplier)),
        standard: false,
    })
}

/// Chips credited back for a settled bet: the full return on a hit, nothing on a miss (the
/// stake was already taken at commit).
pub fn settle(payout: &PayoutInfo, stake: Stake, hit: bool) -> u64 {
    if hit {
        payout.total_return(stake)
    } else {
        0
    }
}

// Profit-to-stake odds; a zero multiplier still reads as 0:1.
fn odds_label(multiplier: u64) -> String {
    format!("{}:1", multiplier.saturating_sub(1))
}
