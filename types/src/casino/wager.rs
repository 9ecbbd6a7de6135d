use super::{GameError, MAX_WHEEL_NUMBER, RED_NUMBERS, WHEEL_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A positive chip amount committed to a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Stake(u64);

impl Stake {
    pub fn new(chips: u64) -> Result<Self, GameError> {
        if chips == 0 {
            return Err(GameError::InvalidStake);
        }
        Ok(Self(chips))
    }

    pub fn chips(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Stake {
    type Error = GameError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Stake::new(value)
    }
}
impl From<Stake> for u64 {
    fn from(stake: Stake) -> u64 {
        stake.0
    }
}

/// Pocket color on the wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelColor {
    Green,
    Red,
    Black,
}

impl WheelColor {
    pub fn of(number: u8) -> Self {
        if number == 0 {
            WheelColor::Green
        } else if RED_NUMBERS.contains(&number) {
            WheelColor::Red
        } else {
            WheelColor::Black
        }
    }
}

impl fmt::Display for WheelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WheelColor::Green => "green",
            WheelColor::Red => "red",
            WheelColor::Black => "black",
        };
        f.write_str(name)
    }
}

/// The non-empty set of wheel numbers a bet covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Selection(BTreeSet<u8>);

impl Selection {
    /// Build a selection from arbitrary numbers. Duplicates collapse.
    pub fn numbers<I: IntoIterator<Item = u8>>(numbers: I) -> Result<Self, GameError> {
        let mut set = BTreeSet::new();
        for number in numbers {
            if number > MAX_WHEEL_NUMBER {
                return Err(GameError::InvalidNumber(number));
            }
            set.insert(number);
        }
        if set.is_empty() {
            return Err(GameError::InvalidSelection);
        }
        Ok(Self(set))
    }

    pub fn straight(number: u8) -> Result<Self, GameError> {
        Self::numbers([number])
    }

    pub fn red() -> Self {
        Self(RED_NUMBERS.into_iter().collect())
    }

    pub fn black() -> Self {
        Self::filtered(|n| WheelColor::of(n) == WheelColor::Black)
    }

    pub fn green() -> Self {
        Self(BTreeSet::from([0]))
    }

    pub fn even() -> Self {
        Self::filtered(|n| n % 2 == 0)
    }

    pub fn odd() -> Self {
        Self::filtered(|n| n % 2 == 1)
    }

    /// 1-18
    pub fn low() -> Self {
        Self::filtered(|n| n <= 18)
    }

    /// 19-36
    pub fn high() -> Self {
        Self::filtered(|n| n >= 19)
    }

    /// Dozen 0 (1-12), 1 (13-24) or 2 (25-36).
    pub fn dozen(index: u8) -> Result<Self, GameError> {
        if index > 2 {
            return Err(GameError::InvalidSelection);
        }
        Ok(Self::filtered(|n| (n - 1) / 12 == index))
    }

    /// Column 0 (1, 4, 7, ...), 1 (2, 5, 8, ...) or 2 (3, 6, 9, ...).
    pub fn column(index: u8) -> Result<Self, GameError> {
        if index > 2 {
            return Err(GameError::InvalidSelection);
        }
        Ok(Self::filtered(|n| (n - 1) % 3 == index))
    }

    // Zero never belongs to an outside bet.
    fn filtered(keep: impl Fn(u8) -> bool) -> Self {
        Self((1..=MAX_WHEEL_NUMBER).filter(|&n| keep(n)).collect())
    }

    /// Number of outcomes this bet wins on.
    pub fn coverage(&self) -> usize {
        self.0.len()
    }

    /// Chance a fair spin lands in the selection.
    pub fn win_probability(&self) -> f64 {
        self.coverage() as f64 / WHEEL_SIZE as f64
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<u8>> for Selection {
    type Error = GameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Selection::numbers(value)
    }
}
impl From<Selection> for Vec<u8> {
    fn from(selection: Selection) -> Vec<u8> {
        selection.0.into_iter().collect()
    }
}

/// An immutable wheel wager: what is covered and how much rides on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelBet {
    stake: Stake,
    selection: Selection,
}

impl WheelBet {
    pub fn new(stake: Stake, selection: Selection) -> Self {
        Self { stake, selection }
    }

    pub fn stake(&self) -> Stake {
        self.stake
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// Total-return multiplier for a coverage size, with its display odds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutInfo {
    /// Total return per chip staked, stake included.
    pub multiplier: u64,
    /// Odds as shown to the player, e.g. `35:1`.
    pub label: String,
    /// False when the coverage size has no entry in the standard table.
    pub standard: bool,
}

impl PayoutInfo {
    /// Chips returned to the balance for a winning bet.
    pub fn total_return(&self, stake: Stake) -> u64 {
        stake.chips().saturating_mul(self.multiplier)
    }

    /// Net profit of a winning bet. Negative only for degenerate (zero multiplier) coverage.
    pub fn profit(&self, stake: Stake) -> i64 {
        self.total_return(stake) as i64 - stake.chips() as i64
    }
}
