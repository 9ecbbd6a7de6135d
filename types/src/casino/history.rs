use super::WheelColor;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed-capacity log that drops its oldest entry when full.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct History<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub crash_point: f64,
    /// Multiplier the player left at, if they cashed out.
    pub cashed_out: Option<f64>,
    pub won: bool,
    pub profit: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub number: u8,
    pub color: WheelColor,
    pub coverage: usize,
    pub stake: u64,
    pub won: bool,
    pub profit: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrashStats {
    pub flights: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_winnings: u64,
    pub total_losses: u64,
    pub max_multiplier: f64,
    pub avg_cash_out: f64,
}

impl CrashStats {
    pub fn record_win(&mut self, profit: u64, multiplier: f64) {
        self.flights += 1;
        self.wins += 1;
        self.total_winnings = self.total_winnings.saturating_add(profit);
        self.avg_cash_out += (multiplier - self.avg_cash_out) / self.wins as f64;
        self.observe(multiplier);
    }

    pub fn record_loss(&mut self, stake: u64, multiplier: f64) {
        self.flights += 1;
        self.losses += 1;
        self.total_losses = self.total_losses.saturating_add(stake);
        self.observe(multiplier);
    }

    fn observe(&mut self, multiplier: f64) {
        if multiplier > self.max_multiplier {
            self.max_multiplier = multiplier;
        }
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.flights)
    }

    pub fn net_profit(&self) -> i64 {
        self.total_winnings as i64 - self.total_losses as i64
    }

    pub fn avg_profit(&self) -> f64 {
        if self.flights == 0 {
            return 0.0;
        }
        self.net_profit() as f64 / self.flights as f64
    }
}

/// How a blackjack hand ended, from the player's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandOutcome {
    Win,
    Blackjack,
    Loss,
    Bust,
    Push,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackjackStats {
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub blackjacks: u64,
    pub busts: u64,
}

impl BlackjackStats {
    pub fn record(&mut self, outcome: HandOutcome) {
        self.games += 1;
        match outcome {
            HandOutcome::Win => self.wins += 1,
            HandOutcome::Blackjack => {
                self.wins += 1;
                self.blackjacks += 1;
            }
            HandOutcome::Loss => self.losses += 1,
            HandOutcome::Bust => {
                self.losses += 1;
                self.busts += 1;
            }
            HandOutcome::Push => self.pushes += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.games)
    }

    pub fn loss_rate(&self) -> f64 {
        ratio(self.losses, self.games)
    }

    pub fn push_rate(&self) -> f64 {
        ratio(self.pushes, self.games)
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
