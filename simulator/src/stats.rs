//! Per-bet tallies behind the house-edge report.

use serde::Serialize;

/// Chip totals and outcome counts for one bet, with a Welford running variance of the
/// per-round net.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeTally {
    pub rounds: u64,
    pub wins: u64,
    pub pushes: u64,
    pub losses: u64,
    wagered: u64,
    net: i64,
    mean: f64,
    m2: f64,
}

impl EdgeTally {
    /// Record one settled round: `net` chips won (negative when lost) on `wagered` chips.
    pub fn record(&mut self, net: i64, wagered: u64) {
        self.rounds += 1;
        match net.signum() {
            1 => self.wins += 1,
            0 => self.pushes += 1,
            _ => self.losses += 1,
        }
        self.wagered = self.wagered.saturating_add(wagered);
        self.net = self.net.saturating_add(net);

        let x = net as f64;
        let delta = x - self.mean;
        self.mean += delta / self.rounds as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn mean_net(&self) -> f64 {
        self.mean
    }

    pub fn mean_wagered(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.wagered as f64 / self.rounds as f64
    }

    /// Share of everything staked that the house kept.
    pub fn house_edge(&self) -> f64 {
        if self.wagered == 0 {
            return 0.0;
        }
        -(self.net as f64) / self.wagered as f64
    }

    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.wins as f64 / self.rounds as f64
    }

    /// Sample variance of the per-round net.
    pub fn variance(&self) -> f64 {
        if self.rounds < 2 {
            return 0.0;
        }
        self.m2 / (self.rounds - 1) as f64
    }

    /// Standard error of the mean net.
    pub fn stderr(&self) -> f64 {
        if self.rounds < 2 {
            return 0.0;
        }
        (self.variance() / self.rounds as f64).sqrt()
    }
}

/// One line of the report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub game: String,
    pub bet: String,
    pub rounds: u64,
    pub avg_wagered: f64,
    pub avg_net: f64,
    pub win_rate: f64,
    pub edge: f64,
    pub stderr: f64,
}

impl ResultRow {
    pub fn new(game: &str, bet: impl Into<String>, tally: &EdgeTally) -> Self {
        Self {
            game: game.to_string(),
            bet: bet.into(),
            rounds: tally.rounds,
            avg_wagered: tally.mean_wagered(),
            avg_net: tally.mean_net(),
            win_rate: tally.win_rate(),
            edge: tally.house_edge(),
            stderr: tally.stderr(),
        }
    }

    /// Comma-separated fields in [`ResultRow::CSV_HEADER`] order.
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{:.4},{:.4},{:.4},{:.6},{:.6}",
            self.game,
            self.bet,
            self.rounds,
            self.avg_wagered,
            self.avg_net,
            self.win_rate,
            self.edge,
            self.stderr
        )
    }

    pub const CSV_HEADER: &'static str =
        "game,bet,rounds,avg_wagered,avg_net,win_rate,house_edge,stderr";
}
