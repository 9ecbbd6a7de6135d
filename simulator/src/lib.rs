//! Monte Carlo house-edge simulator for palace games.

use palace_engine::optimizer::optimal_stop_point;
use palace_engine::{EngineConfig, Strategy};
use palace_types::casino::{GameError, GoodnessOfFit, HandOutcome};
use rand::RngCore;
use serde::Serialize;
use tracing::info;

pub mod sim;
pub mod stats;

pub use sim::{EvComparison, BASE_BET};
pub use stats::{EdgeTally, ResultRow};

/// Which games a run covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameChoice {
    #[default]
    All,
    Crash,
    Roulette,
    Blackjack,
}

impl GameChoice {
    fn includes(self, game: GameChoice) -> bool {
        self == GameChoice::All || self == game
    }
}

/// What to simulate.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub rounds: u64,
    pub games: GameChoice,
    pub strategy: Strategy,
    /// Crash cash-out target; the optimal stop point when unset.
    pub cash_out: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub seed: Option<u64>,
    pub rounds: u64,
    pub strategy: Strategy,
    pub rows: Vec<ResultRow>,
    pub wheel_fit: Option<GoodnessOfFit>,
    pub blackjack_outcomes: Vec<(HandOutcome, u64)>,
    pub expected_value: Option<EvComparison>,
}

impl Report {
    /// CSV rendering: the house-edge table followed by the fit and EV lines.
    pub fn to_csv(&self) -> String {
        let mut lines = vec![ResultRow::CSV_HEADER.to_string()];
        lines.extend(self.rows.iter().map(ResultRow::to_csv));
        if let Some(fit) = &self.wheel_fit {
            lines.push("wheel_fit,statistic,p_value".to_string());
            lines.push(format!("wheel_fit,{:.4},{:.4}", fit.statistic, fit.p_value));
        }
        if !self.blackjack_outcomes.is_empty() {
            lines.push("blackjack_outcome,count".to_string());
            lines.extend(
                self.blackjack_outcomes
                    .iter()
                    .map(|(outcome, count)| format!("{outcome:?},{count}")),
            );
        }
        if let Some(ev) = &self.expected_value {
            lines.push(
                "crash_ev,stop,optimal_stop,closed_form,monte_carlo,monte_carlo_outcome,trials"
                    .to_string(),
            );
            lines.push(format!(
                "crash_ev,{:.2},{:.2},{:.4},{:.4},{:.4},{}",
                ev.stop,
                ev.optimal_stop,
                ev.closed_form,
                ev.monte_carlo,
                ev.monte_carlo_outcome,
                ev.trials
            ));
        }
        let mut csv = lines.join("\n");
        csv.push('\n');
        csv
    }
}

/// Run `plan` against `config`. Identical seeds give identical reports.
pub fn run(config: &EngineConfig, plan: &Plan) -> Result<Report, GameError> {
    let mut rng = config.rng();
    let mut report = Report {
        seed: config.seed,
        rounds: plan.rounds,
        strategy: plan.strategy,
        rows: Vec::new(),
        wheel_fit: None,
        blackjack_outcomes: Vec::new(),
        expected_value: None,
    };

    if plan.games.includes(GameChoice::Crash) {
        let target = plan
            .cash_out
            .unwrap_or_else(|| optimal_stop_point(config.hazard_rate));
        let tally = sim::sim_crash(config, plan.rounds, target, &mut rng)?;
        info!(target, edge = tally.house_edge(), "crash simulated");
        report
            .rows
            .push(ResultRow::new("Crash", format!("CASH_OUT_{target:.2}"), &tally));

        let trials = config.monte_carlo_trials.max(plan.rounds as usize);
        report.expected_value = Some(sim::compare_expected_value(
            config,
            target,
            trials,
            rng.next_u64(),
        ));
    }

    if plan.games.includes(GameChoice::Roulette) {
        let run = sim::sim_roulette(config, plan.rounds, &mut rng)?;
        info!(
            spins = run.pockets.total(),
            statistic = run.fit.statistic,
            p_value = run.fit.p_value,
            "roulette simulated"
        );
        for (label, tally) in &run.bets {
            report.rows.push(ResultRow::new("Roulette", *label, tally));
        }
        report.wheel_fit = Some(run.fit);
    }

    if plan.games.includes(GameChoice::Blackjack) {
        let (tally, outcomes) = sim::sim_blackjack(config, plan.rounds, plan.strategy, &mut rng)?;
        info!(strategy = %plan.strategy, edge = tally.house_edge(), "blackjack simulated");
        report.rows.push(ResultRow::new(
            "Blackjack",
            plan.strategy.to_string().to_uppercase(),
            &tally,
        ));
        report.blackjack_outcomes = outcomes;
    }

    Ok(report)
}
