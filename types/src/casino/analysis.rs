use super::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed count per outcome for one session.
///
/// Counts only grow; [`FrequencyTable::reset`] is the single way back to zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: Vec<u64>,
}

impl FrequencyTable {
    /// An empty table over `outcomes` buckets.
    pub fn new(outcomes: usize) -> Self {
        Self {
            counts: vec![0; outcomes],
        }
    }

    /// A table with pre-filled counts, one entry per outcome.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    pub fn record(&mut self, outcome: u8) -> Result<(), GameError> {
        let slot = self
            .counts
            .get_mut(outcome as usize)
            .ok_or(GameError::InvalidNumber(outcome))?;
        *slot = slot.saturating_add(1);
        Ok(())
    }

    /// Size of the outcome space.
    pub fn outcomes(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, outcome: u8) -> u64 {
        self.counts.get(outcome as usize).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Sum of all observations.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Count each outcome would hold if all were equally likely.
    pub fn expected_count(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.total() as f64 / self.counts.len() as f64
    }

    /// Every outcome's observed count next to the uniform expectation.
    pub fn against_uniform(&self) -> Vec<OutcomeFrequency> {
        let expected = self.expected_count();
        self.counts
            .iter()
            .enumerate()
            .map(|(outcome, &observed)| OutcomeFrequency {
                outcome: outcome as u8,
                observed,
                expected,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFrequency {
    pub outcome: u8,
    pub observed: u64,
    pub expected: f64,
}

impl OutcomeFrequency {
    /// Observed minus expected.
    pub fn deviation(&self) -> f64 {
        self.observed as f64 - self.expected
    }
}

/// Chi-square statistic with its (deliberately coarse) significance figure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    pub p_value: f64,
}

impl GoodnessOfFit {
    /// Reported when there are fewer trials than outcomes.
    pub const INSUFFICIENT: GoodnessOfFit = GoodnessOfFit {
        statistic: 0.0,
        p_value: 1.0,
    };
}

/// Coarse label attached to every analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Favorable,
    Unfavorable,
}

impl RiskTier {
    /// Tier from a failure probability: above 0.7 is high, above 0.4 medium.
    pub fn from_failure(probability: f64) -> Self {
        if probability > 0.7 {
            RiskTier::High
        } else if probability > 0.4 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Tier from a success rate: above 0.6 is low, above 0.3 medium.
    pub fn from_success(rate: f64) -> Self {
        if rate > 0.6 {
            RiskTier::Low
        } else if rate > 0.3 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Favorable => "favorable",
            RiskTier::Unfavorable => "unfavorable",
        };
        f.write_str(name)
    }
}

/// Live analytics for the current state of a round. Recomputed on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub win_probability: f64,
    /// Bust probability for cards, crash probability for flights.
    pub failure_probability: f64,
    pub expected_value: Option<f64>,
    pub optimal_stop: Option<f64>,
    pub risk_tier: RiskTier,
}
