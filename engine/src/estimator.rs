//! Win and bust probability for a card hand, read off the live shoe.

use crate::shoe::Shoe;
use palace_types::casino::{AnalysisSnapshot, Rank, RiskTier, BLACKJACK, SAFE_TOTAL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimates are kept away from certainty.
const MIN_ESTIMATE: f64 = 0.05;
const MAX_ESTIMATE: f64 = 0.95;

/// Centre and spread of the normal model.
const NORMAL_MEAN: f64 = 18.0;
const NORMAL_SPREAD: f64 = 2.5;

/// Scale from normalized gap to pseudo hazard.
const GAP_HAZARD: f64 = 3.0;

/// Lower edge of the strong band.
const STRONG_TOTAL: u8 = 17;

const WEIGHT_BLACKJACK: f64 = 1.0;
const WEIGHT_STRONG: f64 = 0.6;
const WEIGHT_OTHER: f64 = 0.3;

/// Drop from counting an ace as 11 to counting it as 1.
const ACE_DEMOTION: u8 = 10;

/// Multiplier applied for the dealer's up-card.
pub fn opponent_strength(up_card: u8) -> f64 {
    match up_card {
        2..=6 => 1.15,
        10 | 11 | 1 => 0.85,
        _ => 1.0,
    }
}

/// Abramowitz and Stegun 7.1.26; absolute error below 1.5e-7.
pub fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// A way of turning a hand and an up-card into a win probability.
pub trait WinEstimator {
    /// Unclamped estimate.
    fn raw_win_probability(&self, hand: &HandView, shoe: &Shoe) -> f64;

    fn win_probability(&self, hand: &HandView, shoe: &Shoe) -> f64 {
        self.raw_win_probability(hand, shoe)
            .clamp(MIN_ESTIMATE, MAX_ESTIMATE)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Inverse-exponential shape over the gap to the up-card.
    #[default]
    Hazard,
    /// Normal CDF around a typical standing total.
    Normal,
    /// Weighted outcome of the next card over the remaining shoe.
    Population,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Hazard, Strategy::Normal, Strategy::Population];
}

impl WinEstimator for Strategy {
    fn raw_win_probability(&self, hand: &HandView, shoe: &Shoe) -> f64 {
        let opponent = hand.dealer_up;
        match self {
            Strategy::Hazard => hazard_estimate(hand.player_total, opponent),
            Strategy::Normal => {
                let z = (hand.player_total as f64 - NORMAL_MEAN) / NORMAL_SPREAD;
                normal_cdf(z) * opponent_strength(opponent)
            }
            Strategy::Population => {
                population_estimate(hand.player_total, hand.soft, shoe)
                    * opponent_strength(opponent)
            }
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hazard" => Ok(Strategy::Hazard),
            "normal" => Ok(Strategy::Normal),
            "population" => Ok(Strategy::Population),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Hazard => "hazard",
            Strategy::Normal => "normal",
            Strategy::Population => "population",
        };
        f.write_str(name)
    }
}

fn hazard_estimate(player_total: u8, opponent: u8) -> f64 {
    let gap = (player_total as f64 - opponent as f64) / BLACKJACK as f64;
    let shape = 1.0 - (-GAP_HAZARD * gap.abs()).exp();
    if gap >= 0.0 {
        0.5 + shape / 2.0
    } else {
        0.5 - shape / 2.0
    }
}

fn next_card_weight(total: u8) -> f64 {
    match total {
        BLACKJACK => WEIGHT_BLACKJACK,
        t if t > BLACKJACK => 0.0,
        t if t >= STRONG_TOTAL => WEIGHT_STRONG,
        _ => WEIGHT_OTHER,
    }
}

/// Total after drawing `rank`, demoting the soft ace and then the drawn ace while over 21.
fn next_total(player_total: u8, soft: bool, rank: Rank) -> u8 {
    let mut total = player_total.saturating_add(rank.value());
    let mut high_aces = u8::from(soft) + u8::from(rank.is_ace());
    while total > BLACKJACK && high_aces > 0 {
        total -= ACE_DEMOTION;
        high_aces -= 1;
    }
    total
}

fn population_estimate(player_total: u8, soft: bool, shoe: &Shoe) -> f64 {
    let remaining = shoe.remaining();
    if remaining == 0 {
        return 0.0;
    }
    let mass = Rank::ALL
        .iter()
        .map(|&rank| {
            let count = shoe.rank_count(rank);
            if count == 0 {
                return 0.0;
            }
            count as f64 * next_card_weight(next_total(player_total, soft, rank))
        })
        .sum::<f64>();
    mass / remaining as f64
}

/// Clamped win probability of `hand` under `strategy`.
pub fn estimate_win_probability(hand: &HandView, strategy: Strategy, shoe: &Shoe) -> f64 {
    strategy.win_probability(hand, shoe)
}

/// Probability that the next card takes the hand past 21.
///
/// A soft hand can always demote its ace, so it never busts on one card.
pub fn bust_probability(player_total: u8, soft: bool, shoe: &Shoe) -> f64 {
    if player_total > BLACKJACK {
        return 1.0;
    }
    if soft || player_total <= SAFE_TOTAL {
        return 0.0;
    }
    let remaining = shoe.remaining();
    if remaining == 0 {
        return 0.0;
    }
    let busting: u32 = Rank::ALL
        .iter()
        .filter(|&&rank| next_total(player_total, false, rank) > BLACKJACK)
        .map(|&rank| shoe.rank_count(rank))
        .sum();
    busting as f64 / remaining as f64
}

/// What the estimator sees of a hand in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    pub player_total: u8,
    /// One ace in the hand still counts 11.
    pub soft: bool,
    /// Value of the dealer's up-card, ace as 11.
    pub dealer_up: u8,
}

pub fn analyze_hand(view: &HandView, shoe: &Shoe, strategy: Strategy) -> AnalysisSnapshot {
    let bust = bust_probability(view.player_total, view.soft, shoe);
    AnalysisSnapshot {
        win_probability: estimate_win_probability(view, strategy, shoe),
        failure_probability: bust,
        expected_value: None,
        optimal_stop: None,
        risk_tier: RiskTier::from_failure(bust),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;
    use palace_types::casino::{Card, Suit};

    fn full_deck() -> Shoe {
        Shoe::new(1, 0, &mut GameRng::seeded(0))
    }

    fn hard(player_total: u8, dealer_up: u8) -> HandView {
        HandView {
            player_total,
            soft: false,
            dealer_up,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 2e-7);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 2e-7);
        assert!((erf(2.0) - 0.995_322_27).abs() < 2e-7);
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
    }

    #[test]
    fn test_opponent_strength_bands() {
        assert_eq!(opponent_strength(4), 1.15);
        assert_eq!(opponent_strength(8), 1.0);
        assert_eq!(opponent_strength(10), 0.85);
        assert_eq!(opponent_strength(11), 0.85);
    }

    #[test]
    fn test_hazard_strategy() {
        let shoe = full_deck();
        let ahead = estimate_win_probability(&hard(20, 10), Strategy::Hazard, &shoe);
        let s = 1.0 - (-3.0f64 * 10.0 / 21.0).exp();
        assert!(close(ahead, 0.5 + s / 2.0));
        let behind = estimate_win_probability(&hard(10, 20), Strategy::Hazard, &shoe);
        assert!(close(behind, 0.5 - s / 2.0));
        assert_eq!(estimate_win_probability(&hard(15, 15), Strategy::Hazard, &shoe), 0.5);
    }

    #[test]
    fn test_normal_strategy() {
        let shoe = full_deck();
        assert!(close(estimate_win_probability(&hard(18, 8), Strategy::Normal, &shoe), 0.5));
        assert!(close(
            estimate_win_probability(&hard(18, 5), Strategy::Normal, &shoe),
            0.575
        ));
        // Far ahead is clamped.
        assert_eq!(estimate_win_probability(&hard(21, 5), Strategy::Normal, &shoe), 0.95);
        assert_eq!(estimate_win_probability(&hard(4, 10), Strategy::Normal, &shoe), 0.05);
    }

    #[test]
    fn test_population_strategy() {
        let shoe = full_deck();
        // Ace -> 21, 2..6 -> 0.3, 7..9 and tens -> strong band.
        let expected = (4.0 + 20.0 * 0.3 + 28.0 * 0.6) / 52.0;
        assert!(close(
            estimate_win_probability(&hard(10, 8), Strategy::Population, &shoe),
            expected
        ));
        // From 20 only an ace (as 1) avoids the bust.
        assert!(close(
            estimate_win_probability(&hard(20, 8), Strategy::Population, &shoe),
            4.0 / 52.0
        ));
    }

    #[test]
    fn test_population_tracks_composition() {
        let aces = vec![Card::new(Rank::Ace, Suit::Spades); 3];
        let shoe = Shoe::stacked(aces, 1, 0);
        assert_eq!(
            estimate_win_probability(&hard(10, 8), Strategy::Population, &shoe),
            0.95
        );
        let tens = vec![Card::new(Rank::Ten, Suit::Hearts); 3];
        let shoe = Shoe::stacked(tens, 1, 0);
        assert_eq!(
            estimate_win_probability(&hard(15, 8), Strategy::Population, &shoe),
            0.05
        );
    }

    #[test]
    fn test_bust_probability() {
        let shoe = full_deck();
        assert_eq!(bust_probability(11, false, &shoe), 0.0);
        assert_eq!(bust_probability(22, false, &shoe), 1.0);
        assert!(close(bust_probability(12, false, &shoe), 16.0 / 52.0));
        assert!(close(bust_probability(20, false, &shoe), 48.0 / 52.0));
        assert_eq!(bust_probability(21, false, &shoe), 1.0);
    }

    #[test]
    fn test_soft_hand_never_busts_on_one_card() {
        let shoe = full_deck();
        for total in 12..=21 {
            assert_eq!(bust_probability(total, true, &shoe), 0.0, "soft {total}");
        }
        // Hard 17 busts on 5 through king.
        assert!(close(bust_probability(17, false, &shoe), 36.0 / 52.0));
    }

    #[test]
    fn test_population_demotes_soft_ace() {
        let shoe = full_deck();
        let soft_seventeen = HandView {
            player_total: 17,
            soft: true,
            dealer_up: 8,
        };
        // Ace, 2, 3 -> 18..=20; 4 -> 21; 5..9 -> 12..=16; tens -> 17.
        let expected = (4.0 * 1.0 + 12.0 * 0.6 + 20.0 * 0.3 + 16.0 * 0.6) / 52.0;
        assert!(close(
            estimate_win_probability(&soft_seventeen, Strategy::Population, &shoe),
            expected
        ));
        let snapshot = analyze_hand(&soft_seventeen, &shoe, Strategy::Hazard);
        assert_eq!(snapshot.failure_probability, 0.0);
        assert_eq!(snapshot.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_analyze_hand_risk() {
        let shoe = full_deck();
        let view = hard(20, 10);
        let snapshot = analyze_hand(&view, &shoe, Strategy::Hazard);
        assert_eq!(snapshot.risk_tier, RiskTier::High);
        assert!(snapshot.win_probability > 0.8);
        assert_eq!(snapshot.expected_value, None);

        let safe = hard(9, 6);
        assert_eq!(
            analyze_hand(&safe, &shoe, Strategy::Normal).risk_tier,
            RiskTier::Low
        );
    }

    #[test]
    fn test_strategy_names() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
        assert!("martingale".parse::<Strategy>().is_err());
    }
}
