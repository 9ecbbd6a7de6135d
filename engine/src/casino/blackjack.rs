//! Blackjack against a dealer who draws to 17.
//!
//! One hand per round, dealt from a multi-deck [`Shoe`] that is only reshuffled at the start
//! of a round. The dealer's first card is the up-card.
//!
//! Returns on a stake of `s`: natural `floor(2.5·s)`, win `2·s`, push `s`, loss or bust 0.

use crate::config::EngineConfig;
use crate::estimator::{analyze_hand, HandView, Strategy};
use crate::rng::GameRng;
use crate::round::{Phase, Round, Wallet};
use crate::shoe::Shoe;
use palace_types::casino::{
    hand_value, AnalysisSnapshot, BlackjackStats, Card, GameError, HandOutcome, Stake, BLACKJACK,
    DEALER_STAND,
};
use tracing::{debug, info};

/// Chips returned for `outcome` on `stake`.
pub fn hand_return(outcome: HandOutcome, stake: Stake) -> u64 {
    let chips = stake.chips();
    match outcome {
        HandOutcome::Blackjack => chips.saturating_mul(5) / 2,
        HandOutcome::Win => chips.saturating_mul(2),
        HandOutcome::Push => chips,
        HandOutcome::Loss | HandOutcome::Bust => 0,
    }
}

pub struct BlackjackGame {
    decks: u8,
    reshuffle_floor: usize,
    shoe: Shoe,
    wallet: Wallet,
    round: Round,
    player: Vec<Card>,
    dealer: Vec<Card>,
    outcome: Option<HandOutcome>,
    stats: BlackjackStats,
}

impl BlackjackGame {
    pub fn new(config: &EngineConfig, rng: &mut GameRng) -> Self {
        Self::with_shoe(
            config,
            Shoe::new(config.decks, config.reshuffle_floor, rng),
        )
    }

    /// Game dealing from a prepared shoe.
    pub fn with_shoe(config: &EngineConfig, shoe: Shoe) -> Self {
        Self {
            decks: config.decks,
            reshuffle_floor: config.reshuffle_floor,
            shoe,
            wallet: Wallet::new(config.initial_balance),
            round: Round::new(),
            player: Vec::new(),
            dealer: Vec::new(),
            outcome: None,
            stats: BlackjackStats::default(),
        }
    }

    /// Commit `stake` and deal two cards each, player first.
    ///
    /// A natural settles immediately and is returned.
    pub fn deal(
        &mut self,
        stake: Stake,
        rng: &mut GameRng,
    ) -> Result<Option<HandOutcome>, GameError> {
        self.round.commit(&mut self.wallet, stake)?;
        self.shoe.prepare_round(rng);
        self.player.clear();
        self.dealer.clear();
        self.outcome = None;
        for _ in 0..2 {
            self.player.push(self.shoe.draw(rng));
        }
        for _ in 0..2 {
            self.dealer.push(self.shoe.draw(rng));
        }
        debug!(
            player = self.player_total(),
            up_card = self.dealer[0].weight(),
            remaining = self.shoe.remaining(),
            "dealt"
        );

        if self.player_total() != BLACKJACK {
            return Ok(None);
        }
        let outcome = if self.dealer_total() == BLACKJACK {
            HandOutcome::Push
        } else {
            HandOutcome::Blackjack
        };
        self.settle(outcome).map(Some)
    }

    /// Draw one card for the player; a total above 21 busts.
    pub fn hit(&mut self, rng: &mut GameRng) -> Result<Option<HandOutcome>, GameError> {
        self.ensure_playing()?;
        self.player.push(self.shoe.draw(rng));
        if self.player_total() > BLACKJACK {
            return self.settle(HandOutcome::Bust).map(Some);
        }
        Ok(None)
    }

    /// Stand: the dealer draws below 17, then the hand is settled.
    pub fn stand(&mut self, rng: &mut GameRng) -> Result<HandOutcome, GameError> {
        self.ensure_playing()?;
        while self.dealer_total() < DEALER_STAND {
            self.dealer.push(self.shoe.draw(rng));
        }
        let player = self.player_total();
        let dealer = self.dealer_total();
        let outcome = if dealer > BLACKJACK || player > dealer {
            HandOutcome::Win
        } else if player < dealer {
            HandOutcome::Loss
        } else {
            HandOutcome::Push
        };
        self.settle(outcome)
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.round.phase() {
            Phase::Committed => Ok(()),
            Phase::Resolved => Err(GameError::InvalidMove),
            Phase::Idle => Err(GameError::NoActiveRound),
        }
    }

    fn settle(&mut self, outcome: HandOutcome) -> Result<HandOutcome, GameError> {
        let stake = self.round.stake().ok_or(GameError::NoActiveRound)?;
        let payout = hand_return(outcome, stake);
        self.round.resolve(&mut self.wallet, payout)?;
        self.stats.record(outcome);
        self.outcome = Some(outcome);
        info!(
            ?outcome,
            stake = stake.chips(),
            payout,
            player = self.player_total(),
            dealer = self.dealer_total(),
            balance = self.wallet.balance(),
            "hand settled"
        );
        Ok(outcome)
    }

    /// Win and bust probability of the hand in play against the up-card.
    pub fn analyze(&self, strategy: Strategy) -> Result<AnalysisSnapshot, GameError> {
        self.ensure_playing()?;
        Ok(analyze_hand(&self.hand_view(), &self.shoe, strategy))
    }

    /// The player's hand as the estimators see it.
    pub fn hand_view(&self) -> HandView {
        let (player_total, soft) = hand_value(&self.player);
        HandView {
            player_total,
            soft,
            dealer_up: self.dealer.first().map_or(0, |card| card.weight()),
        }
    }

    /// Clear the table after a settled hand.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.round.finish()?;
        self.player.clear();
        self.dealer.clear();
        self.outcome = None;
        Ok(())
    }

    /// Restore the opening balance with a fresh shoe and no statistics.
    pub fn reset(&mut self, rng: &mut GameRng) {
        self.wallet.reset();
        self.round.reset();
        self.shoe = Shoe::new(self.decks, self.reshuffle_floor, rng);
        self.player.clear();
        self.dealer.clear();
        self.outcome = None;
        self.stats = BlackjackStats::default();
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer
    }

    pub fn player_total(&self) -> u8 {
        hand_value(&self.player).0
    }

    pub fn dealer_total(&self) -> u8 {
        hand_value(&self.dealer).0
    }

    /// Outcome of the last settled hand, until the next round starts.
    pub fn outcome(&self) -> Option<HandOutcome> {
        self.outcome
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn stats(&self) -> &BlackjackStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_types::casino::{Rank, RiskTier, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Clubs)
    }

    fn stake(chips: u64) -> Stake {
        Stake::new(chips).unwrap()
    }

    /// Game whose shoe deals `order` first; the floor is zero so no reshuffle interferes.
    fn stacked(order: &[Rank]) -> BlackjackGame {
        let config = EngineConfig {
            reshuffle_floor: 0,
            ..EngineConfig::default()
        };
        let cards = order.iter().map(|rank| card(*rank)).collect();
        BlackjackGame::with_shoe(&config, Shoe::stacked(cards, config.decks, 0))
    }

    #[test]
    fn test_hand_return() {
        let s = stake(15);
        assert_eq!(hand_return(HandOutcome::Blackjack, s), 37);
        assert_eq!(hand_return(HandOutcome::Win, s), 30);
        assert_eq!(hand_return(HandOutcome::Push, s), 15);
        assert_eq!(hand_return(HandOutcome::Bust, s), 0);
        assert_eq!(hand_return(HandOutcome::Loss, s), 0);
    }

    #[test]
    fn test_natural_pays_three_to_two() {
        let mut game = stacked(&[Rank::Ace, Rank::King, Rank::Nine, Rank::Seven]);
        let mut rng = GameRng::seeded(0);
        assert_eq!(
            game.deal(stake(10), &mut rng).unwrap(),
            Some(HandOutcome::Blackjack)
        );
        assert_eq!(game.balance(), 1_015);
        assert_eq!(game.stats().blackjacks, 1);
        assert_eq!(game.stats().wins, 1);
        assert_eq!(game.hit(&mut rng), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_double_natural_pushes() {
        let mut game = stacked(&[Rank::Ace, Rank::Queen, Rank::Ace, Rank::Jack]);
        let mut rng = GameRng::seeded(0);
        assert_eq!(
            game.deal(stake(10), &mut rng).unwrap(),
            Some(HandOutcome::Push)
        );
        assert_eq!(game.balance(), 1_000);
    }

    #[test]
    fn test_hit_to_bust() {
        let mut game = stacked(&[Rank::Ten, Rank::Six, Rank::Nine, Rank::Eight, Rank::King]);
        let mut rng = GameRng::seeded(0);
        assert_eq!(game.deal(stake(10), &mut rng).unwrap(), None);
        assert_eq!(game.player_total(), 16);
        assert_eq!(game.hit(&mut rng).unwrap(), Some(HandOutcome::Bust));
        assert_eq!(game.balance(), 990);
        assert_eq!(game.stats().busts, 1);
        assert_eq!(game.stand(&mut rng), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_stand_dealer_draws_to_seventeen() {
        // Player 19; dealer 6 + 4, draws 5 (15), then 9 (24) and busts.
        let mut game = stacked(&[
            Rank::Ten,
            Rank::Nine,
            Rank::Six,
            Rank::Four,
            Rank::Five,
            Rank::Nine,
        ]);
        let mut rng = GameRng::seeded(0);
        game.deal(stake(20), &mut rng).unwrap();
        assert_eq!(game.stand(&mut rng).unwrap(), HandOutcome::Win);
        assert_eq!(game.dealer_hand().len(), 4);
        assert_eq!(game.balance(), 1_020);
    }

    #[test]
    fn test_stand_push_and_loss() {
        let mut game = stacked(&[Rank::Ten, Rank::Eight, Rank::Ten, Rank::Eight]);
        let mut rng = GameRng::seeded(0);
        game.deal(stake(10), &mut rng).unwrap();
        assert_eq!(game.stand(&mut rng).unwrap(), HandOutcome::Push);
        assert_eq!(game.balance(), 1_000);

        let mut game = stacked(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        game.deal(stake(10), &mut rng).unwrap();
        assert_eq!(game.stand(&mut rng).unwrap(), HandOutcome::Loss);
        assert_eq!(game.balance(), 990);
        assert_eq!(game.stats().games, 1);
    }

    #[test]
    fn test_deal_rejected_mid_hand() {
        let mut game = stacked(&[Rank::Ten, Rank::Six, Rank::Nine, Rank::Eight]);
        let mut rng = GameRng::seeded(0);
        game.deal(stake(10), &mut rng).unwrap();
        let remaining = game.shoe().remaining();
        assert_eq!(
            game.deal(stake(10), &mut rng),
            Err(GameError::RoundInProgress)
        );
        assert_eq!(game.shoe().remaining(), remaining);
    }

    #[test]
    fn test_insufficient_stake_leaves_shoe_untouched() {
        let mut rng = GameRng::seeded(4);
        let mut game = BlackjackGame::new(&EngineConfig::default(), &mut rng);
        assert_eq!(
            game.deal(stake(5_000), &mut rng),
            Err(GameError::InsufficientStake {
                stake: 5_000,
                balance: 1_000
            })
        );
        assert_eq!(game.shoe().remaining(), 312);
        assert!(game.player_hand().is_empty());
    }

    #[test]
    fn test_analyze_against_up_card() {
        let mut game = stacked(&[Rank::Ten, Rank::Ten, Rank::Six, Rank::Nine]);
        let mut rng = GameRng::seeded(0);
        assert_eq!(
            game.analyze(Strategy::Hazard),
            Err(GameError::NoActiveRound)
        );
        game.deal(stake(10), &mut rng).unwrap();
        let snapshot = game.analyze(Strategy::Hazard).unwrap();
        assert!(snapshot.win_probability > 0.8);
        // Only the stacked cards remain after the deal: none.
        assert_eq!(snapshot.failure_probability, 0.0);
        assert_eq!(snapshot.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_analyze_soft_seventeen() {
        let mut order = vec![Rank::Ace, Rank::Six, Rank::Ten, Rank::Seven];
        order.extend(Rank::ALL.iter().flat_map(|&rank| [rank; 4]));
        let mut game = stacked(&order);
        let mut rng = GameRng::seeded(0);
        assert_eq!(game.deal(stake(10), &mut rng).unwrap(), None);
        assert_eq!(
            game.hand_view(),
            HandView {
                player_total: 17,
                soft: true,
                dealer_up: 10,
            }
        );
        let snapshot = game.analyze(Strategy::Hazard).unwrap();
        assert_eq!(snapshot.failure_probability, 0.0);
        assert_eq!(snapshot.risk_tier, RiskTier::Low);

        // No card in the shoe busts the hand.
        for &rank in Rank::ALL.iter() {
            let mut cards = game.player_hand().to_vec();
            cards.push(card(rank));
            assert!(hand_value(&cards).0 <= BLACKJACK, "{rank:?}");
        }
    }

    #[test]
    fn test_round_start_reshuffles_below_floor() {
        let config = EngineConfig {
            decks: 1,
            reshuffle_floor: 20,
            ..EngineConfig::default()
        };
        let mut rng = GameRng::seeded(12);
        let mut game = BlackjackGame::new(&config, &mut rng);
        let mut reshuffled = false;
        for _ in 0..40 {
            game.deal(stake(1), &mut rng).unwrap();
            if game.phase() == Phase::Committed {
                game.stand(&mut rng).unwrap();
            }
            game.next_round().unwrap();
            reshuffled |= game.shoe().reshuffles() > 0;
        }
        assert!(reshuffled);
        assert_eq!(game.stats().games, 40);
    }

    #[test]
    fn test_reset() {
        let mut rng = GameRng::seeded(6);
        let mut game = BlackjackGame::new(&EngineConfig::default(), &mut rng);
        game.deal(stake(50), &mut rng).unwrap();
        game.reset(&mut rng);
        assert_eq!(game.balance(), 1_000);
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.shoe().remaining(), 312);
        assert_eq!(game.stats(), &BlackjackStats::default());
    }
}
