//! Multi-deck shoe: the finite population behind card draws and card analytics.
//!
//! The shoe only shrinks between reshuffles. A reshuffle rebuilds every deck and re-permutes
//! it; games request one through [`Shoe::prepare_round`] before dealing, so the composition
//! never changes under a hand that is being analysed. The one exception is a draw from an
//! empty shoe, which rebuilds first and then deals.

use crate::rng::shuffle;
use palace_types::casino::{Card, Rank, CARDS_PER_DECK, RANKS_PER_SUIT};
use rand::Rng;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Shoe {
    decks: u8,
    reshuffle_floor: usize,
    /// Dealt from the back.
    cards: Vec<Card>,
    counts: [u32; RANKS_PER_SUIT as usize],
    reshuffles: u64,
}

impl Shoe {
    /// A freshly shuffled shoe of `decks` decks (at least one).
    pub fn new<R: Rng + ?Sized>(decks: u8, reshuffle_floor: usize, rng: &mut R) -> Self {
        let mut shoe = Self {
            decks: decks.max(1),
            reshuffle_floor,
            cards: Vec::new(),
            counts: [0; RANKS_PER_SUIT as usize],
            reshuffles: 0,
        };
        shoe.rebuild(rng);
        shoe
    }

    /// A shoe that deals `deal_order` front to back. Rebuilds still produce `decks` full decks.
    pub fn stacked(deal_order: Vec<Card>, decks: u8, reshuffle_floor: usize) -> Self {
        let mut cards = deal_order;
        cards.reverse();
        let mut counts = [0; RANKS_PER_SUIT as usize];
        for card in &cards {
            counts[card.rank.index()] += 1;
        }
        Self {
            decks: decks.max(1),
            reshuffle_floor,
            cards,
            counts,
            reshuffles: 0,
        }
    }

    fn rebuild<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.clear();
        for _ in 0..self.decks {
            self.cards.extend(Card::deck());
        }
        shuffle(rng, &mut self.cards);
        self.counts = [self.decks as u32 * 4; RANKS_PER_SUIT as usize];
    }

    /// Rebuild and re-permute the full shoe.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let leftover = self.cards.len();
        self.rebuild(rng);
        self.reshuffles += 1;
        debug!(
            leftover,
            size = self.cards.len(),
            reshuffles = self.reshuffles,
            "reshuffled shoe"
        );
    }

    /// Round-start hook: reshuffle if fewer than the safety floor remain.
    ///
    /// Returns true when a reshuffle happened.
    pub fn prepare_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.needs_reshuffle() {
            return false;
        }
        self.reshuffle(rng);
        true
    }

    /// Remove one card from the shoe.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Card {
        if let Some(card) = self.take() {
            return card;
        }
        self.reshuffle(rng);
        // A rebuilt shoe holds at least one deck.
        self.take().unwrap_or_else(|| unreachable!("rebuilt shoe is empty"))
    }

    fn take(&mut self) -> Option<Card> {
        let card = self.cards.pop()?;
        self.counts[card.rank.index()] -= 1;
        Some(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Size of a full shoe.
    pub fn len_full(&self) -> usize {
        self.decks as usize * CARDS_PER_DECK
    }

    pub fn decks(&self) -> u8 {
        self.decks
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.cards.len() < self.reshuffle_floor
    }

    /// Remaining cards matching `pred`.
    pub fn count_by<F: Fn(&Card) -> bool>(&self, pred: F) -> usize {
        self.cards.iter().filter(|card| pred(card)).count()
    }

    pub fn rank_count(&self, rank: Rank) -> u32 {
        self.counts[rank.index()]
    }

    /// Remaining cards per rank, indexed by [`Rank::index`].
    pub fn rank_counts(&self) -> &[u32; RANKS_PER_SUIT as usize] {
        &self.counts
    }

    /// Number of reshuffles since construction.
    pub fn reshuffles(&self) -> u64 {
        self.reshuffles
    }
}
