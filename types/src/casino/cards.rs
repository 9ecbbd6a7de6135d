//! Playing cards.
//!
//! Cards are encoded as `0..=51`, where:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13 (0..=12), with 0 as Ace and 12 as King
//!
//! The rank is the population category the shoe tracks; the suit is cosmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranks per suit, and the number of categories a shoe is counted by.
pub const RANKS_PER_SUIT: u8 = 13;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ace = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
    Nine = 8,
    Ten = 9,
    Jack = 10,
    Queen = 11,
    King = 12,
}

impl Rank {
    pub const ALL: [Rank; RANKS_PER_SUIT as usize] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Category index (0..=12).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Blackjack weight with the Ace counted high (11). Faces count 10.
    pub fn value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            other => other as u8 + 1,
        }
    }

    /// Blackjack weight with the Ace counted low (1).
    pub fn low_value(self) -> u8 {
        match self {
            Rank::Ace => 1,
            other => other.value(),
        }
    }

    pub fn is_ace(self) -> bool {
        self == Rank::Ace
    }

    fn symbol(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::ALL.get(value as usize).copied().ok_or(value)
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Population category of this card.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Blackjack weight (Ace high).
    pub fn weight(&self) -> u8 {
        self.rank.value()
    }

    /// One standard 52-card deck in encoding order.
    pub fn deck() -> impl Iterator<Item = Card> {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
    }
}

/// u8 encoding (0..=51)
impl TryFrom<u8> for Card {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let suit = *Suit::ALL
            .get((value / RANKS_PER_SUIT) as usize)
            .ok_or(value)?;
        let rank = Rank::try_from(value % RANKS_PER_SUIT)?;
        Ok(Card::new(rank, suit))
    }
}
impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.suit as u8 * RANKS_PER_SUIT + card.rank as u8
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// Best blackjack total for a hand, demoting Aces from 11 to 1 while the hand is over 21.
///
/// Returns `(total, is_soft)`, where a soft hand still counts one Ace as 11.
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let mut total: u32 = 0;
    let mut aces = 0u8;
    for card in cards {
        if card.rank.is_ace() {
            aces += 1;
        }
        total += card.weight() as u32;
    }
    while total > super::BLACKJACK as u32 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    (total.min(u8::MAX as u32) as u8, aces > 0)
}
