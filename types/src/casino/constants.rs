/// Starting chips for a fresh (or reset) game session
pub const INITIAL_BALANCE: u64 = 1_000;

/// Pockets on a single-zero wheel (0..=36)
pub const WHEEL_SIZE: u8 = 37;

/// Highest pocket number on the wheel
pub const MAX_WHEEL_NUMBER: u8 = WHEEL_SIZE - 1;

/// Red pockets on a single-zero wheel
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Spins kept in the roulette history
pub const SPIN_HISTORY_LEN: usize = 10;

/// Flights kept in the crash history
pub const FLIGHT_HISTORY_LEN: usize = 50;

/// Default crash hazard rate (λ); lower values mean longer flights
pub const DEFAULT_HAZARD_RATE: f64 = 0.04;

/// Smallest crash point a flight can produce
pub const MIN_CRASH_POINT: f64 = 1.01;

/// Multiplier growth per tick, in hundredths (0.10x)
pub const DEFAULT_TICK_CENTS: u32 = 10;

/// Crash multiplier at launch, in hundredths (1.00x)
pub const LAUNCH_CENTS: u32 = 100;

/// Cards in a single deck
pub const CARDS_PER_DECK: usize = 52;

/// Decks in the blackjack shoe
pub const DEFAULT_SHOE_DECKS: u8 = 6;

/// Shoe is rebuilt at the start of a round once fewer cards than this remain
pub const DEFAULT_RESHUFFLE_FLOOR: usize = 20;

/// Blackjack ceiling
pub const BLACKJACK: u8 = 21;

/// Dealer stands on this total or higher
pub const DEALER_STAND: u8 = 17;

/// Totals at or below this cannot bust on the next card
pub const SAFE_TOTAL: u8 = 11;

/// Reference Monte Carlo trial count for crash analytics
pub const DEFAULT_MONTE_CARLO_TRIALS: usize = 1_000;
