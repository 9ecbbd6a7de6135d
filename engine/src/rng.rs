//! Seedable randomness and the distribution samplers built on it.
//!
//! Every sampler is generic over [`rand::Rng`], so games take a [`GameRng`] (ChaCha20 under the
//! hood) and tests can replay any seed. Nothing in the engine reads an ambient generator.

use palace_types::casino::{GameError, DEFAULT_HAZARD_RATE, MIN_CRASH_POINT, WHEEL_SIZE};
use rand::{distributions::Open01, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Rate (λ) of the exponential crash distribution. Always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct HazardRate(f64);

impl HazardRate {
    pub fn new(lambda: f64) -> Result<Self, GameError> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(GameError::InvalidHazardRate(lambda));
        }
        Ok(Self(lambda))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for HazardRate {
    fn default() -> Self {
        Self(DEFAULT_HAZARD_RATE)
    }
}

impl TryFrom<f64> for HazardRate {
    type Error = GameError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        HazardRate::new(value)
    }
}
impl From<HazardRate> for f64 {
    fn from(rate: HazardRate) -> f64 {
        rate.0
    }
}

/// Round to cents (two decimal places).
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Crash point by inverse transform of `F(x) = 1 - e^(-λ(x-1))`.
///
/// `u` comes from the open interval (0,1), so `ln(1-u)` is always finite. The result is rounded
/// to two decimals and never below [`MIN_CRASH_POINT`].
pub fn sample_crash_point<R: Rng + ?Sized>(rng: &mut R, hazard: HazardRate) -> f64 {
    let u: f64 = rng.sample(Open01);
    let x = 1.0 - (1.0 - u).ln() / hazard.get();
    round_cents(x).max(MIN_CRASH_POINT)
}

/// Uniform integer in `[0, n)`; `None` when `n == 0`.
///
/// `gen_range` rejects out-of-zone draws, so there is no modulo bias.
pub fn sample_uniform_discrete<R: Rng + ?Sized>(rng: &mut R, n: u32) -> Option<u32> {
    (n > 0).then(|| rng.gen_range(0..n))
}

/// Fisher-Yates: walk from the last index down to 1, swapping with a uniform index in `0..=i`.
pub fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Game randomness source.
#[derive(Clone, Debug)]
pub struct GameRng(ChaCha20Rng);

impl GameRng {
    /// Deterministic generator for replay and tests.
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha20Rng::seed_from_u64(seed))
    }

    /// Deterministic generator on an independent stream of the same seed.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut inner = ChaCha20Rng::seed_from_u64(seed);
        inner.set_stream(stream);
        Self(inner)
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha20Rng::from_entropy())
    }

    pub fn crash_point(&mut self, hazard: HazardRate) -> f64 {
        sample_crash_point(self, hazard)
    }

    /// Pocket in `0..=36`.
    pub fn spin_wheel(&mut self) -> u8 {
        self.gen_range(0..WHEEL_SIZE)
    }

    pub fn uniform(&mut self, n: u32) -> Option<u32> {
        sample_uniform_discrete(self, n)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        shuffle(self, items)
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
