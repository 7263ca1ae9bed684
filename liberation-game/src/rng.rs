//! Seeded randomness, split into independent per-domain streams.
//!
//! One user seed fans out into several `SmallRng` streams so that, for example,
//! an extra assistant roll never shifts the selector's sequence.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

/// Deterministic bundle of RNG streams segregated by game domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    selector: CountingRng<SmallRng>,
    death: CountingRng<SmallRng>,
    events: CountingRng<SmallRng>,
    minigames: CountingRng<SmallRng>,
    assistant: CountingRng<SmallRng>,
    flavor: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            selector: CountingRng::new(derive_stream_seed(seed, b"selector")),
            death: CountingRng::new(derive_stream_seed(seed, b"death")),
            events: CountingRng::new(derive_stream_seed(seed, b"events")),
            minigames: CountingRng::new(derive_stream_seed(seed, b"minigames")),
            assistant: CountingRng::new(derive_stream_seed(seed, b"assistant")),
            flavor: CountingRng::new(derive_stream_seed(seed, b"flavor")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Next-screen rolls.
    pub fn selector(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.selector
    }

    /// Ethical death rolls, including press-briefing honesty.
    pub fn death(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.death
    }

    /// Which narrative event or interstitial is drawn on mount.
    pub fn events(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.events
    }

    pub fn minigames(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.minigames
    }

    pub fn assistant(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.assistant
    }

    /// Cosmetic picks: death variants, celebration headlines, quotes.
    pub fn flavor(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.flavor
    }

    /// Total draws across every stream.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.selector.draws
            + self.death.draws
            + self.events.draws
            + self.minigames.draws
            + self.assistant.draws
            + self.flavor.draws
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("HMAC takes any key size");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Uniform draw in `[0, 100)`.
pub fn roll_percent<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(0.0..100.0)
}

/// Bernoulli draw; probabilities outside `[0, 1]` are clamped.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.random_bool(probability.clamp(0.0, 1.0))
}

/// Uniform pick from a table.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
