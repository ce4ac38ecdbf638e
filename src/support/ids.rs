//! Ticket and receipt number generation
//!
//! Numbers have the textual shape of a UUID v4 (36 lowercase hex characters
//! with hyphens, version nibble `4`, variant nibble in `8..=b`) and are drawn
//! from a seedable, non-cryptographic PRNG. Uniqueness is probabilistic;
//! callers that need a guarantee check against their own active set.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence, for tests and reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string()
    }

    /// Next id that `is_taken` does not reject
    pub fn next_unique(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next_id();
            if !is_taken(&id) {
                return id;
            }
            tracing::warn!(id = id.as_str(), "Generated id collides, regenerating");
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

/// Whether `id` has the shape produced by [`IdGenerator`]
pub fn is_well_formed(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    let lower_hex = |b: u8| b.is_ascii_digit() || (b'a'..=b'f').contains(&b);
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match i {
            8 | 13 | 18 | 23 => b == b'-',
            14 => b == b'4',
            19 => matches!(b, b'8' | b'9' | b'a' | b'b'),
            _ => lower_hex(b),
        };
        if !ok {
            return false;
        }
    }
    true
}
