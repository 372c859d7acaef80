//! Reproducible random streams for species shuffles.
//!
//! A master seed is mixed with a stream index so every optimizer candidate
//! gets its own generator, independent of evaluation order or thread.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRng {
    master_seed: u64,
}

impl LayoutRng {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Generator for a whole run when only one stream is needed.
    pub fn primary(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.master_seed)
    }

    /// Independent generator for stream `index`.
    pub fn stream(&self, index: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(index))
    }

    fn derive_seed(&self, index: u64) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= index.wrapping_mul(48271);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed
    }
}

impl Default for LayoutRng {
    fn default() -> Self {
        Self::new(42)
    }
}
