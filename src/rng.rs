//! A thin wrapper over `rand::rngs::SmallRng`, seeded so that randomly chosen
//! hints are reproducible.

use rand::{rngs::SmallRng, Rng as _, SeedableRng};

const DEFAULT_SEED: u64 = 0x12345678_12345678;

/// A pseudorandom number generator.
///
/// Not cryptographically secure.
#[derive(Clone, Debug)]
pub(crate) struct Rng {
    inner: SmallRng,
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generate a random `usize` in the range `0..len`.
    ///
    /// If `len` is `0`, then `None` is returned.
    #[inline]
    pub(crate) fn gen_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }

        // https://lemire.me/blog/2016/06/30/fast-random-shuffling/
        let random32bit = u64::from(self.inner.gen::<u32>());
        let multiresult = random32bit.wrapping_mul(len as u64);
        Some((multiresult >> 32) as usize)
    }
}
