//! OS-seeded random source for live play.

use duckhunt_core::RngOracle;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// [`RngOracle`] backed by `rand`'s standard generator.
///
/// Seeded from the OS by default. A fixed seed reproduces a session, which
/// is how the runtime is driven in tests and replays.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RngOracle for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}
