//! Process-wide pseudo-random source for endpoint selection

use crate::selector::SelectionPool;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stampede_config::EndpointSpec;
use std::sync::Arc;

/// Random source shared by every simulated user of a run.
///
/// With a seed, the sequence of draws is reproducible only as long as draws
/// happen in a fixed global order. Concurrent users take the lock in
/// whatever order the scheduler runs them, so each user's own sequence can
/// differ between runs even though the combined sequence of draws does not.
#[derive(Debug, Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<StdRng>>,
    seeded: bool,
}

impl SharedRng {
    /// Seeded when `seed` is set, otherwise seeded from OS entropy.
    ///
    /// Negative seeds reinterpret their two's-complement bits, so every
    /// distinct `i64` maps to a distinct generator state.
    pub fn new(seed: Option<i64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed as u64),
            None => Self::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            seeded: true,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::from_os_rng())),
            seeded: false,
        }
    }

    /// Whether draws are deterministic for serialized access
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Draw the next endpoint from `pool`; the lock is held only for the draw
    pub fn draw<'a>(&self, pool: &'a SelectionPool) -> &'a EndpointSpec {
        let mut rng = self.inner.lock();
        pool.next(&mut *rng)
    }
}
