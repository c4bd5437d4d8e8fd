use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hands out independent, reproducible random streams keyed by name.
///
/// Every stream is derived from the master seed the first time it is
/// requested, so the values a system draws do not depend on how many values
/// other systems drew before it.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_u64 = [0u8; 8];
            master.fill_bytes(&mut seed_u64);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_u64))
        });
        SystemRng { inner: entry }
    }
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Uniformly distributed direction on the unit circle.
pub fn unit_vector<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let angle = rng.gen_range(0.0..TAU);
    (angle.cos(), angle.sin())
}
