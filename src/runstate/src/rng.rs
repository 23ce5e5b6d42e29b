// src/runstate/src/rng.rs
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for a run. Serializes as its seed only: a restored
/// run replays from the seed rather than mid-stream state, which keeps the
/// snapshot schema trivial and is invisible to the player.
#[derive(Debug, Clone)]
pub struct RunRng {
    rng: Pcg32,
    seed: u64,
}

impl RunRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reset to the start of the current seed's stream.
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    pub fn reseed(&mut self, new_seed: u64) {
        self.seed = new_seed;
        self.reset();
    }

    pub fn random_bool(&mut self, probability: f64) -> bool {
        use rand::Rng;
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        use rand::Rng;
        if items.is_empty() {
            None
        } else {
            let idx = self.rng.random_range(0..items.len());
            Some(&items[idx])
        }
    }
}

impl Default for RunRng {
    fn default() -> Self {
        Self::new(rand::random())
    }
}

// The wrapper is itself an rng, so generation helpers taking
// `&mut impl Rng` accept it directly.
impl RngCore for RunRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }
}

impl Serialize for RunRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.seed)
    }
}

impl<'de> Deserialize<'de> for RunRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(Self::new(seed))
    }
}

impl PartialEq for RunRng {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
    }
}
