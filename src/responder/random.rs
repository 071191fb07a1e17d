//! Injectable randomness for reply selection and thinking jitter

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(test)]
use std::collections::VecDeque;

/// Uniform index source
pub trait RandomSource: Send {
    /// Uniform value in `0..bound`; `bound` must be non-zero
    fn pick(&mut self, bound: usize) -> usize;
}

/// `StdRng` backed source, seeded from the OS or from a fixed seed
#[derive(Debug)]
pub struct RngSource {
    rng: StdRng,
}

impl RngSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, otherwise from the OS
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }
}

impl RandomSource for RngSource {
    fn pick(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Replays a fixed list of picks (modulo the bound), then repeats zero
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    picks: VecDeque<usize>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn pick(&mut self, bound: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % bound
    }
}
