//! Injectable source of uniform draws for the scan heuristic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces independent uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;

    /// One fresh draw mapped onto `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.next_unit() * (high - low) + low
    }
}

/// Production source backed by an entropy-seeded `StdRng`.
pub struct EntropySource {
    rng: StdRng,
}

impl EntropySource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream, for demos and diagnostics.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    draws: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().expect("scripted draws exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_draws_stay_in_unit_interval() {
        let mut source = EntropySource::new();
        for _ in 0..1_000 {
            let u = source.next_unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = EntropySource::seeded(7);
        let mut b = EntropySource::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn uniform_maps_onto_band() {
        let mut source = ScriptedSource::new(&[0.0, 0.5]);
        assert_eq!(source.uniform(90.0, 99.0), 90.0);
        assert_eq!(source.uniform(60.0, 80.0), 70.0);
        assert_eq!(source.remaining(), 0);
    }
}
