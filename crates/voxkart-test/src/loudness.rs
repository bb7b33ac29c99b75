//! Seeded microphone loudness generators
//!
//! Stand-ins for a real microphone: steady, noisy and bursty loudness
//! streams in [0, 1], reproducible from a seed.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of the loudness stream
#[derive(Clone, Debug, PartialEq)]
pub enum LoudnessProfile {
    Silent,
    Constant(f32),
    /// Uniform noise around a mean
    Noisy { mean: f32, spread: f32 },
    /// Mostly quiet, with loud bursts of a few frames
    Bursty {
        quiet: f32,
        loud: f32,
        /// Chance per frame that a burst starts
        burst_prob: f64,
        /// Burst length range in frames, inclusive
        burst_frames: (u32, u32),
    },
}

impl LoudnessProfile {
    /// Someone talking at a normal level in a quiet room
    pub fn talking() -> Self {
        LoudnessProfile::Noisy {
            mean: 0.5,
            spread: 0.2,
        }
    }

    /// Short shouts over background noise
    pub fn shouting() -> Self {
        LoudnessProfile::Bursty {
            quiet: 0.05,
            loud: 0.95,
            burst_prob: 0.05,
            burst_frames: (3, 12),
        }
    }
}

/// Loudness stream
#[derive(Clone, Debug)]
pub struct LoudnessGenerator {
    profile: LoudnessProfile,
    rng: StdRng,
    burst_remaining: u32,
}

impl LoudnessGenerator {
    pub fn new(profile: LoudnessProfile, seed: u64) -> Self {
        LoudnessGenerator {
            profile,
            rng: StdRng::seed_from_u64(seed),
            burst_remaining: 0,
        }
    }

    pub fn profile(&self) -> &LoudnessProfile {
        &self.profile
    }

    /// Loudness for the next frame, in [0, 1]
    pub fn next_loudness(&mut self) -> f32 {
        let value = match self.profile {
            LoudnessProfile::Silent => 0.0,
            LoudnessProfile::Constant(level) => level,
            LoudnessProfile::Noisy { mean, spread } => {
                let spread = spread.abs();
                if spread > 0.0 {
                    mean + Uniform::new_inclusive(-spread, spread).sample(&mut self.rng)
                } else {
                    mean
                }
            }
            LoudnessProfile::Bursty {
                quiet,
                loud,
                burst_prob,
                burst_frames: (min_frames, max_frames),
            } => {
                let burst_prob = if burst_prob.is_finite() {
                    burst_prob.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if self.burst_remaining == 0 && self.rng.gen_bool(burst_prob) {
                    let (lo, hi) = (min_frames.min(max_frames), min_frames.max(max_frames));
                    self.burst_remaining = self.rng.gen_range(lo..=hi);
                }
                if self.burst_remaining > 0 {
                    self.burst_remaining -= 1;
                    loud
                } else {
                    quiet
                }
            }
        };
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_and_silent() {
        let mut silent = LoudnessGenerator::new(LoudnessProfile::Silent, 1);
        let mut steady = LoudnessGenerator::new(LoudnessProfile::Constant(0.7), 1);
        for _ in 0..10 {
            assert_eq!(silent.next_loudness(), 0.0);
            assert_eq!(steady.next_loudness(), 0.7);
        }
    }

    #[test]
    fn test_noisy_in_range() {
        let mut generator = LoudnessGenerator::new(
            LoudnessProfile::Noisy {
                mean: 0.9,
                spread: 0.5,
            },
            7,
        );
        for _ in 0..1000 {
            let value = generator.next_loudness();
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = LoudnessGenerator::new(LoudnessProfile::shouting(), 42);
        let mut b = LoudnessGenerator::new(LoudnessProfile::shouting(), 42);
        let left: Vec<f32> = (0..500).map(|_| a.next_loudness()).collect();
        let right: Vec<f32> = (0..500).map(|_| b.next_loudness()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_bursts_happen() {
        let mut generator = LoudnessGenerator::new(
            LoudnessProfile::Bursty {
                quiet: 0.0,
                loud: 1.0,
                burst_prob: 1.0,
                burst_frames: (2, 2),
            },
            3,
        );
        assert_eq!(generator.next_loudness(), 1.0);
        assert_eq!(generator.next_loudness(), 1.0);
        // A new burst starts immediately
        assert_eq!(generator.next_loudness(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_loudness_in_unit_range(
            mean in -2.0f32..3.0,
            spread in -1.0f32..1.0,
            quiet in -1.0f32..2.0,
            loud in -1.0f32..2.0,
            burst_prob in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let profiles = [
                LoudnessProfile::Constant(mean),
                LoudnessProfile::Noisy { mean, spread },
                LoudnessProfile::Bursty { quiet, loud, burst_prob, burst_frames: (4, 1) },
            ];
            for profile in profiles {
                let mut generator = LoudnessGenerator::new(profile, seed);
                for _ in 0..50 {
                    let value = generator.next_loudness();
                    prop_assert!((0.0..=1.0).contains(&value));
                }
            }
        }
    }
}
