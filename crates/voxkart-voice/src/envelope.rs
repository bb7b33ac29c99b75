//! Voice envelope - rolling history of microphone loudness
//!
//! The tracker samples the instantaneous loudness on a fixed sample clock
//! and keeps the last `capacity` samples in a ring. Queries ask for the
//! loudness some seconds in the past.

use serde::{Deserialize, Serialize};
use voxkart_core::{round_half_even, VoxError, VoxResult};

/// Envelope tracker configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Number of samples kept in the ring
    pub capacity: usize,
    /// Seconds between two samples
    pub sample_interval: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        // 20 samples at 100ms: 2s of history, 1.9s of reachable lookback
        EnvelopeConfig {
            capacity: 20,
            sample_interval: 0.1,
        }
    }
}

impl EnvelopeConfig {
    /// Short history for tests and low-latency setups
    pub fn short() -> Self {
        EnvelopeConfig {
            capacity: 10,
            sample_interval: 0.1,
        }
    }

    pub fn validate(&self) -> VoxResult<()> {
        if self.capacity == 0 {
            return Err(VoxError::InvalidEnvelopeCapacity(self.capacity));
        }
        if !self.sample_interval.is_finite() || self.sample_interval <= 0.0 {
            return Err(VoxError::InvalidSampleInterval(self.sample_interval));
        }
        Ok(())
    }

    /// Furthest reachable lookback, (N-1) * interval
    pub fn max_lookback(&self) -> f32 {
        self.capacity.saturating_sub(1) as f32 * self.sample_interval
    }
}

/// Voice envelope tracker
///
/// INVARIANT: `cursor` is always in [0, capacity) and points at the next
/// slot to be written; `cursor - 1` is the most recent sample.
#[derive(Clone, Debug)]
pub struct VoiceEnvelopeTracker {
    /// Sample ring
    buffer: Vec<f32>,
    /// Next write slot
    cursor: usize,
    /// Seconds between samples
    sample_interval: f32,
    /// Time accumulated since the last sample
    accumulator: f32,
    /// Loudness passed to the last update
    instantaneous: f32,
    /// Total samples written
    samples_recorded: u64,
}

impl VoiceEnvelopeTracker {
    /// Create a tracker with the default configuration
    pub fn new() -> Self {
        Self::build(&EnvelopeConfig::default())
    }

    /// Create a tracker with custom configuration
    pub fn with_config(config: &EnvelopeConfig) -> VoxResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Caller guarantees `config` is valid
    fn build(config: &EnvelopeConfig) -> Self {
        VoiceEnvelopeTracker {
            buffer: vec![0.0; config.capacity],
            cursor: 0,
            sample_interval: config.sample_interval,
            accumulator: 0.0,
            instantaneous: 0.0,
            samples_recorded: 0,
        }
    }

    /// Advance the sample clock by one frame.
    ///
    /// `loudness` is the current normalized level; gain and range
    /// normalization happen before it reaches the tracker. Returns the
    /// number of samples written this frame.
    pub fn update(&mut self, dt: f32, loudness: f32) -> usize {
        self.instantaneous = sanitize(loudness);

        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut written = 0;
        while self.accumulator >= self.sample_interval && written < self.buffer.len() {
            self.accumulator -= self.sample_interval;
            self.record(self.instantaneous);
            written += 1;
        }

        // A full rotation already overwrote every slot; keep only the phase
        if self.accumulator >= self.sample_interval {
            self.accumulator %= self.sample_interval;
        }

        written
    }

    /// Write one sample at the cursor and advance it
    pub fn record(&mut self, loudness: f32) {
        self.buffer[self.cursor] = sanitize(loudness);
        self.cursor = (self.cursor + 1) % self.buffer.len();
        self.samples_recorded += 1;
    }

    /// Loudness `seconds_ago` seconds in the past.
    ///
    /// Lookback saturates at [`max_lookback`](Self::max_lookback). The value
    /// is the max of the addressed sample and its two neighbours, so a single
    /// quiet sample on the exact index does not hide a loud command.
    pub fn volume_ago(&self, seconds_ago: f32) -> f32 {
        let n = self.buffer.len();
        let seconds = if seconds_ago.is_finite() {
            seconds_ago.clamp(0.0, self.max_lookback())
        } else {
            0.0
        };

        // Exact half steps go to the even neighbour
        let steps = (round_half_even(seconds / self.sample_interval) as usize).min(n - 1);

        // cursor + 2n keeps the subtraction non-negative
        let index = (self.cursor + 2 * n - 1 - steps) % n;
        let prev = (index + n - 1) % n;
        let next = (index + 1) % n;

        self.buffer[prev]
            .max(self.buffer[index])
            .max(self.buffer[next])
    }

    /// Furthest reachable lookback in seconds
    pub fn max_lookback(&self) -> f32 {
        (self.buffer.len() - 1) as f32 * self.sample_interval
    }

    /// Most recent sample
    pub fn latest(&self) -> f32 {
        let n = self.buffer.len();
        self.buffer[(self.cursor + n - 1) % n]
    }

    /// Loudness passed to the last update
    pub fn instantaneous(&self) -> f32 {
        self.instantaneous
    }

    /// Raw ring slots, in storage order
    pub fn samples(&self) -> &[f32] {
        &self.buffer
    }

    /// Next write slot
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn sample_interval(&self) -> f32 {
        self.sample_interval
    }

    pub fn samples_recorded(&self) -> u64 {
        self.samples_recorded
    }
}

impl Default for VoiceEnvelopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn sanitize(loudness: f32) -> f32 {
    if loudness.is_finite() {
        loudness
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp_tracker() -> VoiceEnvelopeTracker {
        let mut tracker = VoiceEnvelopeTracker::new();
        for i in 0..20 {
            tracker.record(0.1 * i as f32);
        }
        tracker
    }

    #[test]
    fn test_config_validation() {
        assert!(EnvelopeConfig::default().validate().is_ok());

        let zero = EnvelopeConfig {
            capacity: 0,
            ..EnvelopeConfig::default()
        };
        assert_eq!(
            VoiceEnvelopeTracker::with_config(&zero).unwrap_err(),
            VoxError::InvalidEnvelopeCapacity(0)
        );

        let bad_interval = EnvelopeConfig {
            sample_interval: 0.0,
            ..EnvelopeConfig::default()
        };
        assert!(VoiceEnvelopeTracker::with_config(&bad_interval).is_err());
    }

    #[test]
    fn test_volume_ago_ramp_example() {
        let tracker = ramp_tracker();
        assert_eq!(tracker.cursor(), 0);

        // 5 steps back from slot 19 is slot 14; neighbours 13 and 15
        let v = tracker.volume_ago(0.5);
        assert!((v - 1.5).abs() < 1e-5, "got {}", v);

        // Now: slots 18, 19 and the wrapped slot 0
        let v = tracker.volume_ago(0.0);
        assert!((v - 1.9).abs() < 1e-5, "got {}", v);
    }

    #[test]
    fn test_half_step_lookback_rounds_to_even() {
        let mut tracker = VoiceEnvelopeTracker::new();
        // Latest write lands in slot 19; only slot 12 (7 steps back) is loud
        for i in 0..20 {
            tracker.record(if i == 12 { 0.9 } else { 0.0 });
        }

        // 0.85s is 8.5 steps: step 8 reads slots 10..=12, step 9 would miss it
        let seconds = 0.5 + 7.0 * 0.05;
        assert_eq!(seconds / tracker.sample_interval(), 8.5);
        assert!((tracker.volume_ago(seconds) - 0.9).abs() < 1e-6);

        // Further back the loud slot is out of the window
        assert_eq!(tracker.volume_ago(0.5 + 9.0 * 0.05), 0.0);
    }

    #[test]
    fn test_new_matches_default_config() {
        let tracker = VoiceEnvelopeTracker::new();
        let config = EnvelopeConfig::default();
        assert_eq!(tracker.capacity(), config.capacity);
        assert_eq!(tracker.sample_interval(), config.sample_interval);
        assert_eq!(tracker.max_lookback(), config.max_lookback());
    }

    #[test]
    fn test_wraparound_overwrites_oldest() {
        let config = EnvelopeConfig {
            capacity: 4,
            sample_interval: 0.1,
        };
        let mut tracker = VoiceEnvelopeTracker::with_config(&config).unwrap();
        for s in [1.0, 2.0, 3.0, 4.0, 5.0] {
            tracker.record(s);
        }
        assert_eq!(tracker.samples(), &[5.0, 2.0, 3.0, 4.0]);
        assert_eq!(tracker.cursor(), 1);
        assert_eq!(tracker.latest(), 5.0);
    }

    #[test]
    fn test_update_carries_remainder() {
        // Binary-exact interval so the arithmetic is exact
        let config = EnvelopeConfig {
            capacity: 20,
            sample_interval: 0.125,
        };
        let mut tracker = VoiceEnvelopeTracker::with_config(&config).unwrap();

        // 0.1875 + 0.1875 = 0.375 -> three samples in total, remainder carried
        assert_eq!(tracker.update(0.1875, 0.5), 1);
        assert_eq!(tracker.update(0.1875, 0.5), 2);
        assert_eq!(tracker.samples_recorded(), 3);
    }

    #[test]
    fn test_update_below_interval_writes_nothing() {
        let mut tracker = VoiceEnvelopeTracker::new();
        assert_eq!(tracker.update(0.05, 0.8), 0);
        assert_eq!(tracker.samples_recorded(), 0);
        assert_eq!(tracker.instantaneous(), 0.8);
    }

    #[test]
    fn test_long_frame_bounded_by_capacity() {
        let mut tracker = VoiceEnvelopeTracker::new();
        let written = tracker.update(10.0, 0.3);
        assert_eq!(written, tracker.capacity());
        assert!(tracker.samples().iter().all(|&s| s == 0.3));

        // Accumulator keeps only the phase, so the next small frame is normal
        assert!(tracker.update(0.01, 0.3) <= 1);
    }

    #[test]
    fn test_non_finite_inputs_ignored() {
        let mut tracker = VoiceEnvelopeTracker::new();
        assert_eq!(tracker.update(f32::NAN, 0.5), 0);
        tracker.record(f32::INFINITY);
        assert_eq!(tracker.latest(), 0.0);
        assert_eq!(tracker.volume_ago(f32::NAN), tracker.volume_ago(0.0));
    }

    #[test]
    fn test_lookback_saturates() {
        let tracker = ramp_tracker();
        assert!((tracker.max_lookback() - 1.9).abs() < 1e-5);
        assert_eq!(tracker.volume_ago(100.0), tracker.volume_ago(tracker.max_lookback()));
        assert_eq!(tracker.volume_ago(-3.0), tracker.volume_ago(0.0));
    }

    #[test]
    fn test_single_slot_tracker() {
        let config = EnvelopeConfig {
            capacity: 1,
            sample_interval: 0.1,
        };
        let mut tracker = VoiceEnvelopeTracker::with_config(&config).unwrap();
        tracker.record(0.7);
        assert_eq!(tracker.max_lookback(), 0.0);
        assert_eq!(tracker.volume_ago(1.0), 0.7);
    }

    proptest! {
        #[test]
        fn prop_volume_ago_is_max_of_contiguous_triple(
            samples in proptest::collection::vec(0.0f32..1.0, 1..64),
            capacity in 3usize..32,
            seconds in 0.0f32..5.0,
        ) {
            let config = EnvelopeConfig { capacity, sample_interval: 0.1 };
            let mut tracker = VoiceEnvelopeTracker::with_config(&config).unwrap();
            for s in &samples {
                tracker.record(*s);
            }

            let v = tracker.volume_ago(seconds);
            let buf = tracker.samples();
            let n = buf.len();
            let found = (0..n).any(|i| {
                let m = buf[(i + n - 1) % n].max(buf[i]).max(buf[(i + 1) % n]);
                m == v
            });
            prop_assert!(found);

            if seconds >= tracker.max_lookback() {
                prop_assert_eq!(v, tracker.volume_ago(tracker.max_lookback()));
            }
        }
    }
}
