//! End-to-end drive scenarios
//!
//! Full pipeline runs against the simulated world:
//! - Spawn and settle on the suspension
//! - Voice throttle and steering
//! - Pause and resume by voice
//! - Replay determinism under noisy loudness and frame jitter

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{LoudnessProfile, ScenarioBuilder, ScenarioTrace};

// ============================================================================
// STANDARD SCENARIOS
// ============================================================================

/// Drop the kart from just above its rest height and let it settle
pub fn settle_scenario() -> ScenarioBuilder {
    ScenarioBuilder::new()
        .spawn_height(0.62)
        .loudness(LoudnessProfile::Silent)
        .duration(3.0)
}

/// Full throttle by voice, straight ahead
pub fn straight_line_scenario() -> ScenarioBuilder {
    ScenarioBuilder::new()
        .loudness(LoudnessProfile::Constant(1.0))
        .say(1.5, "accelerate")
        .duration(5.0)
}

/// Throttle, then a left turn
pub fn left_turn_scenario() -> ScenarioBuilder {
    straight_line_scenario().say(2.5, "left").duration(4.0)
}

/// A random phrase every `interval` seconds over noisy, bursty loudness
pub fn chatter_scenario(seed: u64, duration: f32, interval: f32) -> ScenarioBuilder {
    const PHRASES: [&str; 7] = [
        "accelerate",
        "brake",
        "left",
        "right",
        "straight",
        "stop",
        "honk",
    ];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = ScenarioBuilder::new()
        .seed(seed)
        .loudness(LoudnessProfile::shouting())
        .frame_jitter(0.5)
        .duration(duration);

    let mut at = interval;
    while at < duration {
        builder = builder.say(at, PHRASES[rng.gen_range(0..PHRASES.len())]);
        at += interval;
    }
    builder
}

/// Build and run, panicking on an invalid configuration
pub fn run_scenario(builder: ScenarioBuilder) -> ScenarioTrace {
    match builder.build() {
        Ok(mut scenario) => scenario.run(),
        Err(e) => panic!("scenario failed to build: {}", e),
    }
}
