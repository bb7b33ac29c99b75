//! Drive scenarios
//!
//! A scenario is a drive session, a simulated world, a loudness stream and
//! a script of phrases the "driver" says at given times. Running it yields
//! a per-frame trace. Same builder, same seed: same trace.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use voxkart_runtime::{DriveSession, RacePhase, SessionConfig, SessionResult, SessionStats};
use voxkart_voice::PhraseSender;

use crate::{LoudnessGenerator, LoudnessProfile, SimWorld, KART_REST_HEIGHT};

/// A phrase spoken at a scenario time
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedPhrase {
    /// Seconds since the scenario started
    pub at: f32,
    pub phrase: String,
}

/// Scenario builder
#[derive(Clone, Debug)]
pub struct ScenarioBuilder {
    config: SessionConfig,
    spawn_height: f32,
    frame_dt: f32,
    /// Relative frame time jitter, 0 for a steady frame rate
    frame_jitter: f32,
    duration: f32,
    loudness: LoudnessProfile,
    seed: u64,
    script: Vec<ScriptedPhrase>,
    start_race: bool,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        ScenarioBuilder {
            config: SessionConfig::instant_start(),
            spawn_height: KART_REST_HEIGHT,
            frame_dt: 1.0 / 60.0,
            frame_jitter: 0.0,
            duration: 5.0,
            loudness: LoudnessProfile::Constant(0.8),
            seed: 0,
            script: Vec::new(),
            start_race: true,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Height of the body origin over the ground at spawn
    pub fn spawn_height(mut self, height: f32) -> Self {
        self.spawn_height = height;
        self
    }

    pub fn frame_dt(mut self, dt: f32) -> Self {
        self.frame_dt = dt;
        self
    }

    /// Vary each frame time by up to `fraction` of `frame_dt`
    pub fn frame_jitter(mut self, fraction: f32) -> Self {
        self.frame_jitter = fraction.clamp(0.0, 0.9);
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn loudness(mut self, profile: LoudnessProfile) -> Self {
        self.loudness = profile;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Leave the race in `PreStart`; the controller stays disabled
    pub fn without_start(mut self) -> Self {
        self.start_race = false;
        self
    }

    /// Say `phrase` at `at` seconds
    pub fn say(mut self, at: f32, phrase: &str) -> Self {
        self.script.push(ScriptedPhrase {
            at,
            phrase: phrase.to_string(),
        });
        self
    }

    pub fn build(self) -> SessionResult<Scenario> {
        let mut session = DriveSession::new(self.config)?;
        if self.start_race {
            session.start();
        }
        let sender = session.phrase_sender();

        let mut script = self.script;
        script.sort_by(|a, b| a.at.total_cmp(&b.at));

        Ok(Scenario {
            session,
            world: SimWorld::kart_at(self.spawn_height),
            loudness: LoudnessGenerator::new(self.loudness, self.seed),
            frame_rng: StdRng::seed_from_u64(self.seed ^ 0x5eed_f4a3),
            sender,
            script,
            next_phrase: 0,
            frame_dt: self.frame_dt,
            frame_jitter: self.frame_jitter,
            duration: self.duration,
            elapsed: 0.0,
        })
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State of the car at the end of one frame
#[derive(Clone, Debug, PartialEq)]
pub struct TraceSample {
    pub time: f32,
    pub phase: RacePhase,
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading_deg: f32,
    pub acceleration_input: f32,
    pub steering_input: f32,
    pub grounded_wheels: usize,
    pub ticks: u32,
}

/// Per-frame trace of a scenario run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioTrace {
    pub samples: Vec<TraceSample>,
    pub stats: SessionStats,
}

impl ScenarioTrace {
    pub fn last(&self) -> Option<&TraceSample> {
        self.samples.last()
    }

    /// First sample at or after `time`
    pub fn at(&self, time: f32) -> Option<&TraceSample> {
        self.samples.iter().find(|s| s.time >= time)
    }

    pub fn max_speed(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.velocity.length())
            .fold(0.0, f32::max)
    }

    /// Lowest and highest body height over the run
    pub fn height_range(&self) -> (f32, f32) {
        self.samples.iter().fold((f32::MAX, f32::MIN), |(lo, hi), s| {
            (lo.min(s.position.y), hi.max(s.position.y))
        })
    }
}

/// A runnable scenario
pub struct Scenario {
    session: DriveSession,
    world: SimWorld,
    loudness: LoudnessGenerator,
    frame_rng: StdRng,
    sender: PhraseSender,
    script: Vec<ScriptedPhrase>,
    next_phrase: usize,
    frame_dt: f32,
    frame_jitter: f32,
    duration: f32,
    elapsed: f32,
}

impl Scenario {
    pub fn session(&self) -> &DriveSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DriveSession {
        &mut self.session
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Run one frame, delivering every phrase due by now
    pub fn step(&mut self) -> TraceSample {
        while let Some(line) = self.script.get(self.next_phrase) {
            if line.at > self.elapsed {
                break;
            }
            debug!(at = line.at, phrase = %line.phrase, "driver speaks");
            // A full inbox is counted by the session
            let _ = self.sender.send(line.phrase.clone());
            self.next_phrase += 1;
        }

        let dt = if self.frame_jitter > 0.0 {
            let jitter = self.frame_rng.gen_range(-self.frame_jitter..=self.frame_jitter);
            self.frame_dt * (1.0 + jitter)
        } else {
            self.frame_dt
        };

        let loudness = self.loudness.next_loudness();
        let report = self.session.frame(&mut self.world, dt, loudness);
        self.elapsed += dt;

        let inputs = self.session.controller().inputs();
        let body = &self.world.body;
        TraceSample {
            time: self.elapsed,
            phase: report.phase,
            position: body.position,
            velocity: body.velocity,
            heading_deg: body.heading_deg(),
            acceleration_input: inputs.acceleration,
            steering_input: inputs.steering,
            grounded_wheels: self
                .session
                .wheel_reports()
                .iter()
                .filter(|r| r.grounded)
                .count(),
            ticks: report.ticks,
        }
    }

    /// Run until the configured duration has elapsed
    pub fn run(&mut self) -> ScenarioTrace {
        let mut samples = Vec::new();
        while self.elapsed < self.duration {
            samples.push(self.step());
        }
        ScenarioTrace {
            samples,
            stats: self.session.stats().clone(),
        }
    }
}
