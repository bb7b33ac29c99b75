//! Drive session - the frame loop

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use voxkart_core::CommandKind;
use voxkart_physics::{PhysicsWorld, WheelReport};
use voxkart_vehicle::{Vehicle, VehicleController};
use voxkart_voice::{
    CommandBus, CommandDispatcher, DispatchStats, PhraseInbox, PhraseSender, SubscriptionId,
    VoiceEnvelopeTracker,
};

use crate::{FixedStepClock, RacePhase, RaceState, SessionConfig, SessionResult};

/// What one frame did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Phase at the end of the frame
    pub phase: RacePhase,
    /// Envelope samples written
    pub samples: usize,
    /// Phrases drained from the inbox
    pub phrases: usize,
    /// Phrases that became command events
    pub commands: usize,
    /// Fixed ticks run
    pub ticks: u32,
}

/// Session statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub fixed_ticks: u64,
    pub phrases_received: u64,
    pub commands_dispatched: u64,
    pub phrases_rejected: u64,
    pub pause_toggles: u64,
    /// Wheel steps with ground contact
    pub grounded_wheel_steps: u64,
    /// Wheel steps without ground contact
    pub airborne_wheel_steps: u64,
}

/// Drive session
///
/// Owns the envelope tracker, command bus, dispatcher, controller, vehicle,
/// fixed-step clock and race state. Everything is built from one
/// [`SessionConfig`]; nothing is global.
pub struct DriveSession {
    config: SessionConfig,
    tracker: VoiceEnvelopeTracker,
    inbox: PhraseInbox,
    bus: CommandBus,
    dispatcher: CommandDispatcher,
    controller: VehicleController,
    vehicle: Vehicle,
    clock: FixedStepClock,
    race: RaceState,
    /// Pause commands seen on the bus since the last frame
    pause_requests: Arc<AtomicU32>,
    pause_subscription: SubscriptionId,
    wheel_reports: Vec<WheelReport>,
    stats: SessionStats,
}

impl DriveSession {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        let tracker = VoiceEnvelopeTracker::with_config(&config.envelope)?;
        let bus = CommandBus::new();
        let dispatcher = CommandDispatcher::new(config.vocabulary.clone(), bus.clone());
        let controller = VehicleController::attach(&bus, config.controller.clone())?;
        let vehicle = Vehicle::new(&config.vehicle)?;
        let clock = FixedStepClock::new(config.fixed_timestep, config.max_frame_delta)?;
        let race = RaceState::new(config.countdown_secs);
        let inbox = PhraseInbox::new(config.inbox_capacity);

        // The car is on the grid but not drivable until the race runs
        controller.set_enabled(race.phase().controls_enabled());

        let pause_requests = Arc::new(AtomicU32::new(0));
        let requests = Arc::clone(&pause_requests);
        let pause_subscription = bus.subscribe(move |event| {
            if event.kind() == CommandKind::Pause {
                requests.fetch_add(1, Ordering::Relaxed);
            }
        });

        info!(
            wheels = vehicle.wheels().len(),
            phrases = config.vocabulary.len(),
            fixed_timestep = config.fixed_timestep,
            "drive session created"
        );

        Ok(DriveSession {
            config,
            tracker,
            inbox,
            bus,
            dispatcher,
            controller,
            vehicle,
            clock,
            race,
            pause_requests,
            pause_subscription,
            wheel_reports: Vec::new(),
            stats: SessionStats::default(),
        })
    }

    /// Begin the countdown
    pub fn start(&mut self) -> bool {
        let started = self.race.start();
        self.sync_controller();
        started
    }

    /// End the race. The controller stops accepting commands.
    pub fn finish(&mut self) -> bool {
        let finished = self.race.finish();
        self.sync_controller();
        if finished {
            info!(race_time = %self.race.race_time_label(), "race finished");
        }
        finished
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.race.pause();
        self.sync_controller();
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.race.resume();
        self.sync_controller();
        resumed
    }

    /// Sender for the recognizer. Phrases sent through it are dispatched
    /// at the start of the next frame.
    pub fn phrase_sender(&self) -> PhraseSender {
        self.inbox.sender()
    }

    /// Run one frame: sample, dispatch, advance the race, then as many
    /// fixed ticks as the clock has accumulated.
    pub fn frame<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        frame_dt: f32,
        loudness: f32,
    ) -> FrameReport {
        let dt = self.clock.clamp_frame(frame_dt);
        self.stats.frames += 1;

        let samples = if self.race.phase().simulates() {
            self.tracker.update(dt, loudness)
        } else {
            0
        };

        let phrases = self.inbox.drain();
        let mut commands = 0;
        for phrase in &phrases {
            if self.dispatcher.dispatch(phrase, &self.tracker).is_some() {
                commands += 1;
            }
        }
        self.stats.phrases_received += phrases.len() as u64;
        self.stats.commands_dispatched += commands as u64;
        self.stats.phrases_rejected += (phrases.len() - commands) as u64;

        self.apply_pause_requests();

        if let Some(phase) = self.race.advance(dt) {
            debug!(%phase, "race phase advanced");
        }
        self.sync_controller();

        let ticks = if self.race.phase().simulates() {
            self.clock.advance(dt)
        } else {
            0
        };
        for _ in 0..ticks {
            self.fixed_tick(world);
        }

        FrameReport {
            phase: self.race.phase(),
            samples,
            phrases: phrases.len(),
            commands,
            ticks,
        }
    }

    fn apply_pause_requests(&mut self) {
        let requests = self.pause_requests.swap(0, Ordering::Relaxed);
        for _ in 0..requests {
            if self.race.toggle_pause() {
                self.stats.pause_toggles += 1;
            }
        }
    }

    fn sync_controller(&self) {
        self.controller.set_enabled(self.race.phase().controls_enabled());
    }

    /// Controller, then every wheel in order, then integration
    fn fixed_tick<W: PhysicsWorld>(&mut self, world: &mut W) {
        let dt = self.clock.timestep();

        self.controller.fixed_update(self.vehicle.wheels_mut(), dt);

        let (body, ground) = world.split();
        self.wheel_reports = self.vehicle.step(body, ground, dt);
        world.integrate(dt);

        let grounded = self.wheel_reports.iter().filter(|r| r.grounded).count() as u64;
        self.stats.grounded_wheel_steps += grounded;
        self.stats.airborne_wheel_steps += self.wheel_reports.len() as u64 - grounded;
        self.stats.fixed_ticks += 1;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> RacePhase {
        self.race.phase()
    }

    pub fn race(&self) -> &RaceState {
        &self.race
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn tracker(&self) -> &VoiceEnvelopeTracker {
        &self.tracker
    }

    /// The bus commands are published on, for extra subscribers
    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn controller(&self) -> &VehicleController {
        &self.controller
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Reports from the last fixed tick, in wheel order
    pub fn wheel_reports(&self) -> &[WheelReport] {
        &self.wheel_reports
    }

    pub fn dispatch_stats(&self) -> &DispatchStats {
        self.dispatcher.stats()
    }

    /// Phrases lost to a full inbox
    pub fn phrases_dropped(&self) -> u64 {
        self.inbox.dropped()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

impl Drop for DriveSession {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.pause_subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxkart_physics::{ForceMode, GroundProbe, Pose, RigidBody, Vec3};

    /// A body pinned in place on flat ground. Forces are counted, not
    /// integrated.
    struct PinnedWorld {
        body: PinnedBody,
        ground: Floor,
        integrations: u32,
    }

    struct PinnedBody {
        height: f32,
        forces: u32,
    }

    struct Floor;

    impl RigidBody for PinnedBody {
        fn pose(&self) -> Pose {
            Pose::from_position(Vec3::new(0.0, self.height, 0.0))
        }

        fn linear_velocity(&self) -> Vec3 {
            Vec3::ZERO
        }

        fn point_velocity(&self, _world_point: Vec3) -> Vec3 {
            Vec3::ZERO
        }

        fn apply_force_at_point(&mut self, _force: Vec3, _world_point: Vec3, _mode: ForceMode) {
            self.forces += 1;
        }

        fn apply_force(&mut self, _force: Vec3, _mode: ForceMode) {
            self.forces += 1;
        }
    }

    impl GroundProbe for Floor {
        fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
            if direction.y >= 0.0 {
                return None;
            }
            let t = origin.y / -direction.y;
            (t >= 0.0 && t <= max_distance).then_some(t)
        }
    }

    impl PhysicsWorld for PinnedWorld {
        type Body = PinnedBody;
        type Ground = Floor;

        fn split(&mut self) -> (&mut PinnedBody, &Floor) {
            (&mut self.body, &self.ground)
        }

        fn integrate(&mut self, _dt: f32) {
            self.integrations += 1;
        }
    }

    fn world(height: f32) -> PinnedWorld {
        PinnedWorld {
            body: PinnedBody { height, forces: 0 },
            ground: Floor,
            integrations: 0,
        }
    }

    fn config() -> SessionConfig {
        SessionConfig {
            fixed_timestep: 0.25,
            max_frame_delta: 1.0,
            countdown_secs: 1.0,
            ..SessionConfig::default()
        }
    }

    fn running_session() -> (DriveSession, PinnedWorld) {
        let mut session = DriveSession::new(config()).unwrap();
        let mut world = world(0.5);
        session.start();
        session.frame(&mut world, 1.0, 0.0);
        assert_eq!(session.phase(), RacePhase::Running);
        (session, world)
    }

    #[test]
    fn test_ticks_follow_frame_time() {
        let mut session = DriveSession::new(config()).unwrap();
        let mut w = world(0.5);

        let report = session.frame(&mut w, 0.5, 0.0);
        assert_eq!(report.ticks, 2);
        assert_eq!(w.integrations, 2);
        assert_eq!(session.wheel_reports().len(), 4);
        assert!(session.wheel_reports().iter().all(|r| r.grounded));
        assert_eq!(session.stats().grounded_wheel_steps, 8);
    }

    #[test]
    fn test_airborne_counts() {
        let mut session = DriveSession::new(config()).unwrap();
        let mut w = world(5.0);
        session.frame(&mut w, 0.25, 0.0);
        assert_eq!(session.stats().airborne_wheel_steps, 4);
        assert_eq!(w.body.forces, 0);
    }

    #[test]
    fn test_controller_follows_phase() {
        let mut session = DriveSession::new(config()).unwrap();
        let mut w = world(0.5);
        assert!(!session.controller().is_enabled());

        session.start();
        assert_eq!(session.phase(), RacePhase::Countdown);
        assert!(!session.controller().is_enabled());

        session.frame(&mut w, 1.0, 0.0);
        assert_eq!(session.phase(), RacePhase::Running);
        assert!(session.controller().is_enabled());

        assert!(session.finish());
        assert!(!session.controller().is_enabled());
    }

    #[test]
    fn test_commands_ignored_during_countdown() {
        let mut session = DriveSession::new(config()).unwrap();
        let mut w = world(0.5);
        session.start();

        session.phrase_sender().send("accelerate").unwrap();
        let report = session.frame(&mut w, 0.25, 1.0);
        assert_eq!(report.commands, 1);
        assert_eq!(session.controller().inputs().acceleration, 0.0);
    }

    #[test]
    fn test_phrase_dispatched_next_frame() {
        let (mut session, mut w) = running_session();

        let sender = session.phrase_sender();
        sender.send("accelerate").unwrap();
        sender.send("honk").unwrap();
        assert_eq!(session.controller().inputs().acceleration, 0.0);

        let report = session.frame(&mut w, 0.25, 1.0);
        assert_eq!(report.phrases, 2);
        assert_eq!(report.commands, 1);
        assert_eq!(session.stats().phrases_rejected, 1);
        assert_eq!(session.dispatch_stats().count(CommandKind::Accelerate), 1);

        assert_eq!(session.controller().stats().commands_applied, 1);
        // Intensity is read from one second back, when the driver was silent
        assert_eq!(session.controller().inputs().acceleration, 0.0);
    }

    #[test]
    fn test_inputs_reach_wheels() {
        let (mut session, mut w) = running_session();

        // Fill the envelope with full loudness so intensity is 1
        for _ in 0..20 {
            session.frame(&mut w, 0.1, 1.0);
        }
        session.phrase_sender().send("brake").unwrap();
        session.frame(&mut w, 0.25, 1.0);

        assert!((session.controller().inputs().acceleration + 1.0).abs() < 1e-6);
        for wheel in session.vehicle().wheels() {
            assert!((wheel.acceleration_input() + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_voice_pause_toggles_and_freezes() {
        let (mut session, mut w) = running_session();
        let integrations = w.integrations;
        let race_time = session.race().race_time();

        session.phrase_sender().send("pause").unwrap();
        let report = session.frame(&mut w, 0.5, 0.5);
        assert_eq!(report.phase, RacePhase::Paused);
        assert_eq!(report.ticks, 0);
        assert_eq!(w.integrations, integrations);
        assert_eq!(session.race().race_time(), race_time);

        // Commands still accumulate while paused
        session.phrase_sender().send("left").unwrap();
        let report = session.frame(&mut w, 0.5, 0.5);
        assert_eq!(report.samples, 0);
        assert_eq!(report.ticks, 0);
        assert!(session.controller().inputs().steering <= 0.0);

        session.phrase_sender().send("pause").unwrap();
        let report = session.frame(&mut w, 0.5, 0.5);
        assert_eq!(report.phase, RacePhase::Running);
        assert_eq!(report.ticks, 2);
        assert_eq!(session.stats().pause_toggles, 2);
    }

    #[test]
    fn test_bus_is_shared() {
        let (mut session, mut w) = running_session();
        let seen = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&seen);
        session.bus().subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        session.phrase_sender().send("straight").unwrap();
        session.frame(&mut w, 0.25, 0.0);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let session = DriveSession::new(config()).unwrap();
        let bus = session.bus().clone();
        assert_eq!(bus.subscriber_count(), 2);
        drop(session);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            fixed_timestep: -1.0,
            ..SessionConfig::default()
        };
        assert!(DriveSession::new(config).is_err());
    }
}
