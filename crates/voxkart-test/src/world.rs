//! Simulated physics world
//!
//! A single rigid body over an infinite flat ground. Integration is
//! semi-implicit Euler with a diagonal inertia tensor and no collision
//! response: the car is held up by its wheels or not at all. Everything is
//! plain f32 arithmetic, so a scenario replays bit for bit.

use glam::{Quat, Vec3};
use voxkart_physics::{ForceMode, GroundProbe, PhysicsWorld, Pose, RigidBody};

/// Standard gravity, m/s²
pub const GRAVITY: f32 = 9.81;

/// Rest height of the standard kart over flat ground: the spring of each
/// of the four wheels carries a quarter of gravity
pub const KART_REST_HEIGHT: f32 = 0.6 - GRAVITY / (4.0 * 100.0);

/// Rigid body with force accumulators
#[derive(Clone, Debug)]
pub struct SimBody {
    pub mass: f32,
    /// Principal moments of inertia in body space
    pub inertia: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// World-space angular velocity, rad/s
    pub angular_velocity: Vec3,
    /// Linear acceleration accumulated this tick
    acceleration: Vec3,
    /// World-space torque accumulated this tick
    torque: Vec3,
}

impl SimBody {
    pub fn new(mass: f32, inertia: Vec3, position: Vec3) -> Self {
        SimBody {
            mass,
            inertia,
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// 1000 kg kart body
    pub fn kart(position: Vec3) -> Self {
        Self::new(1000.0, Vec3::new(1500.0, 1800.0, 1500.0), position)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Velocity along the body's forward axis
    pub fn forward_speed(&self) -> f32 {
        (self.rotation * Vec3::Z).dot(self.velocity)
    }

    /// Heading in degrees, 0 along +Z, positive toward +X
    pub fn heading_deg(&self) -> f32 {
        let forward = self.rotation * Vec3::Z;
        forward.x.atan2(forward.z).to_degrees()
    }

    /// Angle between the body up axis and world up, in degrees
    pub fn tilt_deg(&self) -> f32 {
        (self.rotation * Vec3::Y).dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Advance one step and clear the accumulators
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        if !(dt.is_finite() && dt > 0.0) {
            self.clear_forces();
            return;
        }

        self.velocity += (self.acceleration + gravity) * dt;

        let local_torque = self.rotation.inverse() * self.torque;
        let local_angular_acceleration = local_torque / self.inertia;
        self.angular_velocity += (self.rotation * local_angular_acceleration) * dt;

        self.position += self.velocity * dt;
        let spin = Quat::from_scaled_axis(self.angular_velocity * dt);
        self.rotation = (spin * self.rotation).normalize();

        self.clear_forces();
    }

    fn clear_forces(&mut self) {
        self.acceleration = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    fn as_force(&self, force: Vec3, mode: ForceMode) -> Vec3 {
        match mode {
            ForceMode::Force => force,
            ForceMode::Acceleration => force * self.mass,
        }
    }
}

impl RigidBody for SimBody {
    fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn point_velocity(&self, world_point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(world_point - self.position)
    }

    fn apply_force_at_point(&mut self, force: Vec3, world_point: Vec3, mode: ForceMode) {
        let force = self.as_force(force, mode);
        self.acceleration += force / self.mass;
        self.torque += (world_point - self.position).cross(force);
    }

    fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        self.acceleration += self.as_force(force, mode) / self.mass;
    }
}

/// Horizontal ground plane
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundProbe for FlatGround {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        if direction.y >= -f32::EPSILON {
            return None;
        }
        let t = (origin.y - self.height) / -direction.y;
        (t >= 0.0 && t <= max_distance).then_some(t)
    }
}

/// One body, flat ground, constant gravity
#[derive(Clone, Debug)]
pub struct SimWorld {
    pub body: SimBody,
    pub ground: FlatGround,
    pub gravity: Vec3,
    steps: u64,
}

impl SimWorld {
    pub fn new(body: SimBody, ground: FlatGround) -> Self {
        SimWorld {
            body,
            ground,
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
            steps: 0,
        }
    }

    /// Standard kart at `height` over ground at 0
    pub fn kart_at(height: f32) -> Self {
        Self::new(SimBody::kart(Vec3::new(0.0, height, 0.0)), FlatGround::default())
    }

    /// Integration steps so far
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl PhysicsWorld for SimWorld {
    type Body = SimBody;
    type Ground = FlatGround;

    fn split(&mut self) -> (&mut SimBody, &FlatGround) {
        (&mut self.body, &self.ground)
    }

    fn integrate(&mut self, dt: f32) {
        self.body.integrate(dt, self.gravity);
        self.steps += 1;
    }
}
