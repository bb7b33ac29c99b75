//! Vehicle - the ordered wheel set

use serde::{Deserialize, Serialize};
use voxkart_core::{VoxError, VoxResult};
use voxkart_physics::{GroundProbe, RigidBody, Vec3, Wheel, WheelConfig, WheelReport};

/// Half the track width of the standard layout
pub const STANDARD_HALF_TRACK: f32 = 0.8;
/// Half the wheelbase of the standard layout
pub const STANDARD_HALF_WHEELBASE: f32 = 1.3;

/// Wheel layout, in processing order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub wheels: Vec<WheelConfig>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self::four_wheel()
    }
}

impl VehicleConfig {
    /// Front wheels steer, rear wheels drive
    pub fn four_wheel() -> Self {
        let (x, z) = (STANDARD_HALF_TRACK, STANDARD_HALF_WHEELBASE);
        VehicleConfig {
            wheels: vec![
                WheelConfig::steered("front_left", Vec3::new(-x, 0.0, z)),
                WheelConfig::steered("front_right", Vec3::new(x, 0.0, z)),
                WheelConfig::driven("rear_left", Vec3::new(-x, 0.0, -z)),
                WheelConfig::driven("rear_right", Vec3::new(x, 0.0, -z)),
            ],
        }
    }

    /// Every wheel drives, front wheels steer
    pub fn all_wheel_drive() -> Self {
        let mut config = Self::four_wheel();
        for (i, wheel) in config.wheels.iter_mut().enumerate() {
            wheel.powered = true;
            wheel.steerable = i < 2;
        }
        config
    }

    pub fn validate(&self) -> VoxResult<()> {
        if self.wheels.is_empty() {
            return Err(VoxError::InvalidConfig("vehicle has no wheels".to_string()));
        }
        for (index, wheel) in self.wheels.iter().enumerate() {
            wheel.validate(index)?;
        }
        Ok(())
    }
}

/// The wheels of one vehicle
#[derive(Clone, Debug)]
pub struct Vehicle {
    wheels: Vec<Wheel>,
}

impl Vehicle {
    pub fn new(config: &VehicleConfig) -> VoxResult<Self> {
        config.validate()?;
        Ok(Vehicle {
            wheels: config.wheels.iter().cloned().map(Wheel::new).collect(),
        })
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    pub fn wheels_mut(&mut self) -> &mut [Wheel] {
        &mut self.wheels
    }

    pub fn wheel(&self, name: &str) -> Option<&Wheel> {
        self.wheels.iter().find(|w| w.name() == name)
    }

    /// Step every wheel in array order. Reports line up with `wheels()`.
    pub fn step<B, G>(&mut self, body: &mut B, ground: &G, dt: f32) -> Vec<WheelReport>
    where
        B: RigidBody + ?Sized,
        G: GroundProbe + ?Sized,
    {
        self.wheels
            .iter_mut()
            .map(|wheel| wheel.step(body, ground, dt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_wheel_layout() {
        let vehicle = Vehicle::new(&VehicleConfig::four_wheel()).unwrap();
        assert_eq!(vehicle.wheels().len(), 4);

        let steerable: Vec<&str> = vehicle
            .wheels()
            .iter()
            .filter(|w| w.is_steerable())
            .map(|w| w.name())
            .collect();
        assert_eq!(steerable, vec!["front_left", "front_right"]);

        assert!(vehicle.wheel("rear_right").is_some_and(|w| w.is_powered()));
        assert!(vehicle.wheel("spare").is_none());
    }

    #[test]
    fn test_all_wheel_drive() {
        let config = VehicleConfig::all_wheel_drive();
        assert!(config.wheels.iter().all(|w| w.powered));
        assert_eq!(config.wheels.iter().filter(|w| w.steerable).count(), 2);
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert!(Vehicle::new(&VehicleConfig { wheels: vec![] }).is_err());

        let mut config = VehicleConfig::four_wheel();
        config.wheels[3].grip_factor = 1.5;
        assert!(matches!(
            Vehicle::new(&config),
            Err(VoxError::InvalidWheel { index: 3, .. })
        ));
    }
}
