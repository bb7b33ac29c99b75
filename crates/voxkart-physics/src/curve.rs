//! Torque response curve
//!
//! Maps normalized vehicle speed in [0, 1] to the fraction of the maximum
//! drive torque available at that speed.

use serde::{Deserialize, Serialize};
use voxkart_core::{VoxError, VoxResult};

/// One curve keyframe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        CurveKey { time, value }
    }
}

/// Piecewise-linear keyframe curve, clamped outside its key range
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct TorqueCurve {
    keys: Vec<CurveKey>,
}

impl TorqueCurve {
    /// Build a curve. Keys must be finite with non-decreasing times.
    pub fn new(keys: Vec<CurveKey>) -> VoxResult<Self> {
        if let Some(bad) = keys
            .iter()
            .find(|k| !k.time.is_finite() || !k.value.is_finite())
        {
            return Err(VoxError::InvalidCurve(format!(
                "non-finite key ({}, {})",
                bad.time, bad.value
            )));
        }
        if keys.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(VoxError::InvalidCurve(
                "key times must be non-decreasing".to_string(),
            ));
        }
        Ok(TorqueCurve { keys })
    }

    /// Full torque at every speed
    pub fn flat() -> Self {
        TorqueCurve {
            keys: vec![CurveKey::new(0.0, 1.0)],
        }
    }

    /// Strong launch, tapering to nothing at top speed
    pub fn falloff() -> Self {
        TorqueCurve {
            keys: vec![
                CurveKey::new(0.0, 1.0),
                CurveKey::new(0.6, 0.85),
                CurveKey::new(1.0, 0.0),
            ],
        }
    }

    /// Evaluate at `t`. An empty curve evaluates to 1.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 1.0,
        };

        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; t > first.time guarantees idx >= 1
        let idx = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((t - a.time) / span)
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }
}

impl Default for TorqueCurve {
    fn default() -> Self {
        Self::falloff()
    }
}

impl TryFrom<Vec<CurveKey>> for TorqueCurve {
    type Error = VoxError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<TorqueCurve> for Vec<CurveKey> {
    fn from(curve: TorqueCurve) -> Self {
        curve.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        let empty = TorqueCurve::new(vec![]).unwrap();
        assert_eq!(empty.evaluate(0.3), 1.0);

        assert_eq!(TorqueCurve::flat().evaluate(0.0), 1.0);
        assert_eq!(TorqueCurve::flat().evaluate(1.0), 1.0);
    }

    #[test]
    fn test_linear_segments() {
        let curve = TorqueCurve::new(vec![CurveKey::new(0.0, 1.0), CurveKey::new(1.0, 0.0)]).unwrap();
        assert!((curve.evaluate(0.25) - 0.75).abs() < 1e-6);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_outside_range() {
        let curve = TorqueCurve::falloff();
        assert_eq!(curve.evaluate(-1.0), 1.0);
        assert_eq!(curve.evaluate(2.0), 0.0);
        assert_eq!(curve.evaluate(f32::NAN), 1.0);
    }

    #[test]
    fn test_key_hit_exactly() {
        let curve = TorqueCurve::falloff();
        assert!((curve.evaluate(0.6) - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(TorqueCurve::new(vec![CurveKey::new(0.5, 1.0), CurveKey::new(0.2, 1.0)]).is_err());
        assert!(TorqueCurve::new(vec![CurveKey::new(0.0, f32::INFINITY)]).is_err());
    }

    #[test]
    fn test_step_key_takes_later_value() {
        let curve = TorqueCurve::new(vec![
            CurveKey::new(0.0, 1.0),
            CurveKey::new(0.5, 1.0),
            CurveKey::new(0.5, 0.2),
            CurveKey::new(1.0, 0.2),
        ])
        .unwrap();
        assert!((curve.evaluate(0.49) - 1.0).abs() < 1e-6);
        assert!((curve.evaluate(0.51) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_serde_keys() {
        let curve: TorqueCurve =
            serde_json::from_str(r#"[{"time":0.0,"value":1.0},{"time":1.0,"value":0.5}]"#).unwrap();
        assert!((curve.evaluate(1.0) - 0.5).abs() < 1e-6);
        assert!(serde_json::from_str::<TorqueCurve>(r#"[{"time":1.0,"value":1.0},{"time":0.0,"value":0.5}]"#).is_err());
    }
}
