//! Scalar and angle helpers
//!
//! All smoothing in VOXKART is parameterized by the elapsed tick duration.
//! These helpers are the shared building blocks.

/// Clamp to [0, 1]. NaN maps to 0.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a control scalar to [-1, 1]. NaN maps to 0.
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Move `current` toward `target` by at most `max_delta`. Never overshoots.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta.max(0.0) {
        target
    } else {
        current + delta.signum() * max_delta.max(0.0)
    }
}

/// Round to the nearest integer, ties to the even neighbour
#[inline]
pub fn round_half_even(value: f32) -> f32 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - value.signum()
    } else {
        rounded
    }
}

/// Wrap `value` into [0, length)
#[inline]
pub fn repeat(value: f32, length: f32) -> f32 {
    (value - (value / length).floor() * length).clamp(0.0, length)
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = repeat(angle, 360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed difference from `current` to `target`, in degrees, within (-180, 180]
#[inline]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = repeat(target - current, 360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Interpolate between two angles in degrees along the shorter arc.
///
/// `t` is clamped to [0, 1]. The result is not wrapped; callers that store
/// angles in [0, 360) wrap it themselves.
#[inline]
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    current + delta_angle(current, target) * clamp01(t)
}

/// Signed view of an angle stored in [0, 360): returns (-180, 180]
#[inline]
pub fn signed_degrees(angle: f32) -> f32 {
    delta_angle(0.0, angle)
}
