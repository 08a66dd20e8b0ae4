//! Synthetic orbits and path interpolation
//!
//! Used whenever a satellite has no trustworthy element data, or when the
//! model fails for an instant but a validated path is available.

use bevy::math::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::orbital::path::{OrbitPath, PathQuality};
use crate::satellite::catalog::SatelliteDescriptor;

/// Segments in a synthetic circle; the point count is one more.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Point on a circle of `radius` in the scene's equatorial (y = 0) plane.
pub fn position_at_angle(radius: f32, angle: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Closed circle of 65 points in the equatorial plane.
pub fn circular_orbit_path(radius: f32) -> OrbitPath {
    let mut points: Vec<Vec3> = (0..CIRCLE_SEGMENTS)
        .map(|i| position_at_angle(radius, i as f32 * TAU / CIRCLE_SEGMENTS as f32))
        .collect();
    points.push(points[0]);
    OrbitPath::new(points, PathQuality::Synthetic, None)
}

/// Stand-in circular orbit built from a descriptor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticOrbit {
    pub radius: f32,
    pub inclination_deg: f32,
    pub angular_speed: f32,
    pub initial_phase: f32,
}

impl SyntheticOrbit {
    pub fn from_descriptor(descriptor: &SatelliteDescriptor) -> Self {
        Self {
            radius: descriptor.synthetic_radius,
            inclination_deg: descriptor.inclination_deg,
            angular_speed: descriptor.angular_speed,
            initial_phase: descriptor.initial_phase,
        }
    }

    fn tilt(&self) -> Quat {
        Quat::from_rotation_z(self.inclination_deg.to_radians())
    }

    /// The drawn orbit line, tilted by the inclination.
    pub fn path(&self) -> OrbitPath {
        let tilt = self.tilt();
        let mut path = circular_orbit_path(self.radius);
        for p in path.points.iter_mut() {
            *p = tilt * *p;
        }
        OrbitPath::new(path.points, PathQuality::Synthetic, None)
    }

    /// Position after `warp_secs` of accumulated warp.
    pub fn position(&self, warp_secs: f64) -> Vec3 {
        let angle = (warp_secs * self.angular_speed as f64).rem_euclid(std::f64::consts::TAU) as f32
            + self.initial_phase;
        self.tilt() * position_at_angle(self.radius, angle)
    }
}

/// Walk a closed path at constant rate, one lap per `period_secs`.
///
/// `elapsed_secs` is measured from the path's first sample and may be
/// negative when the clock runs backwards.
pub fn interpolate_along_path(path: &OrbitPath, elapsed_secs: f64, period_secs: f64) -> Option<Vec3> {
    let segments = path.points.len().checked_sub(1)?;
    if segments == 0 || !(period_secs.is_finite() && period_secs > 0.0) || !elapsed_secs.is_finite() {
        return None;
    }
    let phase = elapsed_secs.rem_euclid(period_secs) / period_secs;
    let index = phase * segments as f64;
    let i = (index.floor() as usize).min(segments - 1);
    let t = (index - i as f64).clamp(0.0, 1.0) as f32;
    Some(path.points[i].lerp(path.points[i + 1], t))
}
