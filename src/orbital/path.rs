//! Orbit path sampling and quality checks

use bevy::math::Vec3;
use chrono::{DateTime, Duration, Utc};

use crate::core::coordinates::{ScaleMode, transform};
use crate::error::{OrbitError, OrbitResult};
use crate::orbital::propagation::{Propagate, propagate_checked};
use crate::satellite::catalog::SatelliteDescriptor;

/// Minimum spacing between samples.
pub const MIN_SAMPLE_STEP_SECS: f64 = 60.0;
/// Target sample count per nominal period.
pub const TARGET_SAMPLES: f64 = 100.0;
/// Fraction of intended samples that must survive.
pub const MIN_VALID_FRACTION: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathQuality {
    Real,
    Synthetic,
}

/// Closed loop of scene points (first point repeated at the end)
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitPath {
    pub points: Vec<Vec3>,
    pub quality: PathQuality,
    /// Largest distance between consecutive points.
    pub max_segment: f32,
    /// Instant of the first sample for real paths.
    pub sampled_from: Option<DateTime<Utc>>,
}

impl OrbitPath {
    pub fn new(points: Vec<Vec3>, quality: PathQuality, sampled_from: Option<DateTime<Utc>>) -> Self {
        let max_segment = max_segment(&points);
        Self {
            points,
            quality,
            max_segment,
            sampled_from,
        }
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false,
        }
    }
}

/// Largest Euclidean gap between consecutive points.
pub fn max_segment(points: &[Vec3]) -> f32 {
    points
        .windows(2)
        .map(|w| w[0].distance(w[1]))
        .fold(0.0, f32::max)
}

/// Time step and intended sample count for a nominal period.
pub fn sampling_plan(period_secs: f64) -> (f64, usize) {
    let step = (period_secs / TARGET_SAMPLES).max(MIN_SAMPLE_STEP_SECS);
    let count = (period_secs / step).floor() as usize;
    (step, count.max(1))
}

/// Sample one nominal period of `model` starting at `start`.
///
/// Samples that fail to propagate or fall outside the sanity ranges are
/// dropped. Fewer than 80% survivors rejects the whole path.
pub fn sample_path<P: Propagate + ?Sized>(
    model: &P,
    descriptor: &SatelliteDescriptor,
    mode: ScaleMode,
    start: DateTime<Utc>,
) -> OrbitResult<OrbitPath> {
    let (step, count) = sampling_plan(descriptor.class.nominal_period_secs());

    let mut points = Vec::with_capacity(count + 1);
    let mut dropped = 0usize;
    for i in 0..count {
        let at = start + Duration::milliseconds((i as f64 * step * 1000.0).round() as i64);
        let point = propagate_checked(model, at).and_then(|state| transform(state.position, mode));
        match point {
            Ok(p) => points.push(p),
            Err(_) => dropped += 1,
        }
    }

    let valid = points.len();
    if (valid as f64) < MIN_VALID_FRACTION * count as f64 {
        return Err(OrbitError::PathQualityRejected(format!(
            "{}: only {}/{} samples valid ({} dropped)",
            descriptor.id, valid, count, dropped
        )));
    }

    if let Some(&first) = points.first() {
        points.push(first);
    }
    Ok(OrbitPath::new(points, PathQuality::Real, Some(start)))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathVerdict {
    Accepted,
    Rejected { max_segment: f32, threshold: f32 },
}

/// Continuity check against the descriptor's class threshold.
pub fn validate(path: &OrbitPath, descriptor: &SatelliteDescriptor) -> PathVerdict {
    let threshold = descriptor.class.continuity_threshold();
    let max_segment = max_segment(&path.points);
    if path.is_closed() && max_segment < threshold {
        PathVerdict::Accepted
    } else {
        PathVerdict::Rejected {
            max_segment,
            threshold,
        }
    }
}

impl PathVerdict {
    pub fn into_result(self, descriptor: &SatelliteDescriptor) -> OrbitResult<()> {
        match self {
            PathVerdict::Accepted => Ok(()),
            PathVerdict::Rejected {
                max_segment,
                threshold,
            } => Err(OrbitError::PathQualityRejected(format!(
                "{}: max segment {:.2} >= threshold {:.2}",
                descriptor.id, max_segment, threshold
            ))),
        }
    }
}
