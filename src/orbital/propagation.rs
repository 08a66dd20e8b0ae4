//! Orbital propagation utilities
//!
//! `OrbitalRecord` wraps the SGP4 model for one parsed element set. It is
//! immutable once built; fresh element data produces a new record.

use bevy::math::DVec3;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::core::coordinates::{MAX_GEOCENTRIC_KM, MIN_GEOCENTRIC_KM};
use crate::error::{OrbitError, OrbitResult};
use crate::orbital::elements::OrbitalSummary;

/// Calculate minutes since epoch for SGP4 propagation
pub fn minutes_since_epoch(sim_utc: DateTime<Utc>, epoch: DateTime<Utc>) -> f64 {
    let delta = sim_utc - epoch;
    delta.num_seconds() as f64 / 60.0 + (delta.subsec_nanos() as f64) / 60.0 / 1.0e9
}

/// Inertial (TEME) state: position in km, velocity in km/s
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertialState {
    pub position: DVec3,
    pub velocity: DVec3,
}

/// Anything that can produce an inertial state for an instant.
pub trait Propagate {
    fn propagate(&self, at: DateTime<Utc>) -> OrbitResult<InertialState>;
}

/// Parsed element set plus its initialised SGP4 constants
pub struct OrbitalRecord {
    norad: u32,
    epoch_utc: DateTime<Utc>,
    line1: String,
    line2: String,
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

impl OrbitalRecord {
    pub(crate) fn new(
        norad: u32,
        elements: sgp4::Elements,
        epoch_utc: DateTime<Utc>,
        line1: &str,
        line2: &str,
    ) -> OrbitResult<Self> {
        // Deep-space vs near-Earth branches are selected by the model itself.
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| OrbitError::MalformedElementSet(e.to_string()))?;
        Ok(Self {
            norad,
            epoch_utc,
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
            constants,
        })
    }

    pub fn norad(&self) -> u32 {
        self.norad
    }

    pub fn name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }

    pub fn epoch_utc(&self) -> DateTime<Utc> {
        self.epoch_utc
    }

    /// True when both element lines are identical to `other`'s.
    pub fn same_lines(&self, line1: &str, line2: &str) -> bool {
        self.line1 == line1 && self.line2 == line2
    }

    pub fn summary(&self) -> OrbitalSummary {
        OrbitalSummary::from_mean_elements(
            self.elements.mean_motion,
            self.elements.eccentricity,
            self.elements.inclination,
        )
    }
}

impl fmt::Debug for OrbitalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalRecord")
            .field("norad", &self.norad)
            .field("name", &self.name())
            .field("epoch_utc", &self.epoch_utc)
            .finish()
    }
}

impl Propagate for OrbitalRecord {
    fn propagate(&self, at: DateTime<Utc>) -> OrbitResult<InertialState> {
        let mins = minutes_since_epoch(at, self.epoch_utc);
        // sgp4 2.x expects MinutesSinceEpoch newtype and returns arrays
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(mins))
            .map_err(|e| {
                OrbitError::PropagationFailure(format!(
                    "NORAD {} at {:+.1} min from epoch: {}",
                    self.norad, mins, e
                ))
            })?;
        Ok(InertialState {
            position: DVec3::from_array(prediction.position),
            velocity: DVec3::from_array(prediction.velocity),
        })
    }
}

/// Caller-side sanity filter on a propagated position.
///
/// Returns the geocentric distance in km when it is finite and inside
/// [`MIN_GEOCENTRIC_KM`, `MAX_GEOCENTRIC_KM`].
pub fn check_inertial(position: DVec3) -> OrbitResult<f64> {
    if !position.is_finite() {
        return Err(OrbitError::InvalidCoordinate(format!(
            "non-finite inertial position {:?}",
            position
        )));
    }
    let distance = position.length();
    if !(MIN_GEOCENTRIC_KM..=MAX_GEOCENTRIC_KM).contains(&distance) {
        return Err(OrbitError::InvalidCoordinate(format!(
            "geocentric distance {:.0} km outside [{:.0}, {:.0}]",
            distance, MIN_GEOCENTRIC_KM, MAX_GEOCENTRIC_KM
        )));
    }
    Ok(distance)
}

/// Propagate and apply the sanity filter in one step.
pub fn propagate_checked<P: Propagate + ?Sized>(
    model: &P,
    at: DateTime<Utc>,
) -> OrbitResult<InertialState> {
    let state = model.propagate(at)?;
    check_inertial(state.position)?;
    if !state.velocity.is_finite() {
        return Err(OrbitError::InvalidCoordinate(format!(
            "non-finite inertial velocity {:?}",
            state.velocity
        )));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::mock_data::{GPS_TLE, ISS_2008_TLE, SENTINEL_TLE, parse_mock};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_minutes_since_epoch() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let sim_time = Utc.with_ymd_and_hms(2000, 1, 1, 1, 0, 0).unwrap();
        assert!((minutes_since_epoch(sim_time, epoch) - 60.0).abs() < 1e-10);

        let sim_time_frac = Utc.with_ymd_and_hms(2000, 1, 1, 0, 1, 30).unwrap();
        assert!((minutes_since_epoch(sim_time_frac, epoch) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_minutes_since_epoch_negative_spans() {
        let epoch = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let before_frac = epoch - Duration::seconds(90);
        let negative_frac = minutes_since_epoch(before_frac, epoch);
        assert!(
            (negative_frac + 1.5).abs() < 1e-10,
            "Negative fractional: expected -1.5 minutes, got {}",
            negative_frac
        );
    }

    #[test]
    fn test_minutes_since_epoch_high_precision() {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let sim_time = epoch + Duration::seconds(90) + Duration::nanoseconds(500_000_000);
        let expected = 1.5 + 0.5 / 60.0;
        assert!((minutes_since_epoch(sim_time, epoch) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_propagate_iss_at_epoch_within_bounds() {
        let record = parse_mock(ISS_2008_TLE);
        let state = record.propagate(record.epoch_utc()).unwrap();
        let distance = check_inertial(state.position).unwrap();
        // Mean motion 15.72 rev/day: roughly 6700 km from the centre
        assert!((6500.0..6900.0).contains(&distance), "distance {}", distance);
        // LEO orbital speed ~7.7 km/s
        let speed = state.velocity.length();
        assert!((7.0..8.2).contains(&speed), "speed {}", speed);
    }

    #[test]
    fn test_propagate_deep_space_gps() {
        let record = parse_mock(GPS_TLE);
        for hours in [0, 3, 6, 9, 12] {
            let at = record.epoch_utc() + Duration::hours(hours);
            let state = propagate_checked(&record, at).unwrap();
            let distance = state.position.length();
            assert!((26000.0..27200.0).contains(&distance), "distance {}", distance);
        }
    }

    #[test]
    fn test_propagated_distance_stays_in_sanity_range() {
        let record = parse_mock(SENTINEL_TLE);
        for minutes in (0..200).step_by(10) {
            let at = record.epoch_utc() + Duration::minutes(minutes);
            match propagate_checked(&record, at) {
                Ok(state) => {
                    let d = state.position.length();
                    assert!((MIN_GEOCENTRIC_KM..=MAX_GEOCENTRIC_KM).contains(&d));
                }
                Err(e) => assert!(matches!(
                    e,
                    OrbitError::PropagationFailure(_) | OrbitError::InvalidCoordinate(_)
                )),
            }
        }
    }

    #[test]
    fn test_check_inertial_rejects_out_of_range() {
        assert!(check_inertial(DVec3::new(5000.0, 0.0, 0.0)).is_err());
        assert!(check_inertial(DVec3::new(60000.0, 0.0, 0.0)).is_err());
        assert!(check_inertial(DVec3::new(f64::NAN, 7000.0, 0.0)).is_err());
        assert!(check_inertial(DVec3::new(0.0, 7000.0, 0.0)).is_ok());
    }

    struct DecayedModel;

    impl Propagate for DecayedModel {
        fn propagate(&self, _at: DateTime<Utc>) -> OrbitResult<InertialState> {
            Err(OrbitError::PropagationFailure("decayed".into()))
        }
    }

    #[test]
    fn test_propagate_checked_passes_model_failure_through() {
        let now = Utc::now();
        assert!(matches!(
            propagate_checked(&DecayedModel, now),
            Err(OrbitError::PropagationFailure(_))
        ));
    }

    #[test]
    fn test_record_summary_and_identity() {
        let record = parse_mock(ISS_2008_TLE);
        assert_eq!(record.norad(), 25544);
        assert_eq!(record.name(), Some("ISS (ZARYA)"));
        let summary = record.summary();
        assert!((summary.period_minutes - 91.6).abs() < 0.2);
        assert!(format!("{:?}", record).contains("25544"));
    }
}
