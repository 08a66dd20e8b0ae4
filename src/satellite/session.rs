//! Per-satellite tracking state
//!
//! A session owns one satellite's record, its current orbit path and its
//! fallback state. Record and path are always swapped together.

use bevy::log::{debug, info, warn};
use bevy::math::Vec3;
use chrono::{DateTime, Utc};
use std::mem;

use crate::core::coordinates::{Geodetic, ScaleMode, eci_to_geodetic, gmst_rad, scene_to_lat_lon, transform};
use crate::error::{OrbitError, OrbitResult};
use crate::orbital::fallback::{SyntheticOrbit, interpolate_along_path};
use crate::orbital::path::{OrbitPath, sample_path, validate};
use crate::orbital::propagation::{OrbitalRecord, Propagate, propagate_checked};
use crate::orbital::time::TimeController;
use crate::satellite::catalog::SatelliteDescriptor;
use crate::tle::parser::{clean_line, parse_element_set};
use crate::tle::types::ElementSet;

/// Fallback chain for one satellite
#[derive(Debug, Default)]
pub enum OrbitState {
    /// No element data has been processed yet.
    #[default]
    Uninitialized,
    /// Record and validated path from real element data.
    RealOrbit {
        record: OrbitalRecord,
        path: OrbitPath,
    },
    /// Circular stand-in; keeps the record when only its path was rejected.
    Synthetic { record: Option<OrbitalRecord> },
}

impl OrbitState {
    pub fn record(&self) -> Option<&OrbitalRecord> {
        match self {
            OrbitState::RealOrbit { record, .. } => Some(record),
            OrbitState::Synthetic { record } => record.as_ref(),
            OrbitState::Uninitialized => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrbitState::Uninitialized => "uninitialized",
            OrbitState::RealOrbit { .. } => "real",
            OrbitState::Synthetic { .. } => "synthetic",
        }
    }
}

/// Where a live position came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionSource {
    Propagated,
    Interpolated,
    Synthetic,
}

/// Position of a satellite for the current tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LivePosition {
    pub point: Vec3,
    pub source: PositionSource,
    /// Sub-satellite point; only available for propagated positions.
    pub geodetic: Option<Geodetic>,
}

impl LivePosition {
    /// Latitude/longitude in degrees, falling back to the scene direction.
    pub fn lat_lon(&self) -> (f64, f64) {
        match self.geodetic {
            Some(g) => (g.latitude_deg, g.longitude_deg),
            None => scene_to_lat_lon(self.point),
        }
    }
}

pub struct TrackingSession {
    descriptor: SatelliteDescriptor,
    synthetic: SyntheticOrbit,
    synthetic_path: OrbitPath,
    state: OrbitState,
    scale_mode: ScaleMode,
    path_revision: u64,
    last_error: Option<OrbitError>,
    live: Option<LivePosition>,
    pub(crate) pending_request: Option<u64>,
    pub(crate) next_fetch_at: f64,
}

impl TrackingSession {
    pub fn new(descriptor: SatelliteDescriptor, scale_mode: ScaleMode) -> Self {
        let synthetic = SyntheticOrbit::from_descriptor(&descriptor);
        Self {
            synthetic_path: synthetic.path(),
            synthetic,
            descriptor,
            state: OrbitState::Uninitialized,
            scale_mode,
            path_revision: 0,
            last_error: None,
            live: None,
            pending_request: None,
            next_fetch_at: 0.0,
        }
    }

    pub fn descriptor(&self) -> &SatelliteDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &OrbitState {
        &self.state
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn last_error(&self) -> Option<&OrbitError> {
        self.last_error.as_ref()
    }

    pub fn live_position(&self) -> Option<LivePosition> {
        self.live
    }

    /// Bumped every time `path()` changes.
    pub fn path_revision(&self) -> u64 {
        self.path_revision
    }

    /// The orbit line to draw.
    pub fn path(&self) -> &OrbitPath {
        match &self.state {
            OrbitState::RealOrbit { path, .. } => path,
            _ => &self.synthetic_path,
        }
    }

    fn sample_real_path(&self, record: &OrbitalRecord, start: DateTime<Utc>) -> OrbitResult<OrbitPath> {
        let path = sample_path(record, &self.descriptor, self.scale_mode, start)?;
        validate(&path, &self.descriptor).into_result(&self.descriptor)?;
        Ok(path)
    }

    /// Sample and validate `record`, then swap state as a whole value.
    fn settle(&mut self, record: OrbitalRecord, start: DateTime<Utc>, was_real: bool) -> OrbitResult<()> {
        let sampled = self.sample_real_path(&record, start);
        let result = match sampled {
            Ok(path) => {
                info!(
                    "[ORBIT] {} real path: {} points, max gap {:.2}",
                    self.descriptor.id,
                    path.points.len(),
                    path.max_segment
                );
                self.state = OrbitState::RealOrbit { record, path };
                Ok(())
            }
            Err(e) => {
                warn!("[ORBIT] {} using synthetic orbit: {}", self.descriptor.id, e);
                self.state = OrbitState::Synthetic {
                    record: Some(record),
                };
                Err(e)
            }
        };
        if was_real || matches!(self.state, OrbitState::RealOrbit { .. }) {
            self.path_revision += 1;
        }
        result
    }

    /// Install freshly fetched element data.
    ///
    /// An identical record is a no-op. A malformed record only downgrades an
    /// uninitialized session; otherwise the previous state keeps serving.
    pub fn install_element_set(&mut self, set: &ElementSet, start: DateTime<Utc>) -> OrbitResult<()> {
        let unchanged = self
            .state
            .record()
            .is_some_and(|r| r.same_lines(clean_line(&set.line1), clean_line(&set.line2)));
        if unchanged {
            debug!("[SGP4] {} element set unchanged", self.descriptor.id);
            return Ok(());
        }

        let record = match parse_element_set(set.name.as_deref(), &set.line1, &set.line2) {
            Ok(record) => record,
            Err(e) => {
                warn!("[SGP4] {} rejected element set: {}", self.descriptor.id, e);
                self.fail(e.clone());
                return Err(e);
            }
        };
        info!(
            "[SGP4] {} epoch {} ({})",
            self.descriptor.id,
            record.epoch_utc().to_rfc3339(),
            record.summary()
        );
        self.last_error = None;
        let was_real = matches!(self.state, OrbitState::RealOrbit { .. });
        let result = self.settle(record, start, was_real);
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }

    /// Record a failed fetch; only an uninitialized session changes state.
    pub fn on_fetch_failed(&mut self, error: OrbitError) {
        self.fail(error);
    }

    fn fail(&mut self, error: OrbitError) {
        if matches!(self.state, OrbitState::Uninitialized) {
            self.state = OrbitState::Synthetic { record: None };
        }
        self.last_error = Some(error);
    }

    /// Switch scale mode, resampling any real path from `start`.
    pub fn set_scale_mode(&mut self, mode: ScaleMode, start: DateTime<Utc>) {
        if mode == self.scale_mode {
            return;
        }
        self.scale_mode = mode;
        let was_real = matches!(self.state, OrbitState::RealOrbit { .. });
        let record = match mem::take(&mut self.state) {
            OrbitState::RealOrbit { record, .. } | OrbitState::Synthetic { record: Some(record) } => {
                record
            }
            other => {
                self.state = other;
                return;
            }
        };
        if let Err(e) = self.settle(record, start, was_real) {
            self.last_error = Some(e);
        }
    }

    /// Compute and cache the position for the clock's current instant.
    pub fn update_position(&mut self, clock: &TimeController) -> LivePosition {
        let live = match &self.state {
            OrbitState::RealOrbit { record, path } => self.resolve_position(record, path, clock),
            _ => self.synthetic_position(clock),
        };
        self.live = Some(live);
        live
    }

    /// Propagated position, else the path walk, else the synthetic orbit.
    fn resolve_position<P: Propagate + ?Sized>(
        &self,
        model: &P,
        path: &OrbitPath,
        clock: &TimeController,
    ) -> LivePosition {
        let at = clock.simulated_time();
        self.propagated(model, at)
            .or_else(|e| {
                debug!("[SGP4] {} falling back to path: {}", self.descriptor.id, e);
                self.interpolated(path, at)
            })
            .unwrap_or_else(|e| {
                debug!("[ORBIT] {} falling back to synthetic: {}", self.descriptor.id, e);
                self.synthetic_position(clock)
            })
    }

    fn propagated<P: Propagate + ?Sized>(&self, model: &P, at: DateTime<Utc>) -> OrbitResult<LivePosition> {
        let state = propagate_checked(model, at)?;
        let point = transform(state.position, self.scale_mode)?;
        Ok(LivePosition {
            point,
            source: PositionSource::Propagated,
            geodetic: Some(eci_to_geodetic(state.position, gmst_rad(at))),
        })
    }

    fn interpolated(&self, path: &OrbitPath, at: DateTime<Utc>) -> OrbitResult<LivePosition> {
        let origin = path.sampled_from.ok_or_else(|| {
            OrbitError::InvalidCoordinate("path has no sampling origin".into())
        })?;
        let elapsed = (at - origin).num_milliseconds() as f64 / 1000.0;
        let point = interpolate_along_path(path, elapsed, self.descriptor.class.nominal_period_secs())
            .ok_or_else(|| OrbitError::InvalidCoordinate("path too short to interpolate".into()))?;
        Ok(LivePosition {
            point,
            source: PositionSource::Interpolated,
            geodetic: None,
        })
    }

    fn synthetic_position(&self, clock: &TimeController) -> LivePosition {
        LivePosition {
            point: self.synthetic.position(clock.accumulated_warp()),
            source: PositionSource::Synthetic,
            geodetic: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::path::PathQuality;
    use crate::satellite::catalog::{OrbitClass, SatelliteCatalog};
    use crate::tle::mock_data::{CORRUPT_TLE, GPS_TLE, mock_block};
    use crate::orbital::propagation::InertialState;
    use crate::tle::parser::parse_tle_epoch_to_utc;
    use chrono::Duration;

    fn element_set(block: &str) -> ElementSet {
        let (name, line1, line2) = mock_block(block);
        let epoch_utc = parse_tle_epoch_to_utc(&line1).unwrap_or_else(Utc::now);
        ElementSet {
            name,
            line1,
            line2,
            epoch_utc,
        }
    }

    fn session(norad: u32) -> TrackingSession {
        let descriptor = SatelliteCatalog::default().get(norad).unwrap().clone();
        TrackingSession::new(descriptor, ScaleMode::Stylized)
    }

    #[test]
    fn test_new_session_serves_synthetic_orbit() {
        let mut s = session(25544);
        assert!(matches!(s.state(), OrbitState::Uninitialized));
        assert_eq!(s.path().quality, PathQuality::Synthetic);
        let live = s.update_position(&TimeController::default());
        assert_eq!(live.source, PositionSource::Synthetic);
        assert!((live.point.length() - 6.8).abs() < 1e-4);
    }

    #[test]
    fn test_install_valid_set_becomes_real_orbit() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        assert!(matches!(s.state(), OrbitState::RealOrbit { .. }));
        assert_eq!(s.path().quality, PathQuality::Real);
        assert_eq!(s.path_revision(), 1);

        let clock = TimeController::starting_at(set.epoch_utc + Duration::hours(2));
        let live = s.update_position(&clock);
        assert_eq!(live.source, PositionSource::Propagated);
        let g = live.geodetic.unwrap();
        assert!(g.latitude_deg.abs() <= 56.0);
        assert!((19000.0..21000.0).contains(&g.height_km), "height {}", g.height_km);
        assert_eq!(s.live_position(), Some(live));
    }

    #[test]
    fn test_identical_set_is_noop() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        s.install_element_set(&set, set.epoch_utc + Duration::hours(1)).unwrap();
        assert_eq!(s.path_revision(), 1);
        assert_eq!(s.path().sampled_from, Some(set.epoch_utc));
    }

    #[test]
    fn test_malformed_first_record_goes_synthetic() {
        let mut s = session(25544);
        let err = s.install_element_set(&element_set(CORRUPT_TLE), Utc::now());
        assert!(matches!(err, Err(OrbitError::MalformedElementSet(_))));
        assert!(matches!(s.state(), OrbitState::Synthetic { record: None }));
        assert!(s.last_error().is_some());
    }

    #[test]
    fn test_failures_after_real_orbit_keep_prior_state() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();

        s.on_fetch_failed(OrbitError::fetch(24876, "HTTP 503"));
        assert!(matches!(s.state(), OrbitState::RealOrbit { .. }));

        let mut corrupt = set.clone();
        corrupt.line1.replace_range(68..69, "0");
        assert!(s.install_element_set(&corrupt, set.epoch_utc).is_err());
        assert!(matches!(s.state(), OrbitState::RealOrbit { .. }));
        assert_eq!(s.path_revision(), 1);
    }

    #[test]
    fn test_first_fetch_failure_goes_synthetic() {
        let mut s = session(25544);
        s.on_fetch_failed(OrbitError::fetch(25544, "timeout"));
        assert!(matches!(s.state(), OrbitState::Synthetic { record: None }));
    }

    #[test]
    fn test_rejected_path_keeps_record() {
        // A station-sized window covers a fraction of a 12 h orbit, so the
        // closing segment is far above the station threshold.
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.descriptor.class = OrbitClass::CrewedStation;
        let result = s.install_element_set(&set, set.epoch_utc);
        assert!(matches!(result, Err(OrbitError::PathQualityRejected(_))));
        assert!(matches!(s.state(), OrbitState::Synthetic { record: Some(_) }));
        assert_eq!(s.path().quality, PathQuality::Synthetic);
        assert_eq!(s.path_revision(), 0);

        let live = s.update_position(&TimeController::starting_at(set.epoch_utc));
        assert_eq!(live.source, PositionSource::Synthetic);

        // Restoring the right class on the next scale change recovers the real path.
        s.descriptor.class = OrbitClass::Navigation;
        s.set_scale_mode(ScaleMode::True, set.epoch_utc);
        assert!(matches!(s.state(), OrbitState::RealOrbit { .. }));
        assert_eq!(s.path_revision(), 1);
    }

    #[test]
    fn test_scale_mode_change_resamples() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        let stylized = s.path().points[0];

        s.set_scale_mode(ScaleMode::True, set.epoch_utc);
        assert_eq!(s.scale_mode(), ScaleMode::True);
        assert_eq!(s.path_revision(), 2);
        // GPS altitude is above the boosted bands, so both modes agree.
        assert!((s.path().points[0] - stylized).length() < 1e-3);

        s.set_scale_mode(ScaleMode::True, set.epoch_utc);
        assert_eq!(s.path_revision(), 2);
    }

    #[test]
    fn test_live_position_matches_path_transform() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        let clock = TimeController::starting_at(set.epoch_utc);
        let live = s.update_position(&clock);
        assert!((live.point - s.path().points[0]).length() < 1e-3);
    }

    #[test]
    fn test_interpolation_is_phased_from_sampling_origin() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        let path = s.path().clone();

        let at_origin = s.interpolated(&path, set.epoch_utc).unwrap();
        assert_eq!(at_origin.source, PositionSource::Interpolated);
        assert!(at_origin.geodetic.is_none());
        assert!((at_origin.point - path.points[0]).length() < 1e-5);

        // One nominal period later the walk is back at the start.
        let lap = set.epoch_utc + Duration::hours(12);
        let wrapped = s.interpolated(&path, lap).unwrap();
        assert!((wrapped.point - path.points[0]).length() < 1e-3);

        // Half a period lands near the far side of the orbit.
        let half = s.interpolated(&path, set.epoch_utc + Duration::hours(6)).unwrap();
        assert!((half.point - path.points[50]).length() < 1e-3);
        let (lat, lon) = half.lat_lon();
        assert!(lat.abs() <= 90.0 && lon.abs() <= 180.0);
    }

    struct DecayedModel;

    impl Propagate for DecayedModel {
        fn propagate(&self, at: DateTime<Utc>) -> OrbitResult<InertialState> {
            Err(OrbitError::PropagationFailure(format!("decayed before {}", at)))
        }
    }

    fn real_path(s: &TrackingSession) -> OrbitPath {
        match s.state() {
            OrbitState::RealOrbit { path, .. } => path.clone(),
            other => panic!("expected a real orbit, got {}", other.label()),
        }
    }

    #[test]
    fn test_propagation_failure_walks_the_real_path() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();
        let path = real_path(&s);
        assert_eq!(path.points.len(), 101);

        // An eighth of the 12 h window is halfway along segment 12.
        let clock = TimeController::starting_at(set.epoch_utc + Duration::minutes(90));
        let live = s.resolve_position(&DecayedModel, &path, &clock);
        assert_eq!(live.source, PositionSource::Interpolated);
        assert!(live.geodetic.is_none());
        let expected = path.points[12].lerp(path.points[13], 0.5);
        assert!((live.point - expected).length() < 1e-3, "{:?} vs {:?}", live.point, expected);

        // The real record still propagates through the same chain.
        let live = s.update_position(&clock);
        assert_eq!(live.source, PositionSource::Propagated);
    }

    #[test]
    fn test_unusable_path_falls_back_to_synthetic() {
        let set = element_set(GPS_TLE);
        let mut s = session(24876);
        s.install_element_set(&set, set.epoch_utc).unwrap();

        let clock = TimeController::starting_at(set.epoch_utc + Duration::minutes(90));
        let unanchored = OrbitPath::new(real_path(&s).points, PathQuality::Real, None);
        let live = s.resolve_position(&DecayedModel, &unanchored, &clock);
        assert_eq!(live.source, PositionSource::Synthetic);
        assert_eq!(live.point, s.synthetic.position(clock.accumulated_warp()));
        assert!((live.point.length() - s.descriptor().synthetic_radius).abs() < 1e-3);
    }
}
