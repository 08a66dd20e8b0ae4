//! Core coordinate utilities
//!
//! Inertial (TEME) kilometres in, render-space units out:
//! - Visual altitude boost per scale mode and the inertial -> scene mapping
//! - Earth-frame helpers (Julian date, GMST, ECI -> ECEF, geodetic sub-point)
//!
//! Scene space is Y-up with the Earth centred on the origin and
//! `SCENE_EARTH_RADIUS_UNITS` units per Earth radius.

use bevy::math::{DQuat, DVec3, Vec3};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{OrbitError, OrbitResult};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const SCENE_EARTH_RADIUS_UNITS: f64 = 5.0;

/// Geocentric distance bounds applied to propagated positions (km).
pub const MIN_GEOCENTRIC_KM: f64 = 6000.0;
pub const MAX_GEOCENTRIC_KM: f64 = 50000.0;

/// Scene distance bounds applied to transformed positions (units).
pub const MIN_SCENE_DISTANCE: f32 = 5.5;
pub const MAX_SCENE_DISTANCE: f32 = 50.0;

// WGS-84 ellipsoid used for the geodetic sub-point.
const WGS84_A_KM: f64 = 6378.137;
const WGS84_B_KM: f64 = 6356.7523142;

/// How orbital altitude is mapped into the scene
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Low orbits are lifted away from the globe so they stay readable.
    #[default]
    Stylized,
    /// Altitude is kept physically proportional.
    True,
}

impl ScaleMode {
    /// Smallest scene distance accepted for this mode.
    ///
    /// Stylized output never legitimately lands below 5.5 units. True-scale
    /// low orbits sit just above the globe (ISS is ~5.3 units), so that mode
    /// uses the scene image of the propagator's own geocentric floor.
    pub fn min_scene_distance(self) -> f32 {
        match self {
            ScaleMode::Stylized => MIN_SCENE_DISTANCE,
            ScaleMode::True => km_to_scene(MIN_GEOCENTRIC_KM),
        }
    }
}

/// Apply the altitude boost for the given scale mode.
pub fn visual_altitude_km(altitude_km: f64, mode: ScaleMode) -> f64 {
    match mode {
        ScaleMode::True => altitude_km,
        ScaleMode::Stylized => {
            if altitude_km < 1000.0 {
                altitude_km * 2.0 + 300.0
            } else if altitude_km < 2000.0 {
                altitude_km * 1.5 + 500.0
            } else {
                altitude_km
            }
        }
    }
}

/// Convert a geocentric distance in km to scene units.
pub fn km_to_scene(distance_km: f64) -> f32 {
    (distance_km * SCENE_EARTH_RADIUS_UNITS / EARTH_RADIUS_KM) as f32
}

/// Map an inertial position (km) to a scene point.
///
/// Inertial X stays on scene X, the polar axis (Z) becomes scene Y and
/// inertial Y becomes scene Z. The direction is preserved; only the radius is
/// rescaled through the visual altitude.
pub fn transform(position_km: DVec3, mode: ScaleMode) -> OrbitResult<Vec3> {
    let distance = position_km.length();
    if !distance.is_finite() || distance <= 0.0 {
        return Err(OrbitError::InvalidCoordinate(format!(
            "non-finite inertial position {:?}",
            position_km
        )));
    }

    let altitude = distance - EARTH_RADIUS_KM;
    let visual_radius = km_to_scene(EARTH_RADIUS_KM + visual_altitude_km(altitude, mode));

    let unit = position_km / distance;
    let scene = Vec3::new(unit.x as f32, unit.z as f32, unit.y as f32) * visual_radius;

    let scene_distance = scene.length();
    if !(mode.min_scene_distance()..=MAX_SCENE_DISTANCE).contains(&scene_distance) {
        return Err(OrbitError::InvalidCoordinate(format!(
            "scene distance {:.2} outside [{:.2}, {:.2}]",
            scene_distance,
            mode.min_scene_distance(),
            MAX_SCENE_DISTANCE
        )));
    }
    Ok(scene)
}

/// Approximate inertial latitude/longitude (degrees) of a scene point.
pub fn scene_to_lat_lon(point: Vec3) -> (f64, f64) {
    let p = DVec3::new(point.x as f64, point.y as f64, point.z as f64);
    let distance = p.length();
    if distance == 0.0 {
        return (0.0, 0.0);
    }
    let lat = (p.y / distance).asin().to_degrees();
    let lon = p.z.atan2(p.x).to_degrees();
    (lat, lon)
}

// ========================= Earth-frame transformations =========================

/// Compute the Julian Date (UTC) for a given timestamp.
pub fn julian_date_utc(t: DateTime<Utc>) -> f64 {
    let mut y = t.year();
    let mut m = t.month() as i32;
    let d = t.day() as i32;

    let hour = t.hour() as f64;
    let minute = t.minute() as f64;
    let sec = t.second() as f64 + (t.nanosecond() as f64) * 1e-9_f64;
    let day_fraction = (hour + (minute + sec / 60.0) / 60.0) / 24.0;

    if m <= 2 {
        y -= 1;
        m += 12;
    }

    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    let jd0 = (365.25 * (y as f64 + 4716.0)).floor()
        + (30.6001 * ((m + 1) as f64)).floor()
        + d as f64
        + b
        - 1524.5;

    jd0 + day_fraction
}

/// Greenwich Mean Sidereal Time (radians), IAU 1982 polynomial, UT1 ~= UTC.
pub fn gmst_rad(t: DateTime<Utc>) -> f64 {
    let t_cent = (julian_date_utc(t) - 2451545.0) / 36525.0;

    let gmst_sec =
        67310.54841 + (876600.0 * 3600.0 + 8640184.812866) * t_cent + 0.093104 * t_cent * t_cent
            - 6.2e-6 * t_cent * t_cent * t_cent;

    gmst_sec.rem_euclid(86400.0) * (TAU / 86400.0)
}

/// Earth-fixed position (km) for an inertial one, given GMST in radians.
pub fn eci_to_ecef_km(eci: DVec3, gmst: f64) -> DVec3 {
    DQuat::from_rotation_z(-gmst) * eci
}

/// Geodetic sub-satellite point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
}

/// Convert an inertial position to geodetic coordinates on WGS-84.
pub fn eci_to_geodetic(eci: DVec3, gmst: f64) -> Geodetic {
    ecef_to_geodetic(eci_to_ecef_km(eci, gmst))
}

/// Earth-fixed km to WGS-84 latitude, longitude and height.
pub fn ecef_to_geodetic(ecef: DVec3) -> Geodetic {
    let f = (WGS84_A_KM - WGS84_B_KM) / WGS84_A_KM;
    let e2 = 2.0 * f - f * f;
    let r = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let longitude = ecef.y.atan2(ecef.x);

    let mut latitude = ecef.z.atan2(r);
    let mut c = 1.0;
    for _ in 0..20 {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (ecef.z + WGS84_A_KM * c * e2 * sin_lat).atan2(r);
    }

    let height_km = if latitude.cos().abs() > 1e-9 {
        r / latitude.cos() - WGS84_A_KM * c
    } else {
        // Polar case: measure along the axis instead.
        ecef.z.abs() - WGS84_B_KM
    };

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        height_km,
    }
}
