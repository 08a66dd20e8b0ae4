//! Derived orbit descriptors from mean elements

use serde::Serialize;
use std::f64::consts::TAU;
use std::fmt;

use crate::core::coordinates::EARTH_RADIUS_KM;

/// Earth gravitational parameter (km^3/s^2)
pub const MU_EARTH: f64 = 398_600.441_8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OrbitRegime {
    Leo,
    Meo,
    Geo,
}

impl OrbitRegime {
    pub fn from_altitude_km(altitude_km: f64) -> Self {
        if altitude_km < 1000.0 {
            OrbitRegime::Leo
        } else if altitude_km < 35000.0 {
            OrbitRegime::Meo
        } else {
            OrbitRegime::Geo
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InclinationClass {
    Low,
    Mid,
    High,
    Polar,
}

impl InclinationClass {
    pub fn from_degrees(inclination_deg: f64) -> Self {
        if inclination_deg < 30.0 {
            InclinationClass::Low
        } else if inclination_deg < 60.0 {
            InclinationClass::Mid
        } else if inclination_deg < 90.0 {
            InclinationClass::High
        } else {
            InclinationClass::Polar
        }
    }
}

/// Human-facing summary of a parsed element set
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrbitalSummary {
    pub period_minutes: f64,
    pub semi_major_axis_km: f64,
    pub mean_altitude_km: f64,
    pub perigee_altitude_km: f64,
    pub apogee_altitude_km: f64,
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub regime: OrbitRegime,
    pub inclination_class: InclinationClass,
}

impl OrbitalSummary {
    /// `mean_motion` in revolutions per day, `inclination_deg` in degrees.
    pub fn from_mean_elements(mean_motion: f64, eccentricity: f64, inclination_deg: f64) -> Self {
        let period_minutes = 1440.0 / mean_motion;
        let n_rad_s = mean_motion * TAU / 86_400.0;
        let semi_major_axis_km = (MU_EARTH / (n_rad_s * n_rad_s)).cbrt();
        let mean_altitude_km = semi_major_axis_km - EARTH_RADIUS_KM;

        Self {
            period_minutes,
            semi_major_axis_km,
            mean_altitude_km,
            perigee_altitude_km: semi_major_axis_km * (1.0 - eccentricity) - EARTH_RADIUS_KM,
            apogee_altitude_km: semi_major_axis_km * (1.0 + eccentricity) - EARTH_RADIUS_KM,
            inclination_deg,
            eccentricity,
            regime: OrbitRegime::from_altitude_km(mean_altitude_km),
            inclination_class: InclinationClass::from_degrees(inclination_deg),
        }
    }

    pub fn period_secs(&self) -> f64 {
        self.period_minutes * 60.0
    }
}

impl fmt::Display for OrbitalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {:.1} min, alt {:.0} km ({:.0}-{:.0}), inc {:.1}° ({:?}), e {:.4}",
            self.regime,
            self.period_minutes,
            self.mean_altitude_km,
            self.perigee_altitude_km,
            self.apogee_altitude_km,
            self.inclination_deg,
            self.inclination_class,
            self.eccentricity
        )
    }
}
