//! Static satellite descriptors
//!
//! Descriptors are configuration: the tracking code reads them but never
//! mutates them.

use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Coarse orbit family used to size sampling windows and continuity checks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitClass {
    #[default]
    Generic,
    /// ISS, Tiangong
    CrewedStation,
    /// Hubble, Starlink
    MidLeo,
    /// Sentinel and other near-polar imagers
    SunSynchronous,
    /// GPS and other ~12 h orbits
    Navigation,
}

impl OrbitClass {
    /// Nominal period used for sampling and interpolation, never for physics.
    pub fn nominal_period_secs(self) -> f64 {
        match self {
            OrbitClass::Generic => 90.0 * 60.0,
            OrbitClass::CrewedStation => 93.0 * 60.0,
            OrbitClass::MidLeo => 95.0 * 60.0,
            OrbitClass::SunSynchronous => 100.0 * 60.0,
            OrbitClass::Navigation => 12.0 * 3600.0,
        }
    }

    /// Largest accepted gap between consecutive path points (scene units).
    pub fn continuity_threshold(self) -> f32 {
        match self {
            OrbitClass::Navigation => 8.0,
            OrbitClass::SunSynchronous => 2.5,
            _ => 1.5,
        }
    }

    /// Best-effort class from a satellite name.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("gps") || name.contains("navstar") {
            OrbitClass::Navigation
        } else if name.contains("sentinel") {
            OrbitClass::SunSynchronous
        } else if name.contains("iss") || name.contains("tiangong") || name.contains("css") {
            OrbitClass::CrewedStation
        } else if name.contains("hubble") || name.contains("hst") || name.contains("starlink") {
            OrbitClass::MidLeo
        } else {
            OrbitClass::Generic
        }
    }
}

/// One tracked satellite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogEntry")]
pub struct SatelliteDescriptor {
    pub id: String,
    pub norad: u32,
    pub name: String,
    pub class: OrbitClass,
    /// Display colour as `#rrggbb`.
    pub color: String,
    /// Synthetic orbit radius in scene units.
    pub synthetic_radius: f32,
    /// Synthetic orbit inclination in degrees.
    pub inclination_deg: f32,
    /// Synthetic angular speed in radians per warp-second.
    pub angular_speed: f32,
    /// Synthetic phase at zero warp in radians.
    pub initial_phase: f32,
}

/// Catalog file form of a descriptor; `class` may be left to the name.
#[derive(Deserialize)]
struct CatalogEntry {
    id: String,
    norad: u32,
    name: String,
    #[serde(default)]
    class: Option<OrbitClass>,
    color: String,
    synthetic_radius: f32,
    inclination_deg: f32,
    angular_speed: f32,
    #[serde(default)]
    initial_phase: f32,
}

impl From<CatalogEntry> for SatelliteDescriptor {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            class: entry
                .class
                .unwrap_or_else(|| OrbitClass::from_name(&entry.name)),
            id: entry.id,
            norad: entry.norad,
            name: entry.name,
            color: entry.color,
            synthetic_radius: entry.synthetic_radius,
            inclination_deg: entry.inclination_deg,
            angular_speed: entry.angular_speed,
            initial_phase: entry.initial_phase,
        }
    }
}

impl SatelliteDescriptor {
    /// Parse `color` into sRGB components in [0, 1].
    pub fn rgb(&self) -> Option<[f32; 3]> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(hex.get(i..i + 2)?, 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some([channel(0)?, channel(2)?, channel(4)?])
    }
}

/// The set of satellites tracked at start-up
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SatelliteCatalog {
    pub satellites: Vec<SatelliteDescriptor>,
}

#[allow(clippy::too_many_arguments)]
fn descriptor(
    id: &str,
    norad: u32,
    name: &str,
    class: OrbitClass,
    color: &str,
    synthetic_radius: f32,
    inclination_deg: f32,
    angular_speed: f32,
    initial_phase: f32,
) -> SatelliteDescriptor {
    SatelliteDescriptor {
        id: id.to_string(),
        norad,
        name: name.to_string(),
        class,
        color: color.to_string(),
        synthetic_radius,
        inclination_deg,
        angular_speed,
        initial_phase,
    }
}

impl Default for SatelliteCatalog {
    fn default() -> Self {
        Self {
            satellites: vec![
                descriptor("iss", 25544, "ISS (ZARYA)", OrbitClass::CrewedStation, "#ff6b6b", 6.8, 51.6, 1.0, 0.0),
                descriptor("hubble", 20580, "Hubble Space Telescope", OrbitClass::MidLeo, "#4ecdc4", 7.2, 28.5, 0.98, PI),
                descriptor("starlink", 44713, "Starlink-1007", OrbitClass::MidLeo, "#45b7d1", 7.5, 53.0, 0.98, PI / 2.0),
                descriptor("gps", 24876, "GPS BIIR-2 (PRN 13)", OrbitClass::Navigation, "#96ceb4", 12.0, 55.0, 0.13, PI * 1.5),
                descriptor("tiangong", 48274, "Tiangong", OrbitClass::CrewedStation, "#ffd93d", 6.4, 41.5, 1.0, PI * 0.25),
                descriptor("sentinel", 40697, "Sentinel-2A", OrbitClass::SunSynchronous, "#6c5ce7", 9.8, 98.6, 0.93, PI * 0.75),
            ],
        }
    }
}

impl SatelliteCatalog {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let catalog: SatelliteCatalog =
            serde_json::from_str(text).context("parsing satellite catalog JSON")?;
        let mut seen = std::collections::HashSet::new();
        for sat in &catalog.satellites {
            anyhow::ensure!(seen.insert(sat.norad), "duplicate NORAD id {} in catalog", sat.norad);
            anyhow::ensure!(
                sat.synthetic_radius.is_finite() && sat.synthetic_radius > 0.0,
                "satellite {} has a non-positive synthetic radius",
                sat.id
            );
            anyhow::ensure!(
                sat.rgb().is_some(),
                "satellite {} has colour {:?}, expected #rrggbb",
                sat.id,
                sat.color
            );
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn get(&self, norad: u32) -> Option<&SatelliteDescriptor> {
        self.satellites.iter().find(|s| s.norad == norad)
    }
}
