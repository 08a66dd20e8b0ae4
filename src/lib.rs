//! Satellite orbit tracking core
//!
//! Turns two-line element sets into render-ready scene positions and orbit
//! paths, driven by a warped simulation clock. Everything runs as Bevy plugins
//! so a renderer can host the same tick loop.

pub mod config;
pub mod core;
pub mod error;
pub mod orbital;
pub mod satellite;
pub mod tle;

pub use config::{TrackerSettings, ViewConfig};
pub use error::{OrbitError, OrbitResult};
pub use orbital::OrbitalPlugin;
pub use satellite::SatellitePlugin;
pub use tle::TlePlugin;
