//! Satellite management module
//!
//! This module holds the satellite catalog, the per-satellite tracking
//! sessions, and the systems that keep their positions current.

use bevy::prelude::*;

use crate::config::ViewConfig;
use crate::orbital::time::advance_simulation_clock;
use crate::tle::systems::process_fetch_results_system;

pub mod catalog;
pub mod resources;
pub mod session;
pub mod systems;

pub use catalog::{OrbitClass, SatelliteCatalog, SatelliteDescriptor};
pub use resources::SatelliteStore;
pub use session::{LivePosition, OrbitState, PositionSource, TrackingSession};
pub use systems::{propagate_satellites_system, sync_scale_mode_system, track_catalog_system};

/// Plugin for satellite management and propagation
pub struct SatellitePlugin;

impl Plugin for SatellitePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SatelliteStore>()
            .init_resource::<SatelliteCatalog>()
            .init_resource::<ViewConfig>()
            .add_systems(Startup, track_catalog_system)
            .add_systems(
                Update,
                (
                    sync_scale_mode_system.after(process_fetch_results_system),
                    propagate_satellites_system
                        .after(sync_scale_mode_system)
                        .after(advance_simulation_clock),
                ),
            );
    }
}
