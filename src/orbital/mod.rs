//! Orbital mechanics module
//!
//! This module handles element-set propagation, orbit path sampling and
//! validation, synthetic fallback orbits, and the simulated clock.

use bevy::prelude::*;

use crate::config::ViewConfig;

pub mod elements;
pub mod fallback;
pub mod path;
pub mod propagation;
pub mod time;

pub use elements::{InclinationClass, OrbitRegime, OrbitalSummary};
pub use fallback::{SyntheticOrbit, circular_orbit_path, interpolate_along_path, position_at_angle};
pub use path::{OrbitPath, PathQuality, PathVerdict, sample_path, validate};
pub use propagation::{InertialState, OrbitalRecord, Propagate, check_inertial, minutes_since_epoch, propagate_checked};
pub use time::{
    PlaybackState, TimeController, TimeState, TimeStatus, advance_simulation_clock,
    apply_view_controls,
};

/// Plugin for orbital mechanics and time management
pub struct OrbitalPlugin;

impl Plugin for OrbitalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TimeController>()
            .init_resource::<ViewConfig>()
            .add_systems(
                Update,
                (apply_view_controls, advance_simulation_clock).chain(),
            );
    }
}
