//! Satellite systems for propagation and position updates

use bevy::prelude::*;
use chrono::Utc;

use crate::config::ViewConfig;
use crate::orbital::time::TimeController;
use crate::satellite::catalog::SatelliteCatalog;
use crate::satellite::resources::SatelliteStore;

/// Startup system: open a session for every catalog entry
pub fn track_catalog_system(
    catalog: Res<SatelliteCatalog>,
    view: Res<ViewConfig>,
    mut store: ResMut<SatelliteStore>,
) {
    for descriptor in &catalog.satellites {
        if store.track(descriptor.clone(), view.scale_mode) {
            info!("[INIT] tracking {} (NORAD {})", descriptor.name, descriptor.norad);
        }
    }
}

/// System to resample paths when the scale mode changes
pub fn sync_scale_mode_system(view: Res<ViewConfig>, mut store: ResMut<SatelliteStore>) {
    if !view.is_changed() {
        return;
    }
    let now = Utc::now();
    for session in store.sessions.values_mut() {
        if session.scale_mode() != view.scale_mode {
            session.set_scale_mode(view.scale_mode, now);
        }
    }
}

/// System to propagate satellites for the current simulated instant
pub fn propagate_satellites_system(clock: Res<TimeController>, mut store: ResMut<SatelliteStore>) {
    for session in store.sessions.values_mut() {
        session.update_position(&clock);
    }
}
