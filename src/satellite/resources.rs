//! Satellite resources for managing satellite data

use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::coordinates::ScaleMode;
use crate::satellite::catalog::SatelliteDescriptor;
use crate::satellite::session::TrackingSession;

/// Resource for storing per-satellite tracking sessions
#[derive(Resource, Default)]
pub struct SatelliteStore {
    pub sessions: HashMap<u32, TrackingSession>,
    /// Satellites dropped since the last scheduling pass.
    pub cancelled: Vec<u32>,
    pub next_request_id: u64,
}

impl SatelliteStore {
    /// Start tracking a satellite. Returns false if it is already tracked.
    pub fn track(&mut self, descriptor: SatelliteDescriptor, mode: ScaleMode) -> bool {
        if self.sessions.contains_key(&descriptor.norad) {
            return false;
        }
        let norad = descriptor.norad;
        self.cancelled.retain(|n| *n != norad);
        self.sessions.insert(norad, TrackingSession::new(descriptor, mode));
        true
    }

    /// Stop tracking; any in-flight fetch result for it is discarded.
    pub fn untrack(&mut self, norad: u32) -> Option<TrackingSession> {
        let removed = self.sessions.remove(&norad);
        if removed.is_some() {
            self.cancelled.push(norad);
        }
        removed
    }

    pub fn get(&self, norad: u32) -> Option<&TrackingSession> {
        self.sessions.get(&norad)
    }

    /// Sessions in NORAD order.
    pub fn iter_sorted(&self) -> Vec<&TrackingSession> {
        let mut sessions: Vec<_> = self.sessions.values().collect();
        sessions.sort_by_key(|s| s.descriptor().norad);
        sessions
    }
}
