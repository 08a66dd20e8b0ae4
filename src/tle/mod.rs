//! TLE (Two-Line Element) data management module
//!
//! This module handles TLE fetching, parsing, and data structures for satellite
//! orbital elements from external sources like Celestrak.

use bevy::prelude::*;

use crate::config::TrackerSettings;

pub mod fetcher;
pub mod mock_data;
pub mod parser;
pub mod source;
pub mod systems;
pub mod types;

pub use fetcher::start_tle_worker;
pub use parser::{extract_tle_block, parse_element_set, parse_tle_epoch_to_utc};
pub use source::{CelestrakSource, ElementSetSource, StaticSource};
pub use systems::{process_fetch_results_system, schedule_fetches_system};
pub use types::{ElementSet, FetchChannels, FetchCommand, FetchResultMsg};

/// Where the worker gets element sets from
#[derive(Clone, Debug, Default)]
pub enum SourceKind {
    #[default]
    Celestrak,
    Static(StaticSource),
}

/// Plugin for TLE data management and processing
#[derive(Default)]
pub struct TlePlugin {
    pub source: SourceKind,
}

impl TlePlugin {
    /// Serve the bundled element sets without touching the network.
    pub fn offline() -> Self {
        Self {
            source: SourceKind::Static(StaticSource::bundled()),
        }
    }
}

impl Plugin for TlePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackerSettings>();
        let settings = app.world().resource::<TrackerSettings>().clone();

        let channels = match &self.source {
            SourceKind::Celestrak => match CelestrakSource::new(&settings) {
                Ok(source) => start_tle_worker(source),
                Err(e) => {
                    error!("[INIT] Celestrak source unavailable, orbits stay synthetic: {:#}", e);
                    start_tle_worker(StaticSource::default())
                }
            },
            SourceKind::Static(source) => {
                if source.is_empty() {
                    warn!("[INIT] static source has no element sets, orbits stay synthetic");
                } else {
                    info!("[INIT] serving {} bundled element sets", source.len());
                }
                start_tle_worker(source.clone())
            }
        };

        app.insert_resource(channels).add_systems(
            Update,
            (schedule_fetches_system, process_fetch_results_system).chain(),
        );
    }
}
