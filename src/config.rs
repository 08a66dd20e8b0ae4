//! Runtime configuration resources
//!
//! `ViewConfig` is written by whatever drives the view (UI, CLI, tests) and is
//! only ever read by the tracking systems.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::coordinates::ScaleMode;

/// View-state inputs for the tracking pipeline
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub scale_mode: ScaleMode,
    /// Signed playback speed, clamped by the clock to [-5, 5].
    pub speed: f64,
    pub paused: bool,
    /// `Some` pins the clock to a chosen instant; going back to `None` resets to real time.
    pub custom_epoch: Option<DateTime<Utc>>,
    /// Bump to rebase the clock on the wall clock, whatever the other fields say.
    pub reset_generation: u32,
}

impl ViewConfig {
    /// Ask for a reset to real time on the next tick.
    pub fn request_reset(&mut self) {
        self.custom_epoch = None;
        self.reset_generation = self.reset_generation.wrapping_add(1);
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            scale_mode: ScaleMode::Stylized,
            speed: 1.0,
            paused: false,
            custom_epoch: None,
            reset_generation: 0,
        }
    }
}

/// Element-set refresh behaviour
#[derive(Resource, Clone, Debug)]
pub struct TrackerSettings {
    /// Seconds between element-set requests for the same satellite.
    pub refresh_interval_secs: f64,
    pub request_timeout_secs: u64,
    pub celestrak_base_url: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30.0,
            request_timeout_secs: 15,
            celestrak_base_url: "https://celestrak.org/NORAD/elements/gp.php".to_string(),
        }
    }
}
