//! TLE data types and communication structures

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, mpsc::Receiver};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::OrbitError;

/// Raw element set as delivered by a source
#[derive(Clone, Debug, PartialEq)]
pub struct ElementSet {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
    pub epoch_utc: DateTime<Utc>,
}

/// Commands for the TLE fetcher worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCommand {
    Fetch { norad: u32, request_id: u64 },
    /// Abort any in-flight request for this satellite.
    Cancel(u32),
}

/// Results from the TLE fetcher worker thread
#[derive(Debug)]
pub enum FetchResultMsg {
    Success {
        norad: u32,
        request_id: u64,
        set: ElementSet,
    },
    Failure {
        norad: u32,
        request_id: u64,
        error: OrbitError,
    },
}

impl FetchResultMsg {
    pub fn norad(&self) -> u32 {
        match self {
            FetchResultMsg::Success { norad, .. } | FetchResultMsg::Failure { norad, .. } => *norad,
        }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            FetchResultMsg::Success { request_id, .. }
            | FetchResultMsg::Failure { request_id, .. } => *request_id,
        }
    }
}

/// Resource containing channels for communicating with the TLE worker thread
#[derive(Resource)]
pub struct FetchChannels {
    pub cmd_tx: UnboundedSender<FetchCommand>,
    pub res_rx: Arc<Mutex<Receiver<FetchResultMsg>>>,
}
