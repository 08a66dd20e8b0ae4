//! TLE processing systems

use bevy::prelude::*;
use chrono::Utc;

use crate::config::TrackerSettings;
use crate::satellite::resources::SatelliteStore;
use crate::tle::types::{FetchChannels, FetchCommand, FetchResultMsg};

/// System to request element sets that are due and forward cancellations
pub fn schedule_fetches_system(
    time: Res<Time>,
    settings: Res<TrackerSettings>,
    mut store: ResMut<SatelliteStore>,
    fetch: Option<Res<FetchChannels>>,
) {
    let Some(fetch) = fetch else { return };
    let SatelliteStore {
        sessions,
        cancelled,
        next_request_id,
    } = &mut *store;

    for norad in cancelled.drain(..) {
        let _ = fetch.cmd_tx.send(FetchCommand::Cancel(norad));
    }

    let now = time.elapsed_secs_f64();
    for (norad, session) in sessions.iter_mut() {
        if session.pending_request.is_some() || now < session.next_fetch_at {
            continue;
        }
        *next_request_id += 1;
        let request_id = *next_request_id;
        session.next_fetch_at = now + settings.refresh_interval_secs;
        match fetch.cmd_tx.send(FetchCommand::Fetch {
            norad: *norad,
            request_id,
        }) {
            Ok(()) => {
                session.pending_request = Some(request_id);
                debug!("[TLE FETCH] queued norad={} request={}", norad, request_id);
            }
            Err(_) => warn!("[TLE FETCH] worker unavailable, norad={} not queued", norad),
        }
    }
}

/// System to drain fetch results into the tracking sessions
pub fn process_fetch_results_system(
    mut store: ResMut<SatelliteStore>,
    fetch: Option<Res<FetchChannels>>,
) {
    let Some(fetch) = fetch else { return };
    let Ok(guard) = fetch.res_rx.lock() else {
        return;
    };
    while let Ok(msg) = guard.try_recv() {
        let norad = msg.norad();
        let Some(session) = store.sessions.get_mut(&norad) else {
            debug!("[TLE DISPATCH] dropping result for untracked norad={}", norad);
            continue;
        };
        if session.pending_request != Some(msg.request_id()) {
            debug!(
                "[TLE DISPATCH] dropping stale result norad={} request={}",
                norad,
                msg.request_id()
            );
            continue;
        }
        session.pending_request = None;
        match msg {
            FetchResultMsg::Success { set, .. } => {
                // Paths start at the wall clock; live positions follow the simulated one.
                if let Err(e) = session.install_element_set(&set, Utc::now()) {
                    warn!("[TLE DISPATCH] norad={}: {}", norad, e);
                }
            }
            FetchResultMsg::Failure { error, .. } => {
                warn!("[TLE DISPATCH] received FAILURE for norad={}: {}", norad, error);
                session.on_fetch_failed(error);
            }
        }
    }
}
