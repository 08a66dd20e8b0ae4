//! TLE fetching functionality

use bevy::log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use tokio::task::JoinHandle;

use crate::tle::source::ElementSetSource;
use crate::tle::types::{FetchChannels, FetchCommand, FetchResultMsg};

/// Start the background TLE worker thread
///
/// Each fetch runs as its own task so a slow satellite never delays another.
/// The worker exits when the command sender is dropped.
pub fn start_tle_worker<S: ElementSetSource>(source: S) -> FetchChannels {
    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<FetchCommand>();
    let (res_tx, res_rx) = mpsc::channel::<FetchResultMsg>();
    let source = Arc::new(source);

    let spawned = thread::Builder::new()
        .name("tle-worker".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("[TLE FETCH] tokio runtime failed to start: {}", e);
                    return;
                }
            };
            rt.block_on(async move {
                let mut in_flight: HashMap<u32, JoinHandle<()>> = HashMap::new();
                while let Some(cmd) = cmd_rx.recv().await {
                    in_flight.retain(|_, handle| !handle.is_finished());
                    match cmd {
                        FetchCommand::Fetch { norad, request_id } => {
                            if let Some(previous) = in_flight.remove(&norad) {
                                previous.abort();
                            }
                            let source = Arc::clone(&source);
                            let res_tx = res_tx.clone();
                            let handle = tokio::spawn(async move {
                                let msg = match source.fetch_element_set(norad).await {
                                    Ok(set) => {
                                        debug!(
                                            "[TLE RESULT] norad={} SUCCESS epoch={}",
                                            norad,
                                            set.epoch_utc.to_rfc3339()
                                        );
                                        FetchResultMsg::Success {
                                            norad,
                                            request_id,
                                            set,
                                        }
                                    }
                                    Err(error) => {
                                        warn!("[TLE RESULT] norad={} FAILURE: {}", norad, error);
                                        FetchResultMsg::Failure {
                                            norad,
                                            request_id,
                                            error,
                                        }
                                    }
                                };
                                // Receiver gone means the app is shutting down.
                                let _ = res_tx.send(msg);
                            });
                            in_flight.insert(norad, handle);
                        }
                        FetchCommand::Cancel(norad) => {
                            if let Some(handle) = in_flight.remove(&norad) {
                                handle.abort();
                                debug!("[TLE FETCH] cancelled in-flight request for norad={}", norad);
                            }
                        }
                    }
                }
                for (_, handle) in in_flight.drain() {
                    handle.abort();
                }
            });
        });

    match spawned {
        Ok(_) => info!("[INIT] TLE worker started"),
        Err(e) => error!("[INIT] TLE worker thread failed to spawn: {}", e),
    }

    FetchChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}
