use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use orbitview::core::ScaleMode;
use orbitview::orbital::TimeController;
use orbitview::satellite::{SatelliteCatalog, SatelliteStore};
use orbitview::tle::mock_data::bundled_epoch;
use orbitview::{OrbitalPlugin, SatellitePlugin, TlePlugin, ViewConfig};

/// Seconds between status lines.
const STATUS_INTERVAL_SECS: f64 = 5.0;

struct Args {
    offline: bool,
    catalog: Option<PathBuf>,
    view: ViewConfig,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        offline: false,
        catalog: None,
        view: ViewConfig::default(),
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--offline" => args.offline = true,
            "--true-scale" => args.view.scale_mode = ScaleMode::True,
            "--paused" => args.view.paused = true,
            "--catalog" => {
                let path = it.next().ok_or_else(|| anyhow::anyhow!("--catalog needs a path"))?;
                args.catalog = Some(PathBuf::from(path));
            }
            "--speed" => {
                let value = it.next().ok_or_else(|| anyhow::anyhow!("--speed needs a value"))?;
                args.view.speed = value.parse()?;
            }
            other => anyhow::bail!(
                "unknown argument {:?} (expected --offline, --true-scale, --paused, --catalog PATH, --speed N)",
                other
            ),
        }
    }
    Ok(args)
}

fn log_status(
    time: Res<Time>,
    clock: Res<TimeController>,
    store: Res<SatelliteStore>,
    mut next_at: Local<f64>,
) {
    let now = time.elapsed_secs_f64();
    if now < *next_at {
        return;
    }
    *next_at = now + STATUS_INTERVAL_SECS;

    info!(
        "[CLOCK] {} sim={}",
        clock.status(),
        clock.simulated_time().format("%Y-%m-%d %H:%M:%S UTC")
    );
    for session in store.iter_sorted() {
        let Some(live) = session.live_position() else {
            continue;
        };
        let (lat, lon) = live.lat_lon();
        info!(
            "[ORBIT] {:<10} {:<13} {:?} scene=({:.2}, {:.2}, {:.2}) lat={:.2} lon={:.2} path_rev={}",
            session.descriptor().id,
            session.state().label(),
            live.source,
            live.point.x,
            live.point.y,
            live.point.z,
            lat,
            lon,
            session.path_revision()
        );
    }
}

fn main() -> anyhow::Result<()> {
    let mut args = parse_args()?;
    if args.offline && args.view.custom_epoch.is_none() {
        // Bundled element sets are only accurate near their own epoch.
        args.view.custom_epoch = bundled_epoch();
    }
    let catalog = match &args.catalog {
        Some(path) => SatelliteCatalog::load(path)?,
        None => SatelliteCatalog::default(),
    };
    let tle_plugin = if args.offline {
        TlePlugin::offline()
    } else {
        TlePlugin::default()
    };

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 30.0,
        ))),
        LogPlugin::default(),
    ))
    .insert_resource(args.view)
    .insert_resource(catalog)
    .add_plugins((OrbitalPlugin, tle_plugin, SatellitePlugin))
    .add_systems(Update, log_status);

    app.run();
    Ok(())
}
