//! Time management for orbital mechanics
//!
//! The simulated clock is `epoch + accumulated_warp * ACCELERATION_FACTOR`
//! seconds. Speed changes only affect how fast warp accumulates, so the clock
//! never jumps when the user changes speed or direction.

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::config::ViewConfig;

/// Simulated seconds per warp-second.
pub const ACCELERATION_FACTOR: f64 = 60.0;
pub const MAX_SPEED: f64 = 5.0;
pub const SPEED_STEP: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    PlayingForward,
    PlayingBackward,
    Paused,
}

/// Snapshot of the controller for consumers of the clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeState {
    pub simulated_time: DateTime<Utc>,
    pub speed: f64,
    pub paused: bool,
    pub custom_epoch: bool,
    pub accumulated_warp: f64,
}

/// Display-ready clock status
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStatus {
    pub playback: PlaybackState,
    /// Magnitude of the speed factor; direction is carried by `playback`.
    pub speed: f64,
    pub custom_epoch: bool,
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.playback {
            PlaybackState::Paused => write!(f, "Paused")?,
            PlaybackState::PlayingForward => write!(f, "Forward {:.1}x", self.speed)?,
            PlaybackState::PlayingBackward => write!(f, "Reverse {:.1}x", self.speed)?,
        }
        if self.custom_epoch {
            write!(f, " (custom epoch)")?;
        }
        Ok(())
    }
}

/// Simulated clock driving every propagation call
#[derive(Resource, Clone, Debug)]
pub struct TimeController {
    epoch: DateTime<Utc>,
    accumulated_warp: f64,
    speed: f64,
    paused: bool,
    custom_epoch: bool,
    simulated_time: DateTime<Utc>,
}

impl Default for TimeController {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl TimeController {
    /// Real-time clock anchored at `epoch`.
    pub fn starting_at(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            accumulated_warp: 0.0,
            speed: 1.0,
            paused: false,
            custom_epoch: false,
            simulated_time: epoch,
        }
    }

    /// Advance warp by `real_elapsed_secs * speed` and recompute the clock.
    pub fn tick(&mut self, real_elapsed_secs: f64) {
        if real_elapsed_secs.is_finite() && real_elapsed_secs > 0.0 && !self.is_stopped() {
            self.accumulated_warp += real_elapsed_secs * self.speed;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let micros = (self.accumulated_warp * ACCELERATION_FACTOR * 1.0e6).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return;
        }
        if let Some(t) = self
            .epoch
            .checked_add_signed(Duration::microseconds(micros as i64))
        {
            self.simulated_time = t;
        }
    }

    fn is_stopped(&self) -> bool {
        self.paused || self.speed == 0.0
    }

    /// Effective simulated instant for this tick.
    pub fn simulated_time(&self) -> DateTime<Utc> {
        self.simulated_time
    }

    /// Warp-seconds accumulated since the current epoch.
    pub fn accumulated_warp(&self) -> f64 {
        self.accumulated_warp
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_custom_epoch(&self) -> bool {
        self.custom_epoch
    }

    /// Set the signed speed factor, clamped to [-5, 5]. Non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            return;
        }
        self.speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn step_forward(&mut self) {
        let next = if self.speed >= 0.0 {
            (self.speed + SPEED_STEP).min(MAX_SPEED)
        } else {
            1.0
        };
        self.set_speed(next);
    }

    pub fn step_backward(&mut self) {
        let next = if self.speed <= 0.0 {
            (self.speed - SPEED_STEP).max(-MAX_SPEED)
        } else {
            -1.0
        };
        self.set_speed(next);
    }

    /// Rebase on a user-chosen instant.
    pub fn set_custom_epoch(&mut self, epoch: DateTime<Utc>) {
        self.epoch = epoch;
        self.accumulated_warp = 0.0;
        self.custom_epoch = true;
        self.recompute();
    }

    /// Rebase on the wall clock.
    pub fn reset_to_real_time(&mut self) {
        self.reset_to_real_time_at(Utc::now());
    }

    pub fn reset_to_real_time_at(&mut self, now: DateTime<Utc>) {
        self.epoch = now;
        self.accumulated_warp = 0.0;
        self.custom_epoch = false;
        self.recompute();
    }

    pub fn state(&self) -> TimeState {
        TimeState {
            simulated_time: self.simulated_time,
            speed: self.speed,
            paused: self.paused,
            custom_epoch: self.custom_epoch,
            accumulated_warp: self.accumulated_warp,
        }
    }

    pub fn status(&self) -> TimeStatus {
        let playback = if self.is_stopped() {
            PlaybackState::Paused
        } else if self.speed > 0.0 {
            PlaybackState::PlayingForward
        } else {
            PlaybackState::PlayingBackward
        };
        TimeStatus {
            playback,
            speed: self.speed.abs(),
            custom_epoch: self.custom_epoch,
        }
    }
}

/// System to advance simulation UTC by scale
pub fn advance_simulation_clock(time: Res<Time>, mut clock: ResMut<TimeController>) {
    clock.tick(time.delta_secs_f64());
}

/// Apply clock fields of `ViewConfig` that changed since the last frame.
pub fn apply_view_controls(
    view: Res<ViewConfig>,
    mut clock: ResMut<TimeController>,
    mut last: Local<Option<ViewConfig>>,
) {
    let previous = last.take();
    let previous = previous.as_ref();

    if previous.map(|p| p.speed) != Some(view.speed) {
        clock.set_speed(view.speed);
        debug!("[CLOCK] speed -> {:.1}", clock.speed());
    }
    if previous.map(|p| p.paused) != Some(view.paused) {
        if view.paused {
            clock.pause();
        } else {
            clock.resume();
        }
    }
    let reset_requested = previous.is_some_and(|p| p.reset_generation != view.reset_generation);
    if reset_requested {
        clock.reset_to_real_time();
        info!("[CLOCK] reset to real time");
    } else if previous.map(|p| p.custom_epoch) != Some(view.custom_epoch) {
        match view.custom_epoch {
            Some(epoch) => {
                clock.set_custom_epoch(epoch);
                info!("[CLOCK] custom epoch {}", epoch.to_rfc3339());
            }
            None if previous.is_some() => {
                clock.reset_to_real_time();
                info!("[CLOCK] back to real time");
            }
            None => {}
        }
    }

    *last = Some(view.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 13, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_simulation_time_default() {
        let clock = TimeController::default();
        assert_eq!(clock.speed(), 1.0);
        assert!(!clock.is_paused());
        assert!(clock.simulated_time().timestamp() > 0);
    }

    #[test]
    fn test_tick_applies_acceleration() {
        let mut clock = TimeController::starting_at(epoch());
        clock.tick(1.0);
        assert_eq!(clock.simulated_time(), epoch() + Duration::seconds(60));
    }

    #[test]
    fn test_speed_changes_are_path_independent() {
        let mut stepped = TimeController::starting_at(epoch());
        stepped.tick(10.0);
        stepped.set_speed(3.0);
        stepped.tick(5.0);
        stepped.set_speed(2.0);
        stepped.tick(5.0);

        let mut steady = TimeController::starting_at(epoch());
        steady.tick(35.0);

        assert!((stepped.accumulated_warp() - 35.0).abs() < 1e-12);
        assert_eq!(stepped.simulated_time(), steady.simulated_time());
    }

    #[test]
    fn test_reversal_symmetry() {
        let mut clock = TimeController::starting_at(epoch());
        clock.set_speed(2.5);
        for _ in 0..10 {
            clock.tick(0.1);
        }
        clock.set_speed(-2.5);
        for _ in 0..10 {
            clock.tick(0.1);
        }
        assert!(clock.accumulated_warp().abs() < 1e-9);
        let drift = (clock.simulated_time() - epoch()).num_microseconds().unwrap();
        assert!(drift.abs() <= 1, "drift {} us", drift);
    }

    #[test]
    fn test_pause_holds_warp() {
        let mut clock = TimeController::starting_at(epoch());
        clock.tick(2.0);
        let before = clock.state();
        clock.pause();
        clock.tick(100.0);
        assert_eq!(clock.accumulated_warp(), before.accumulated_warp);
        assert_eq!(clock.simulated_time(), before.simulated_time);
        assert_eq!(clock.status().playback, PlaybackState::Paused);

        clock.resume();
        clock.tick(1.0);
        assert!((clock.accumulated_warp() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_speed_is_paused() {
        let mut clock = TimeController::starting_at(epoch());
        clock.set_speed(0.0);
        clock.tick(5.0);
        assert_eq!(clock.accumulated_warp(), 0.0);
        assert_eq!(clock.status().playback, PlaybackState::Paused);
    }

    #[test]
    fn test_tick_is_idempotent_for_zero_elapsed() {
        let mut clock = TimeController::starting_at(epoch());
        clock.tick(1.5);
        let t = clock.simulated_time();
        clock.tick(0.0);
        clock.tick(0.0);
        assert_eq!(clock.simulated_time(), t);
    }

    #[test]
    fn test_speed_is_clamped_and_non_finite_ignored() {
        let mut clock = TimeController::starting_at(epoch());
        clock.set_speed(12.0);
        assert_eq!(clock.speed(), 5.0);
        clock.set_speed(-9.0);
        assert_eq!(clock.speed(), -5.0);
        clock.set_speed(f64::NAN);
        assert_eq!(clock.speed(), -5.0);
        clock.tick(f64::INFINITY);
        assert_eq!(clock.accumulated_warp(), 0.0);
    }

    #[test]
    fn test_step_controls() {
        let mut clock = TimeController::starting_at(epoch());
        clock.step_forward();
        assert_eq!(clock.speed(), 1.5);
        for _ in 0..10 {
            clock.step_forward();
        }
        assert_eq!(clock.speed(), 5.0);

        clock.step_backward();
        assert_eq!(clock.speed(), -1.0);
        clock.step_backward();
        assert_eq!(clock.speed(), -1.5);
        clock.step_forward();
        assert_eq!(clock.speed(), 1.0);

        clock.set_speed(0.0);
        clock.step_backward();
        assert_eq!(clock.speed(), -0.5);
    }

    #[test]
    fn test_custom_epoch_and_reset() {
        let mut clock = TimeController::starting_at(epoch());
        clock.tick(10.0);

        let custom = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        clock.set_custom_epoch(custom);
        assert_eq!(clock.accumulated_warp(), 0.0);
        assert!(clock.has_custom_epoch());
        assert_eq!(clock.simulated_time(), custom);

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        clock.reset_to_real_time_at(now);
        assert_eq!(clock.accumulated_warp(), 0.0);
        assert!(!clock.has_custom_epoch());
        clock.tick(0.0);
        assert_eq!(clock.simulated_time(), now);
    }

    #[test]
    fn test_reset_to_real_time_tracks_wall_clock() {
        let mut clock = TimeController::starting_at(epoch());
        clock.tick(1000.0);
        clock.reset_to_real_time();
        clock.tick(0.0);
        let lag = (Utc::now() - clock.simulated_time()).num_seconds();
        assert!((0..5).contains(&lag));
    }

    #[test]
    fn test_status_display() {
        let mut clock = TimeController::starting_at(epoch());
        clock.set_speed(-2.0);
        let status = clock.status();
        assert_eq!(status.playback, PlaybackState::PlayingBackward);
        assert_eq!(status.speed, 2.0);
        assert_eq!(status.to_string(), "Reverse 2.0x");

        clock.set_custom_epoch(epoch());
        clock.set_speed(1.0);
        assert_eq!(clock.status().to_string(), "Forward 1.0x (custom epoch)");
    }

    fn clock_app(view: ViewConfig) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(TimeController::starting_at(epoch()))
            .insert_resource(view)
            .add_systems(Update, (apply_view_controls, advance_simulation_clock).chain());
        app
    }

    #[test]
    fn test_clock_systems_follow_view_config() {
        let mut app = clock_app(ViewConfig {
            speed: 2.0,
            ..default()
        });
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs(3));
        app.update();

        let clock = app.world().resource::<TimeController>();
        assert!((clock.accumulated_warp() - 6.0).abs() < 1e-9);
        assert_eq!(clock.simulated_time(), epoch() + Duration::seconds(360));

        let custom = Utc.with_ymd_and_hms(2031, 3, 1, 0, 0, 0).unwrap();
        {
            let mut view = app.world_mut().resource_mut::<ViewConfig>();
            view.paused = true;
            view.custom_epoch = Some(custom);
        }
        app.update();

        let clock = app.world().resource::<TimeController>();
        assert!(clock.is_paused());
        assert!(clock.has_custom_epoch());
        assert_eq!(clock.simulated_time(), custom);

        app.world_mut().resource_mut::<ViewConfig>().custom_epoch = None;
        app.update();
        let clock = app.world().resource::<TimeController>();
        assert!(!clock.has_custom_epoch());
    }

    #[test]
    fn test_reset_request_rebases_while_in_real_time() {
        let mut app = clock_app(ViewConfig {
            speed: 5.0,
            ..default()
        });
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs(10));
        app.update();
        assert!(app.world().resource::<TimeController>().accumulated_warp() > 0.0);

        // No custom epoch is involved, only the reset counter moves.
        app.world_mut().resource_mut::<ViewConfig>().request_reset();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::ZERO);
        app.update();

        let clock = app.world().resource::<TimeController>();
        assert_eq!(clock.accumulated_warp(), 0.0);
        assert!(!clock.has_custom_epoch());
        assert_eq!(clock.speed(), 5.0);
        let lag = (Utc::now() - clock.simulated_time()).num_seconds();
        assert!((0..5).contains(&lag));

        // An unchanged counter does not reset again.
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs(1));
        app.update();
        assert!(app.world().resource::<TimeController>().accumulated_warp() > 0.0);
    }
}
