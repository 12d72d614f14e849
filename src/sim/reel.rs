//! Per-reel state machine
//!
//! A reel spins at constant speed until the stop scheduler hands it a
//! target, then eases out toward that target and snaps onto it.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::consts::{EXTRA_STOP_TURNS, NORMAL_SNAP_THRESHOLD, QUICK_SNAP_THRESHOLD};

/// Phase of a single reel, and of the engine as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    /// Idle, showing a settled segment
    #[default]
    Rest,
    /// Constant-speed spin, no target yet
    Spinning,
    /// Orderly ease-out toward the target
    Stopping,
    /// Forced ease-out: tighter curve, looser snap
    QuickStopping,
}

/// Which stop sequence is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopMode {
    Normal,
    Quick,
}

impl StopMode {
    pub fn phase(self) -> SpinPhase {
        match self {
            StopMode::Normal => SpinPhase::Stopping,
            StopMode::Quick => SpinPhase::QuickStopping,
        }
    }

    /// Remaining distance below which the reel snaps onto its target
    pub fn snap_threshold(self) -> f64 {
        match self {
            StopMode::Normal => NORMAL_SNAP_THRESHOLD,
            StopMode::Quick => QUICK_SNAP_THRESHOLD,
        }
    }
}

/// One reel's motion state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelState {
    /// Rotation (radians, unbounded)
    angle: f64,
    /// Spin speed (radians/second)
    speed: f64,
    /// Landing angle, set only while stopping
    target: Option<f64>,
    phase: SpinPhase,
}

impl ReelState {
    pub fn new(angle: f64, speed: f64) -> Self {
        Self {
            angle,
            speed,
            target: None,
            phase: SpinPhase::Rest,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_rest(&self) -> bool {
        self.phase == SpinPhase::Rest
    }

    /// Place the reel at an angle while idle
    pub(crate) fn set_rest_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.target = None;
        self.phase = SpinPhase::Rest;
    }

    /// Start spinning at `speed`
    pub(crate) fn start(&mut self, speed: f64) {
        self.speed = speed;
        self.target = None;
        self.phase = SpinPhase::Spinning;
    }

    /// Hand the reel its landing angle. `base_angle` is the segment's angle
    /// in [0, 2π); the reel keeps turning forward at least two more turns.
    pub(crate) fn assign_stop(&mut self, base_angle: f64, mode: StopMode) -> f64 {
        let turns = (self.angle / TAU).floor() + EXTRA_STOP_TURNS;
        let target = base_angle + turns * TAU;
        self.target = Some(target);
        self.phase = mode.phase();
        target
    }

    /// Advance one frame. Returns true on the frame the reel comes to rest.
    ///
    /// `normal_smoothness` and `quick_smoothness` scale how far from the
    /// target the reel starts slowing down, in full turns.
    pub fn advance(&mut self, dt: f64, normal_smoothness: f64, quick_smoothness: f64) -> bool {
        let mode = match self.phase {
            SpinPhase::Rest => return false,
            SpinPhase::Spinning => {
                self.angle += self.speed * dt;
                return false;
            }
            SpinPhase::Stopping => StopMode::Normal,
            SpinPhase::QuickStopping => StopMode::Quick,
        };

        let Some(target) = self.target else {
            return false;
        };

        let diff = target - self.angle;
        let distance = diff.abs();
        if distance < mode.snap_threshold() {
            self.land(target);
            return true;
        }

        let smoothness = match mode {
            StopMode::Normal => normal_smoothness,
            StopMode::Quick => quick_smoothness,
        };
        let decel = (distance / (smoothness * TAU)).min(1.0);
        let step = self.speed * decel * dt;

        if step >= distance {
            self.land(target);
            return true;
        }

        self.angle += diff.signum() * step;
        false
    }

    fn land(&mut self, target: f64) {
        self.angle = target;
        self.phase = SpinPhase::Rest;
    }
}
