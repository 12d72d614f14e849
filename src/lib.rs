//! Slot Reel - multi-reel slot machine animation engine
//!
//! Core modules:
//! - `sim`: Deterministic reel simulation (state machines, stop scheduling, timeline)
//! - `layout`: Camera bounds, reel placement and debounced relayout
//! - `renderer`: WebGPU reel rendering and symbol strip composition
//! - `machine`: Engine + layout + renderer wired into one frame entry point
//! - `settings`: Engine configuration

pub mod error;
pub mod layout;
pub mod machine;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod symbols;

pub use error::{AssetError, ReelError};
pub use layout::{ReelLayout, ResizeDebouncer, Viewport};
pub use machine::SlotMachine;
pub use settings::ReelConfig;
pub use sim::{ReelEngine, ReelState, SpinEvent, SpinPhase, SpinRequest, SpinStatus, StopMode};
pub use symbols::Symbol;

use std::f64::consts::TAU;

/// Engine constants
pub mod consts {
    /// Snap distance for a normal stop (radians)
    pub const NORMAL_SNAP_THRESHOLD: f64 = 0.0025;
    /// Snap distance for a quick stop (radians)
    pub const QUICK_SNAP_THRESHOLD: f64 = 0.01;
    /// Full turns added past the current turn before a reel lands
    pub const EXTRA_STOP_TURNS: f64 = 2.0;
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f64 = 0.1;
    /// Reels supported by the GPU uniform array
    pub const MAX_REELS: usize = 16;
}

/// Wrap an unbounded angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Clamp a raw frame delta into a safe simulation step
#[inline]
pub fn clamp_frame_dt(dt: f64) -> f64 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    } else {
        0.0
    }
}
