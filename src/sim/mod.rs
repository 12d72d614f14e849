//! Deterministic reel simulation
//!
//! Everything that decides where a reel is lives here:
//! - No rendering or platform dependencies
//! - Time only advances through `update(dt)`
//! - Deferred actions run on the same timeline as frames

pub mod engine;
pub mod outcome;
pub mod reel;
pub mod segment;
pub mod timer;

pub use engine::{OnComplete, ReelEngine, SpinEvent, SpinRequest, SpinStatus};
pub use outcome::{OutcomeProvider, SeededOutcome, stop_indexes};
pub use reel::{ReelState, SpinPhase, StopMode};
pub use segment::{angle_for, angles_for, segment_at, segment_step};
pub use timer::{TaskHandle, Timeline};
