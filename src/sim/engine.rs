//! Spin controller and stop scheduler
//!
//! The engine is the single owner of every reel's state. Callers drive it
//! through `begin_spin`, `force_stop` and one `update(dt)` per frame; the
//! renderer only ever sees `reels()` as a read-only slice.

use std::fmt;
use std::time::Duration;

use super::reel::{ReelState, SpinPhase, StopMode};
use super::segment::{angle_for, angles_for, segment_at};
use super::timer::{TaskHandle, Timeline};
use crate::clamp_frame_dt;
use crate::error::ReelError;
use crate::settings::ReelConfig;

/// Completion callback, fired once when every reel has settled
pub type OnComplete = Box<dyn FnOnce()>;

/// A request to spin every reel and land on the given segments
pub struct SpinRequest {
    /// 1-indexed stop segment per reel
    pub stops: Vec<u32>,
    on_complete: Option<OnComplete>,
}

impl SpinRequest {
    pub fn new(stops: Vec<u32>) -> Self {
        Self {
            stops,
            on_complete: None,
        }
    }

    pub fn with_callback(stops: Vec<u32>, on_complete: impl FnOnce() + 'static) -> Self {
        Self {
            stops,
            on_complete: Some(Box::new(on_complete)),
        }
    }
}

impl fmt::Debug for SpinRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinRequest")
            .field("stops", &self.stops)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Result of `begin_spin` when the request itself was well formed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStatus {
    Accepted,
    /// A spin is already running; nothing changed
    Busy,
}

/// Lifecycle notifications, drained by the host once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    SpinStarted { stops: Vec<u32> },
    StopScheduled { mode: StopMode },
    ReelStopped { reel: usize, segment: u32 },
    SpinCompleted { stops: Vec<u32> },
}

/// Deferred engine actions
#[derive(Debug, Clone, Copy, PartialEq)]
enum EngineTask {
    /// Spin time elapsed; begin the normal stop sequence
    BeginStop,
    /// Hand one reel its landing angle
    AssignStop { reel: usize, mode: StopMode },
}

/// The spin currently in flight
struct ActiveSpin {
    stops: Vec<u32>,
    /// Segment angles in [0, 2π), validated on acceptance
    landing: Vec<f64>,
    on_complete: Option<OnComplete>,
}

/// Reel animation engine
pub struct ReelEngine {
    config: ReelConfig,
    reels: Vec<ReelState>,
    phase: SpinPhase,
    active: Option<ActiveSpin>,
    timeline: Timeline<EngineTask>,
    /// Pending normal-stop kickoff, cancelled by a forced stop
    stop_timer: Option<TaskHandle>,
    /// Pending per-reel stop assignments
    stagger_tasks: Vec<TaskHandle>,
    events: Vec<SpinEvent>,
}

impl ReelEngine {
    pub fn new(config: ReelConfig) -> Result<Self, ReelError> {
        config.validate()?;

        let speed = config.base_spin_speed;
        let mut engine = Self {
            reels: (0..config.reel_count)
                .map(|_| ReelState::new(0.0, speed))
                .collect(),
            config,
            phase: SpinPhase::Rest,
            active: None,
            timeline: Timeline::new(),
            stop_timer: None,
            stagger_tasks: Vec::new(),
            events: Vec::new(),
        };

        if let Some(initial) = engine.config.initial_segments.clone() {
            if initial.len() == engine.config.reel_count {
                engine.set_segments(&initial)?;
            } else {
                log::warn!(
                    "Ignoring {} initial segments for {} reels",
                    initial.len(),
                    engine.config.reel_count
                );
            }
        }

        Ok(engine)
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    /// Read-only view of every reel
    pub fn reels(&self) -> &[ReelState] {
        &self.reels
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SpinPhase::Rest
    }

    /// Segment currently under the stop marker on each reel
    pub fn visible_segments(&self) -> Vec<u32> {
        self.reels
            .iter()
            .map(|r| segment_at(r.angle(), self.config.symbols_per_reel))
            .collect()
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        std::mem::take(&mut self.events)
    }

    /// Show the given segments without spinning. Ignored unless idle.
    pub fn set_segments(&mut self, segments: &[u32]) -> Result<(), ReelError> {
        let landing = self.validate_stops(segments)?;
        if !self.is_idle() {
            log::debug!("set_segments ignored while {:?}", self.phase);
            return Ok(());
        }
        for (reel, angle) in self.reels.iter_mut().zip(landing) {
            reel.set_rest_angle(angle);
        }
        Ok(())
    }

    /// Start a spin that lands on `request.stops`.
    ///
    /// Returns `Busy` without touching any state unless the engine is idle.
    /// An out-of-range stop rejects the whole request before any reel moves.
    pub fn begin_spin(&mut self, request: SpinRequest) -> Result<SpinStatus, ReelError> {
        if !self.is_idle() {
            log::debug!("Spin rejected: engine is {:?}", self.phase);
            return Ok(SpinStatus::Busy);
        }

        let SpinRequest {
            mut stops,
            on_complete,
        } = request;
        let landing = self.validate_stops(&stops)?;
        stops.truncate(self.config.reel_count);

        let speed = self.config.initial_speed();
        for reel in &mut self.reels {
            reel.start(speed);
        }
        self.phase = SpinPhase::Spinning;
        self.stagger_tasks.clear();

        log::info!("Spin accepted, landing on {:?}", stops);
        self.events.push(SpinEvent::SpinStarted {
            stops: stops.clone(),
        });
        self.active = Some(ActiveSpin {
            stops,
            landing,
            on_complete,
        });

        let delay = self.config.spin_duration();
        self.stop_timer = Some(self.timeline.schedule(delay, EngineTask::BeginStop));

        Ok(SpinStatus::Accepted)
    }

    /// Stop now with the short stagger.
    ///
    /// Only acts while spinning with the normal stop still pending; an
    /// orderly stop already in progress is never downgraded.
    pub fn force_stop(&mut self) {
        if self.phase != SpinPhase::Spinning {
            log::debug!("force_stop ignored while {:?}", self.phase);
            return;
        }

        if let Some(handle) = self.stop_timer.take() {
            self.timeline.cancel(handle);
        }

        let stagger = self.config.quick_stagger();
        self.schedule_stop(stagger, StopMode::Quick);
        self.run_due_tasks();
    }

    /// Advance the engine by one frame
    pub fn update(&mut self, dt: f64) {
        let dt = clamp_frame_dt(dt);

        self.timeline.advance(dt);
        self.run_due_tasks();

        let normal = self.config.deceleration_smoothness;
        let quick = self.config.quick_stop_smoothness;
        let segments_per_reel = self.config.symbols_per_reel;
        for (index, reel) in self.reels.iter_mut().enumerate() {
            if reel.advance(dt, normal, quick) {
                let segment = segment_at(reel.angle(), segments_per_reel);
                log::debug!("Reel {} stopped on segment {}", index, segment);
                self.events.push(SpinEvent::ReelStopped {
                    reel: index,
                    segment,
                });
            }
        }

        self.check_complete();
    }

    /// Begin the staggered transition from spinning to stopping.
    ///
    /// Each reel gets its own deferred assignment, `index * stagger` after
    /// this call, so later reels keep spinning longer.
    fn schedule_stop(&mut self, stagger: Duration, mode: StopMode) {
        self.phase = mode.phase();
        self.stagger_tasks = (0..self.reels.len())
            .map(|reel| {
                self.timeline
                    .schedule(stagger * reel as u32, EngineTask::AssignStop { reel, mode })
            })
            .collect();

        log::info!("Stop scheduled ({:?}, stagger {:?})", mode, stagger);
        self.events.push(SpinEvent::StopScheduled { mode });
    }

    fn run_due_tasks(&mut self) {
        while let Some(task) = self.timeline.pop_due() {
            match task {
                EngineTask::BeginStop => {
                    self.stop_timer = None;
                    if self.phase == SpinPhase::Spinning {
                        let stagger = self.config.normal_stagger();
                        self.schedule_stop(stagger, StopMode::Normal);
                    }
                }
                EngineTask::AssignStop { reel, mode } => self.assign_stop(reel, mode),
            }
        }
        let timeline = &self.timeline;
        self.stagger_tasks.retain(|h| timeline.is_pending(*h));
    }

    fn assign_stop(&mut self, index: usize, mode: StopMode) {
        let Some(base) = self.active.as_ref().and_then(|s| s.landing.get(index).copied()) else {
            return;
        };
        let Some(reel) = self.reels.get_mut(index) else {
            return;
        };
        if reel.phase() != SpinPhase::Spinning {
            return;
        }

        let target = reel.assign_stop(base, mode);
        log::debug!("Reel {} assigned target {:.4} ({:?})", index, target, mode);
    }

    fn check_complete(&mut self) {
        let stopping = matches!(self.phase, SpinPhase::Stopping | SpinPhase::QuickStopping);
        if !stopping || !self.reels.iter().all(ReelState::is_rest) {
            return;
        }

        self.phase = SpinPhase::Rest;
        self.stagger_tasks.clear();

        if let Some(spin) = self.active.take() {
            log::info!("Spin complete on {:?}", spin.stops);
            self.events.push(SpinEvent::SpinCompleted {
                stops: spin.stops.clone(),
            });
            if let Some(callback) = spin.on_complete {
                callback();
            }
        }
    }

    /// Check stop count and range, returning each reel's landing angle
    fn validate_stops(&self, stops: &[u32]) -> Result<Vec<f64>, ReelError> {
        let expected = self.config.reel_count;
        if stops.len() < expected {
            return Err(ReelError::SegmentCount {
                expected,
                got: stops.len(),
            });
        }
        if stops.len() > expected {
            log::warn!(
                "Truncating {} stop segments to {} reels",
                stops.len(),
                expected
            );
        }
        angles_for(&stops[..expected], self.config.symbols_per_reel)
    }

    /// Landing angle for one reel's segment
    pub fn angle_for(&self, segment: u32) -> Result<f64, ReelError> {
        angle_for(segment, self.config.symbols_per_reel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap_angle;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    fn engine() -> ReelEngine {
        ReelEngine::new(ReelConfig::default()).unwrap()
    }

    fn run_until_idle(engine: &mut ReelEngine, max_frames: u32) -> u32 {
        let mut frames = 0;
        loop {
            engine.update(DT);
            frames += 1;
            if engine.is_idle() {
                return frames;
            }
            assert!(frames < max_frames, "spin never completed");
        }
    }

    #[test]
    fn test_begin_spin_arms_reels() {
        let mut engine = engine();
        let status = engine.begin_spin(SpinRequest::new(vec![2, 4, 1])).unwrap();
        assert_eq!(status, SpinStatus::Accepted);
        assert_eq!(engine.phase(), SpinPhase::Spinning);
        for reel in engine.reels() {
            assert_eq!(reel.phase(), SpinPhase::Spinning);
            assert_eq!(reel.speed(), 30.0);
        }
        assert!(engine.stop_timer.is_some());
    }

    #[test]
    fn test_busy_is_noop() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 1, 1])).unwrap();
        engine.update(DT);
        let before = engine.reels().to_vec();

        let status = engine.begin_spin(SpinRequest::new(vec![9, 9, 9])).unwrap();
        assert_eq!(status, SpinStatus::Busy);
        assert_eq!(engine.reels(), &before[..]);
        assert_eq!(engine.phase(), SpinPhase::Spinning);
    }

    #[test]
    fn test_invalid_segment_rejects_atomically() {
        let mut engine = engine();
        let before = engine.reels().to_vec();
        let err = engine.begin_spin(SpinRequest::new(vec![1, 2, 6])).unwrap_err();
        assert!(matches!(err, ReelError::InvalidSegment { reel: 2, segment: 6, .. }));
        assert_eq!(engine.reels(), &before[..]);
        assert!(engine.is_idle());
        assert!(engine.timeline.is_empty());
    }

    #[test]
    fn test_short_stop_list_rejected() {
        let mut engine = engine();
        let err = engine.begin_spin(SpinRequest::new(vec![1, 2])).unwrap_err();
        assert!(matches!(err, ReelError::SegmentCount { expected: 3, got: 2 }));
    }

    #[test]
    fn test_long_stop_list_truncated() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 2, 3, 4])).unwrap();
        run_until_idle(&mut engine, 2000);
        assert_eq!(engine.visible_segments(), vec![1, 2, 3]);
    }

    #[test]
    fn test_stop_begins_after_delay() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 1, 1])).unwrap();
        for _ in 0..59 {
            engine.update(DT);
        }
        assert_eq!(engine.phase(), SpinPhase::Spinning);
        engine.update(DT);
        engine.update(DT);
        assert_eq!(engine.phase(), SpinPhase::Stopping);
        // First reel assigned immediately, the rest wait for their stagger
        assert_eq!(engine.reels()[0].phase(), SpinPhase::Stopping);
        assert_eq!(engine.reels()[2].phase(), SpinPhase::Spinning);
    }

    #[test]
    fn test_staggered_assignment_order() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 1, 1])).unwrap();
        // Past 1.0s spin + 0.25s stagger, short of the third reel's 0.5s
        for _ in 0..80 {
            engine.update(DT);
        }
        assert!(engine.reels()[1].target().is_some());
        assert!(engine.reels()[2].target().is_none());
    }

    #[test]
    fn test_lands_on_requested_segments() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![2, 4, 1])).unwrap();
        run_until_idle(&mut engine, 2000);

        let expected = [4.398, 1.885, 5.655];
        for (reel, want) in engine.reels().iter().zip(expected) {
            assert_eq!(reel.target(), Some(reel.angle()));
            assert!((wrap_angle(reel.angle()) - want).abs() < 1e-3);
        }
        assert_eq!(engine.visible_segments(), vec![2, 4, 1]);
    }

    #[test]
    fn test_callback_fires_once() {
        let mut engine = engine();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        engine
            .begin_spin(SpinRequest::with_callback(vec![3, 3, 3], move || {
                counter.set(counter.get() + 1)
            }))
            .unwrap();

        run_until_idle(&mut engine, 2000);
        for _ in 0..120 {
            engine.update(DT);
        }
        assert_eq!(fired.get(), 1);
        assert!(engine.active.is_none());
    }

    #[test]
    fn test_force_stop_cancels_pending_normal_stop() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![5, 5, 5])).unwrap();
        engine.update(DT);
        let pending = engine.stop_timer.unwrap();

        engine.force_stop();
        assert!(!engine.timeline.is_pending(pending));
        assert_eq!(engine.phase(), SpinPhase::QuickStopping);
        assert_eq!(engine.reels()[0].phase(), SpinPhase::QuickStopping);

        // Past the scheduled stop delay: the cancelled normal stop must not fire
        for _ in 0..90 {
            engine.update(DT);
            assert!(engine
                .reels()
                .iter()
                .all(|r| r.phase() != SpinPhase::Stopping));
        }
    }

    #[test]
    fn test_force_stop_noop_once_stopping() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 2, 3])).unwrap();
        for _ in 0..61 {
            engine.update(DT);
        }
        assert_eq!(engine.phase(), SpinPhase::Stopping);
        let tasks = engine.timeline.len();

        engine.force_stop();
        assert_eq!(engine.phase(), SpinPhase::Stopping);
        assert_eq!(engine.timeline.len(), tasks);
    }

    #[test]
    fn test_force_stop_at_rest_is_noop() {
        let mut engine = engine();
        engine.force_stop();
        assert!(engine.is_idle());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_quick_stop_faster_than_normal() {
        let mut normal = engine();
        normal.begin_spin(SpinRequest::new(vec![2, 4, 1])).unwrap();
        let normal_frames = run_until_idle(&mut normal, 2000);

        let mut quick = engine();
        quick.begin_spin(SpinRequest::new(vec![2, 4, 1])).unwrap();
        quick.force_stop();
        let quick_frames = run_until_idle(&mut quick, 2000);

        assert!(quick_frames < normal_frames);
        assert_eq!(quick.visible_segments(), vec![2, 4, 1]);
    }

    #[test]
    fn test_events_sequence() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 2, 3])).unwrap();
        run_until_idle(&mut engine, 2000);

        let events = engine.drain_events();
        assert_eq!(events.first(), Some(&SpinEvent::SpinStarted { stops: vec![1, 2, 3] }));
        assert!(events.contains(&SpinEvent::StopScheduled { mode: StopMode::Normal }));
        let stopped: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SpinEvent::ReelStopped { reel, segment } => Some((*reel, *segment)),
                _ => None,
            })
            .collect();
        assert_eq!(stopped, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(events.last(), Some(&SpinEvent::SpinCompleted { stops: vec![1, 2, 3] }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_initial_segments() {
        let config = ReelConfig {
            initial_segments: Some(vec![3, 1, 5]),
            ..Default::default()
        };
        let engine = ReelEngine::new(config).unwrap();
        assert_eq!(engine.visible_segments(), vec![3, 1, 5]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_second_spin_after_completion() {
        let mut engine = engine();
        engine.begin_spin(SpinRequest::new(vec![1, 1, 1])).unwrap();
        run_until_idle(&mut engine, 2000);
        let status = engine.begin_spin(SpinRequest::new(vec![5, 4, 3])).unwrap();
        assert_eq!(status, SpinStatus::Accepted);
        run_until_idle(&mut engine, 2000);
        assert_eq!(engine.visible_segments(), vec![5, 4, 3]);
    }
}
