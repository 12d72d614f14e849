//! Reel layout and debounced relayout
//!
//! World space is an orthographic view with half-height 1 and half-width
//! equal to the viewport aspect ratio. Reels are spread evenly across the
//! full width and scaled to fit.

use std::time::Duration;

use glam::Vec2;

use crate::sim::{TaskHandle, Timeline};

/// Host surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a collapsed surface reports 1.0
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Orthographic camera extents in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl CameraBounds {
    const HALF_HEIGHT: f32 = 1.0;

    pub fn for_viewport(viewport: Viewport) -> Self {
        let half_width = Self::HALF_HEIGHT * viewport.aspect();
        Self {
            left: -half_width,
            right: half_width,
            top: Self::HALF_HEIGHT,
            bottom: -Self::HALF_HEIGHT,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// Where one reel sits on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelPlacement {
    /// Centre of the reel's axis in world space
    pub center: Vec2,
    /// Uniform scale (the reel's width in world units)
    pub scale: f32,
}

/// Camera plus per-reel placement
#[derive(Debug, Clone, PartialEq)]
pub struct ReelLayout {
    reel_count: usize,
    spacing_ratio: f32,
    viewport: Viewport,
    camera: CameraBounds,
    placements: Vec<ReelPlacement>,
}

impl ReelLayout {
    pub fn new(reel_count: usize, spacing_ratio: f32, viewport: Viewport) -> Self {
        let mut layout = Self {
            reel_count,
            spacing_ratio,
            viewport,
            camera: CameraBounds::for_viewport(viewport),
            placements: Vec::with_capacity(reel_count),
        };
        layout.relayout(viewport);
        layout
    }

    /// Recompute camera and reel positions for a new surface size
    pub fn relayout(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera = CameraBounds::for_viewport(viewport);

        let count = self.reel_count as f32;
        let ratio = self.spacing_ratio;
        let scale = self.camera.width() / (count + ratio * (count - 1.0));
        let spacing = scale * ratio;
        let left = self.camera.left;

        self.placements = (0..self.reel_count)
            .map(|i| ReelPlacement {
                center: Vec2::new(left + scale / 2.0 + i as f32 * (scale + spacing), 0.0),
                scale,
            })
            .collect();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> CameraBounds {
        self.camera
    }

    pub fn placements(&self) -> &[ReelPlacement] {
        &self.placements
    }
}

/// Collapses bursts of resize events into one relayout.
///
/// Every event cancels the pending relayout and schedules a new one, so the
/// last viewport wins once the surface has been quiet for the window.
#[derive(Debug)]
pub struct ResizeDebouncer {
    window: Duration,
    timeline: Timeline<Viewport>,
    pending: Option<TaskHandle>,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            timeline: Timeline::new(),
            pending: None,
        }
    }

    /// Record a resize event
    pub fn on_resize(&mut self, viewport: Viewport) {
        if let Some(handle) = self.pending.take() {
            self.timeline.cancel(handle);
        }
        self.pending = Some(self.timeline.schedule(self.window, viewport));
    }

    /// Advance by one frame; yields the viewport to lay out once settled
    pub fn advance(&mut self, dt: f64) -> Option<Viewport> {
        self.timeline.advance(dt);
        let mut settled = None;
        while let Some(viewport) = self.timeline.pop_due() {
            self.pending = None;
            settled = Some(viewport);
        }
        settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
