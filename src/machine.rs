//! Engine, layout and renderer wired into one per-frame entry point

use crate::error::ReelError;
use crate::layout::{ReelLayout, ResizeDebouncer, Viewport};
use crate::renderer::ReelRenderer;
use crate::settings::ReelConfig;
use crate::sim::{ReelEngine, SpinEvent, SpinRequest, SpinStatus};

/// A slot machine driven by the host's frame loop
pub struct SlotMachine<R: ReelRenderer> {
    engine: ReelEngine,
    layout: ReelLayout,
    resize: ResizeDebouncer,
    renderer: R,
}

impl<R: ReelRenderer> SlotMachine<R> {
    pub fn new(config: ReelConfig, viewport: Viewport, mut renderer: R) -> Result<Self, ReelError> {
        let resize = ResizeDebouncer::new(config.resize_debounce());
        let layout = ReelLayout::new(config.reel_count, config.reel_spacing_ratio, viewport);
        let engine = ReelEngine::new(config)?;
        renderer.resize(viewport);

        Ok(Self {
            engine,
            layout,
            resize,
            renderer,
        })
    }

    pub fn begin_spin(&mut self, request: SpinRequest) -> Result<SpinStatus, ReelError> {
        self.engine.begin_spin(request)
    }

    pub fn force_stop(&mut self) {
        self.engine.force_stop();
    }

    /// Record a surface resize; the relayout happens once resizing settles
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.resize.on_resize(viewport);
    }

    /// Advance everything by `dt` seconds and draw
    pub fn frame(&mut self, dt: f64) -> Result<(), R::Error> {
        self.engine.update(dt);

        if let Some(viewport) = self.resize.advance(dt) {
            log::debug!("Relayout for {}x{}", viewport.width, viewport.height);
            self.layout.relayout(viewport);
            self.renderer.resize(viewport);
        }

        self.renderer.draw(self.engine.reels(), &self.layout)
    }

    pub fn engine(&self) -> &ReelEngine {
        &self.engine
    }

    pub fn layout(&self) -> &ReelLayout {
        &self.layout
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        self.engine.drain_events()
    }
}
