//! Reel rendering
//!
//! The simulation owns reel state; a renderer only ever sees a read-only
//! slice of it plus the current layout.

pub mod reel_pipeline;
pub mod strip;

pub use reel_pipeline::{ReelRenderState, init};
pub use strip::{ProceduralSymbols, ReelAtlas, SymbolImage, SymbolResolver, stitch_strip};

use std::convert::Infallible;

use crate::layout::{ReelLayout, Viewport};
use crate::sim::ReelState;

/// Draws reels from engine state
pub trait ReelRenderer {
    type Error: std::fmt::Debug;

    /// Called once a resize has settled
    fn resize(&mut self, viewport: Viewport);

    fn draw(&mut self, reels: &[ReelState], layout: &ReelLayout) -> Result<(), Self::Error>;
}

/// Renderer that records what it was asked to draw.
///
/// Used by the native demo and tests where no GPU surface exists.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub frames: usize,
    pub resizes: Vec<Viewport>,
    pub last_angles: Vec<f64>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReelRenderer for HeadlessRenderer {
    type Error = Infallible;

    fn resize(&mut self, viewport: Viewport) {
        self.resizes.push(viewport);
    }

    fn draw(&mut self, reels: &[ReelState], _layout: &ReelLayout) -> Result<(), Infallible> {
        self.frames += 1;
        self.last_angles.clear();
        self.last_angles.extend(reels.iter().map(ReelState::angle));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ReelConfig;
    use crate::sim::ReelEngine;

    #[test]
    fn test_headless_records_frames() {
        let engine = ReelEngine::new(ReelConfig::default()).unwrap();
        let layout = ReelLayout::new(3, 0.0, Viewport::new(300, 100));
        let mut renderer = HeadlessRenderer::new();

        renderer.draw(engine.reels(), &layout).unwrap();
        renderer.draw(engine.reels(), &layout).unwrap();
        renderer.resize(Viewport::new(10, 10));

        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.last_angles.len(), 3);
        assert_eq!(renderer.resizes, vec![Viewport::new(10, 10)]);
    }
}
