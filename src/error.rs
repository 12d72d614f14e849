//! Error types
//!
//! A busy engine is not an error: `begin_spin` reports it through
//! [`crate::SpinStatus::Busy`].

/// Failures while resolving or composing symbol art
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("reel {reel} has no symbol images")]
    EmptyStrip { reel: usize },

    #[error(
        "reel {reel} symbol {index} is {got_width}x{got_height}, expected {width}x{height}"
    )]
    SizeMismatch {
        reel: usize,
        index: usize,
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("image has {got} bytes of pixel data, expected {expected}")]
    PixelData { expected: usize, got: usize },

    #[error("atlas is {width}x{height}, device limit is {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("failed to resolve symbol art: {0}")]
    Resolve(String),
}

/// Engine error
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("reel {reel}: segment {segment} is outside 1..={segments_per_reel}")]
    InvalidSegment {
        reel: usize,
        segment: u32,
        segments_per_reel: u32,
    },

    #[error("expected {expected} stop segments, got {got}")]
    SegmentCount { expected: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("asset load failure: {0}")]
    AssetLoad(#[from] AssetError),

    #[error("reel {reel} has no {symbol} symbol")]
    SymbolNotOnReel { reel: usize, symbol: String },
}
