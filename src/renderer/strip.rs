//! Symbol strips and the reel atlas
//!
//! Each reel's symbols are stacked top to bottom into one strip, then all
//! strips are packed side by side into a single texture. Every image on
//! every strip must share one size: mismatches are rejected, never cropped
//! or letterboxed.

use crate::error::AssetError;
use crate::symbols::Symbol;

/// RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SymbolImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(AssetError::PixelData {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Alpha-blend `src` onto this image at (`x0`, `y0`)
    fn blend_from(&mut self, src: &SymbolImage, x0: u32, y0: u32) {
        for y in 0..src.height {
            for x in 0..src.width {
                let [r, g, b, a] = src.pixel(x, y);
                let dst = self.pixel(x0 + x, y0 + y);
                let a = a as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
                self.put(
                    x0 + x,
                    y0 + y,
                    [mix(r, dst[0]), mix(g, dst[1]), mix(b, dst[2]), 255],
                );
            }
        }
    }
}

/// Looks up the art for a symbol on a given reel
pub trait SymbolResolver {
    fn resolve(&self, reel: usize, symbol: Symbol) -> Result<SymbolImage, AssetError>;
}

/// Stack one reel's symbol images into a strip over a white background
pub fn stitch_strip(reel: usize, images: &[SymbolImage]) -> Result<SymbolImage, AssetError> {
    let first = images.first().ok_or(AssetError::EmptyStrip { reel })?;
    let (width, height) = (first.width, first.height);

    for (index, image) in images.iter().enumerate() {
        if image.width != width || image.height != height {
            return Err(AssetError::SizeMismatch {
                reel,
                index,
                width,
                height,
                got_width: image.width,
                got_height: image.height,
            });
        }
    }

    let mut strip = SymbolImage::solid(width, height * images.len() as u32, [255; 4]);
    for (i, image) in images.iter().enumerate() {
        strip.blend_from(image, 0, i as u32 * height);
    }
    Ok(strip)
}

/// All reel strips packed left to right into one texture
#[derive(Debug, Clone)]
pub struct ReelAtlas {
    image: SymbolImage,
    strip_count: usize,
    symbols_per_strip: usize,
}

impl ReelAtlas {
    /// Resolve and stitch one strip per reel from a shared symbol layout
    pub fn build(
        layout: &[Symbol],
        reel_count: usize,
        resolver: &dyn SymbolResolver,
    ) -> Result<Self, AssetError> {
        let strips = (0..reel_count)
            .map(|reel| {
                let images = layout
                    .iter()
                    .map(|&symbol| resolver.resolve(reel, symbol))
                    .collect::<Result<Vec<_>, _>>()?;
                stitch_strip(reel, &images)
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Built {} reel strips of {} symbols",
            strips.len(),
            layout.len()
        );
        Self::from_strips(strips, layout.len())
    }

    pub fn from_strips(strips: Vec<SymbolImage>, symbols_per_strip: usize) -> Result<Self, AssetError> {
        let first = strips.first().ok_or(AssetError::EmptyStrip { reel: 0 })?;
        let (width, height) = (first.width, first.height);

        for (reel, strip) in strips.iter().enumerate() {
            if strip.width != width || strip.height != height {
                return Err(AssetError::SizeMismatch {
                    reel,
                    index: 0,
                    width,
                    height,
                    got_width: strip.width,
                    got_height: strip.height,
                });
            }
        }

        let mut image = SymbolImage::solid(width * strips.len() as u32, height, [255; 4]);
        for (i, strip) in strips.iter().enumerate() {
            image.blend_from(strip, i as u32 * width, 0);
        }

        Ok(Self {
            image,
            strip_count: strips.len(),
            symbols_per_strip,
        })
    }

    pub fn image(&self) -> &SymbolImage {
        &self.image
    }

    pub fn strip_count(&self) -> usize {
        self.strip_count
    }

    pub fn symbols_per_strip(&self) -> usize {
        self.symbols_per_strip
    }

    /// Strip used by a reel; reels beyond the strip count reuse strips in order
    pub fn strip_for_reel(&self, reel: usize) -> usize {
        reel % self.strip_count
    }
}

/// Flat-shaded tiles drawn in code, one colour and motif per symbol
#[derive(Debug, Clone, Copy)]
pub struct ProceduralSymbols {
    pub tile: u32,
}

impl Default for ProceduralSymbols {
    fn default() -> Self {
        Self { tile: 128 }
    }
}

impl ProceduralSymbols {
    fn palette(reel: usize, symbol: Symbol) -> ([u8; 4], [u8; 4]) {
        const INK: [u8; 4] = [30, 30, 40, 255];
        match symbol {
            Symbol::Cherry => ([250, 235, 235, 255], [200, 20, 40, 255]),
            Symbol::Bar | Symbol::DoubleBar | Symbol::TripleBar => ([240, 240, 240, 255], INK),
            Symbol::Seven => ([255, 245, 220, 255], [220, 40, 20, 255]),
            Symbol::MinorJackpot => {
                // Tinted differently on every reel
                let hue = [[60, 140, 230, 255], [60, 190, 110, 255], [170, 80, 210, 255]];
                ([235, 240, 250, 255], hue[reel % hue.len()])
            }
            Symbol::MajorJackpot => ([250, 240, 215, 255], [230, 150, 20, 255]),
            Symbol::GrandJackpot => ([255, 250, 200, 255], [200, 160, 0, 255]),
        }
    }
}

impl SymbolResolver for ProceduralSymbols {
    fn resolve(&self, reel: usize, symbol: Symbol) -> Result<SymbolImage, AssetError> {
        if self.tile < 8 {
            return Err(AssetError::Resolve(format!("tile size {} too small", self.tile)));
        }

        let size = self.tile;
        let (background, ink) = Self::palette(reel, symbol);
        let mut image = SymbolImage::solid(size, size, background);

        let c = size as f32 / 2.0;
        let border = (size / 16).max(1);
        for y in 0..size {
            for x in 0..size {
                let (fx, fy) = (x as f32 + 0.5 - c, y as f32 + 0.5 - c);
                let edge = x < border || y < border || x >= size - border || y >= size - border;
                let inside = match symbol {
                    Symbol::Cherry | Symbol::Seven => fx * fx + fy * fy < (c * 0.55).powi(2),
                    Symbol::Bar | Symbol::DoubleBar | Symbol::TripleBar => {
                        let bars = match symbol {
                            Symbol::Bar => 1,
                            Symbol::DoubleBar => 2,
                            _ => 3,
                        };
                        let band = size as f32 / (2 * bars + 1) as f32;
                        let row = (y as f32 / band) as u32;
                        fx.abs() < c * 0.7 && row % 2 == 1
                    }
                    Symbol::MinorJackpot | Symbol::MajorJackpot | Symbol::GrandJackpot => {
                        fx.abs() + fy.abs() < c * 0.65
                    }
                };
                if edge || inside {
                    image.put(x, y, ink);
                }
            }
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::DEFAULT_LAYOUT;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn test_pixel_data_length_checked() {
        assert!(matches!(
            SymbolImage::new(2, 2, vec![0; 15]),
            Err(AssetError::PixelData { expected: 16, got: 15 })
        ));
        assert!(SymbolImage::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_stitch_stacks_top_to_bottom() {
        let strip = stitch_strip(0, &[SymbolImage::solid(4, 2, RED), SymbolImage::solid(4, 2, BLUE)])
            .unwrap();
        assert_eq!((strip.width(), strip.height()), (4, 4));
        assert_eq!(strip.pixel(0, 0), RED);
        assert_eq!(strip.pixel(3, 1), RED);
        assert_eq!(strip.pixel(0, 2), BLUE);
        assert_eq!(strip.pixel(3, 3), BLUE);
    }

    #[test]
    fn test_transparent_over_white() {
        let clear = SymbolImage::solid(2, 2, [0, 0, 0, 0]);
        let strip = stitch_strip(0, &[clear]).unwrap();
        assert_eq!(strip.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = stitch_strip(
            2,
            &[SymbolImage::solid(4, 4, RED), SymbolImage::solid(4, 5, BLUE)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AssetError::SizeMismatch {
                reel: 2,
                index: 1,
                width: 4,
                height: 4,
                got_width: 4,
                got_height: 5,
            }
        );
    }

    #[test]
    fn test_empty_strip_rejected() {
        assert_eq!(stitch_strip(1, &[]), Err(AssetError::EmptyStrip { reel: 1 }));
    }

    #[test]
    fn test_atlas_packs_side_by_side() {
        let atlas = ReelAtlas::from_strips(
            vec![SymbolImage::solid(2, 6, RED), SymbolImage::solid(2, 6, BLUE)],
            3,
        )
        .unwrap();
        assert_eq!(atlas.image().width(), 4);
        assert_eq!(atlas.image().height(), 6);
        assert_eq!(atlas.image().pixel(1, 5), RED);
        assert_eq!(atlas.image().pixel(2, 0), BLUE);
        assert_eq!(atlas.strip_for_reel(3), 1);
    }

    #[test]
    fn test_build_with_procedural_art() {
        let resolver = ProceduralSymbols { tile: 16 };
        let atlas = ReelAtlas::build(&DEFAULT_LAYOUT, 3, &resolver).unwrap();
        assert_eq!(atlas.strip_count(), 3);
        assert_eq!(atlas.symbols_per_strip(), DEFAULT_LAYOUT.len());
        assert_eq!(atlas.image().width(), 48);
        assert_eq!(atlas.image().height(), 16 * DEFAULT_LAYOUT.len() as u32);
    }

    #[test]
    fn test_minor_jackpot_differs_per_reel() {
        let resolver = ProceduralSymbols { tile: 16 };
        let a = resolver.resolve(0, Symbol::MinorJackpot).unwrap();
        let b = resolver.resolve(1, Symbol::MinorJackpot).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            resolver.resolve(0, Symbol::Seven).unwrap(),
            resolver.resolve(1, Symbol::Seven).unwrap()
        );
    }

    struct Mismatched;

    impl SymbolResolver for Mismatched {
        fn resolve(&self, _reel: usize, symbol: Symbol) -> Result<SymbolImage, AssetError> {
            let height = if symbol == Symbol::Seven { 12 } else { 10 };
            Ok(SymbolImage::solid(10, height, RED))
        }
    }

    #[test]
    fn test_build_rejects_mixed_sizes() {
        let err = ReelAtlas::build(&DEFAULT_LAYOUT, 3, &Mismatched).unwrap_err();
        assert!(matches!(err, AssetError::SizeMismatch { reel: 0, index: 2, .. }));
    }
}
