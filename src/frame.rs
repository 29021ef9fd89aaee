//! Frame acquisition and reduction to a low-resolution luminance grid.
//!
//! The camera is abstracted behind [`ImageSource`] so the pipeline can run
//! against a still file or a synthetic pattern. Reduction draws the source
//! into the target grid size (nearest-neighbor, one sample per cell) and
//! computes perceptual luminance per sample.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use crate::grid::GlyphGrid;
use crate::params::GridConfig;
use crate::pitch::PitchTable;

/// Perceptual luma weights (ITU-R BT.601-ish, matches the reference output)
const LUMA_R: f32 = 0.30;
const LUMA_G: f32 = 0.59;
const LUMA_B: f32 = 0.11;

/// Anything that can hand over one decodable RGB frame on demand
pub trait ImageSource {
    /// Grab the current frame. An `Err` means the source is unavailable
    /// (the camera-denied case); the pipeline is not run on failure.
    fn grab(&mut self) -> Result<RgbImage, String>;
}

/// Still-image file standing in for a live camera
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileSource {
    fn grab(&mut self) -> Result<RgbImage, String> {
        let img = image::open(&self.path)
            .map_err(|e| format!("Cannot read image '{}': {}", self.path, e))?;
        Ok(img.to_rgb8())
    }
}

/// Synthetic frames for tests and the no-camera fallback
pub enum TestPattern {
    /// Every pixel the same gray level
    Solid(u8),

    /// Luminance rises left to right, 0 at column 0 to 255 at the last column
    HorizontalGradient,
}

impl ImageSource for TestPattern {
    fn grab(&mut self) -> Result<RgbImage, String> {
        let (w, h) = (256u32, 256u32);
        let img = match self {
            TestPattern::Solid(level) => {
                let level = *level;
                RgbImage::from_pixel(w, h, Rgb([level, level, level]))
            }
            TestPattern::HorizontalGradient => RgbImage::from_fn(w, h, |x, _| {
                let level = (x * 255 / (w - 1)) as u8;
                Rgb([level, level, level])
            }),
        };
        Ok(img)
    }
}

/// Per-cell luminance values for one reduced frame
#[derive(Debug, Clone)]
pub struct LumaGrid {
    pub width: usize,
    pub height: usize,

    /// Row-major, top-to-bottom, left-to-right; each value in [0, 255]
    pub values: Vec<f32>,
}

/// Reduces an arbitrary-size frame to a fixed-size luminance grid
#[derive(Debug, Clone)]
pub struct FrameReducer {
    config: GridConfig,
}

impl FrameReducer {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// Resample the frame to grid size and compute per-cell luminance
    pub fn reduce(&self, frame: &RgbImage) -> LumaGrid {
        let (w, h) = (self.config.width, self.config.height);
        let small = imageops::resize(frame, w as u32, h as u32, FilterType::Nearest);

        let mut values = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let Rgb([r, g, b]) = *small.get_pixel(x as u32, y as u32);
                values.push(luminance(r, g, b));
            }
        }

        LumaGrid {
            width: w,
            height: h,
            values,
        }
    }
}

/// Weighted-sum perceptual luminance of one RGB sample, in [0, 255]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Owns the source, reducer, and pitch table; one `capture` call replaces
/// the live grid wholesale.
pub struct CaptureSystem {
    source: Box<dyn ImageSource>,
    reducer: FrameReducer,
    table: PitchTable,
}

impl CaptureSystem {
    pub fn new(source: Box<dyn ImageSource>, config: GridConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            source,
            reducer: FrameReducer::new(config),
            table: PitchTable::default(),
        })
    }

    /// Grab a frame and run the full reduce/quantize/render pipeline
    pub fn capture(&mut self) -> Result<GlyphGrid, String> {
        let frame = self.source.grab()?;
        let luma = self.reducer.reduce(&frame);
        Ok(GlyphGrid::from_luma(&luma, &self.table))
    }

    /// The immutable glyph/pitch palette this system renders with
    pub fn table(&self) -> &PitchTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(255, 0, 0) - 76.5).abs() < 0.001);
        assert!((luminance(0, 255, 0) - 150.45).abs() < 0.001);
        assert!((luminance(0, 0, 255) - 28.05).abs() < 0.001);
        assert!((luminance(255, 255, 255) - 255.0).abs() < 0.001);
        assert_eq!(luminance(0, 0, 0), 0.0);
    }

    #[test]
    fn test_reduce_produces_exact_grid_shape() {
        let reducer = FrameReducer::new(GridConfig::default());
        let frame = TestPattern::Solid(128).grab().unwrap();
        let luma = reducer.reduce(&frame);
        assert_eq!(luma.width, 64);
        assert_eq!(luma.height, 64);
        assert_eq!(luma.values.len(), 64 * 64);
    }

    #[test]
    fn test_reduce_solid_frame_is_uniform() {
        let reducer = FrameReducer::new(GridConfig::default());
        let frame = TestPattern::Solid(200).grab().unwrap();
        let luma = reducer.reduce(&frame);
        for &v in &luma.values {
            assert!((v - 200.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_reduce_gradient_rises_left_to_right() {
        let reducer = FrameReducer::new(GridConfig::default());
        let frame = TestPattern::HorizontalGradient.grab().unwrap();
        let luma = reducer.reduce(&frame);

        // Each row must be non-decreasing
        for y in 0..luma.height {
            let row = &luma.values[y * luma.width..(y + 1) * luma.width];
            for pair in row.windows(2) {
                assert!(pair[1] >= pair[0]);
            }
        }
        assert!(luma.values[0] < 10.0);
        assert!(luma.values[luma.width - 1] > 245.0);
    }

    #[test]
    fn test_missing_file_source_reports_denied() {
        let mut source = FileSource::new("/no/such/frame.png");
        let err = source.grab().unwrap_err();
        assert!(err.contains("/no/such/frame.png"));
    }
}
