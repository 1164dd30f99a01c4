//! Edge-mask postprocessing: probability map in, transparent mask out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GrayImage, Rgba, RgbaImage};
use tracing::{debug, info};

use edgeline_core::store::file_stem;

use crate::detector::EdgeDetector;
use crate::error::VisionError;
use crate::probmap::ProbabilityMap;

/// Border zeroed on every side to suppress network padding artifacts.
pub const BORDER_WIDTH: u32 = 10;

/// Quantized values above this count as edge pixels.
pub const EDGE_THRESHOLD: u8 = 64;

/// Diagnostic suffix for the persisted pre-binarization map.
const MAP_SUFFIX: &str = "_map";

/// Quantize a probability map to 8-bit grayscale at the target size.
pub fn quantize_map(map: &ProbabilityMap, width: u32, height: u32) -> Result<GrayImage, VisionError> {
    let resized = map.resized(width, height)?;
    let mut gray = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels_mut() {
        let scaled = (255.0 * resized.get(x, y)).round().clamp(0.0, 255.0);
        pixel.0 = [scaled as u8];
    }
    Ok(gray)
}

/// Render the transparent binary edge mask for a source of the given size.
///
/// Quantizes, zeroes a [`BORDER_WIDTH`] frame, binarizes at
/// [`EDGE_THRESHOLD`], inverts, and expands to RGBA where only edge pixels
/// are opaque. The output always matches (width, height).
pub fn render_mask(
    map: &ProbabilityMap,
    width: u32,
    height: u32,
) -> Result<RgbaImage, VisionError> {
    if width == 0 || height == 0 {
        return Err(VisionError::Processing(
            "Source dimensions cannot be zero".to_string(),
        ));
    }
    let gray = quantize_map(map, width, height)?;

    let mut mask = RgbaImage::new(width, height);
    for (x, y, pixel) in mask.enumerate_pixels_mut() {
        let in_border = x < BORDER_WIDTH
            || y < BORDER_WIDTH
            || x >= width.saturating_sub(BORDER_WIDTH)
            || y >= height.saturating_sub(BORDER_WIDTH);
        let value = if in_border { 0 } else { gray.get_pixel(x, y).0[0] };
        let binary = if value > EDGE_THRESHOLD { 255u8 } else { 0u8 };
        let inverted = 255 - binary;
        let alpha = if inverted == 255 { 0 } else { 255 };
        *pixel = Rgba([inverted, inverted, inverted, alpha]);
    }
    Ok(mask)
}

/// Report for one processed source file.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    /// Path of the persisted transparent mask.
    pub mask_path: PathBuf,
    /// Path of the persisted diagnostic map, when enabled.
    pub map_path: Option<PathBuf>,
}

/// File-to-file postprocessor around an injected inference capability.
///
/// The detector is constructed once at startup and shared; a stateless
/// forward pass makes concurrent use safe without a lock.
pub struct Postprocessor {
    detector: Arc<dyn EdgeDetector>,
    save_probability_map: bool,
}

impl Postprocessor {
    pub fn new(detector: Arc<dyn EdgeDetector>, save_probability_map: bool) -> Self {
        Self {
            detector,
            save_probability_map,
        }
    }

    /// Decode a source image, run inference, and persist the transparent
    /// mask into `processed_dir` under `<stem>.png` (overwriting any prior
    /// artifact with that name).
    pub fn process_file(
        &self,
        source: &Path,
        processed_dir: &Path,
    ) -> Result<ProcessedArtifact, VisionError> {
        let image = image::open(source)?.to_rgb8();
        let (width, height) = image.dimensions();
        debug!(source = %source.display(), width, height, "Running edge detection");

        let map = self.detector.detect(&image)?;
        let mask = render_mask(&map, width, height)?;

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VisionError::Processing(format!(
                "Source path has no usable filename: {}",
                source.display()
            )))?;
        let stem = file_stem(file_name);

        let mask_path = processed_dir.join(format!("{}.png", stem));
        mask.save(&mask_path)?;
        info!(mask = %mask_path.display(), "Saved transparent edge mask");

        let map_path = if self.save_probability_map {
            let path = processed_dir.join(format!("{}{}.png", stem, MAP_SUFFIX));
            quantize_map(&map, width, height)?.save(&path)?;
            Some(path)
        } else {
            None
        };

        Ok(ProcessedArtifact { mask_path, map_path })
    }
}
