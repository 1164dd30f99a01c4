//! Single-channel edge probability maps.

use crate::error::VisionError;

/// Per-pixel edge likelihood in [0, 1], row-major, same orientation as the
/// source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ProbabilityMap {
    /// Build a map from raw floats. Length must be `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, VisionError> {
        if width == 0 || height == 0 {
            return Err(VisionError::Processing(
                "Probability map dimensions cannot be zero".to_string(),
            ));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(VisionError::Processing(format!(
                "Probability map length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Build a map from 8-bit network output, rescaling to [0, 1].
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, VisionError> {
        let data = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Probability at (x, y). Panics outside bounds, callers iterate within
    /// `width()`/`height()`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Nearest-neighbor resize to (width, height). Returns a clone when the
    /// shape already matches.
    pub fn resized(&self, width: u32, height: u32) -> Result<ProbabilityMap, VisionError> {
        if width == 0 || height == 0 {
            return Err(VisionError::Processing(
                "Target dimensions cannot be zero".to_string(),
            ));
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            // Nearest source row, clamped to the valid range.
            let src_y = ((y as f32 * self.height as f32 / height as f32) as u32)
                .min(self.height - 1);
            for x in 0..width {
                let src_x = ((x as f32 * self.width as f32 / width as f32) as u32)
                    .min(self.width - 1);
                data.push(self.get(src_x, src_y));
            }
        }
        ProbabilityMap::new(width, height, data)
    }
}
