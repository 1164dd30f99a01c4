//! The inference seam and its built-in implementations.

use image::RgbImage;
use tracing::debug;

use crate::error::VisionError;
use crate::probmap::ProbabilityMap;

/// Opaque edge-inference capability.
///
/// Implementations must be stateless per call so one instance can be shared
/// behind an `Arc` across concurrent requests. A HED-style network wraps its
/// forward pass in this trait; the transform pipeline never sees anything
/// beyond the probability map.
pub trait EdgeDetector: Send + Sync {
    /// Produce a per-pixel edge probability map with the same dimensions as
    /// the input image.
    fn detect(&self, image: &RgbImage) -> Result<ProbabilityMap, VisionError>;
}

// Luminosity coefficients (matching skimage.color.rgb2gray)
const LUMA_R: f32 = 0.2125;
const LUMA_G: f32 = 0.7154;
const LUMA_B: f32 = 0.0721;

// A unit step edge saturates both 3x3 Sobel kernels at 4, so gradient
// magnitude never exceeds 4 * sqrt(2).
const MAX_MAGNITUDE: f32 = 5.656_854_2;

/// Gradient-magnitude fallback detector.
///
/// Default inference capability when no external network is wired in:
/// 3x3 Sobel on luminance, magnitude normalized into [0, 1].
#[derive(Debug, Default, Clone, Copy)]
pub struct SobelDetector;

impl SobelDetector {
    pub fn new() -> Self {
        Self
    }
}

/// Reflect an out-of-range index back into [0, size) (d c b a | a b c d).
fn reflect_index(i: i64, size: u32) -> u32 {
    let s = i64::from(size);
    let r = if i < 0 {
        (-i - 1).rem_euclid(s)
    } else if i >= s {
        (2 * s - i - 1).rem_euclid(s)
    } else {
        i
    };
    r as u32
}

impl EdgeDetector for SobelDetector {
    fn detect(&self, image: &RgbImage) -> Result<ProbabilityMap, VisionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VisionError::Processing(
                "Cannot detect edges in a zero-sized image".to_string(),
            ));
        }
        debug!(width, height, "Running Sobel gradient detection");

        let lum = |x: i64, y: i64| -> f32 {
            let px = image.get_pixel(reflect_index(x, width), reflect_index(y, height));
            (LUMA_R * px.0[0] as f32 + LUMA_G * px.0[1] as f32 + LUMA_B * px.0[2] as f32) / 255.0
        };

        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let tl = lum(x - 1, y - 1);
                let tc = lum(x, y - 1);
                let tr = lum(x + 1, y - 1);
                let ml = lum(x - 1, y);
                let mr = lum(x + 1, y);
                let bl = lum(x - 1, y + 1);
                let bc = lum(x, y + 1);
                let br = lum(x + 1, y + 1);

                let gx = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
                let gy = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);
                let magnitude = (gx * gx + gy * gy).sqrt() / MAX_MAGNITUDE;
                data.push(magnitude.min(1.0));
            }
        }
        ProbabilityMap::new(width, height, data)
    }
}

/// Fixture detector returning the same probability everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantDetector {
    value: f32,
}

impl ConstantDetector {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl EdgeDetector for ConstantDetector {
    fn detect(&self, image: &RgbImage) -> Result<ProbabilityMap, VisionError> {
        let (width, height) = image.dimensions();
        ProbabilityMap::new(
            width,
            height,
            vec![self.value; width as usize * height as usize],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(0, 4), 0);
        assert_eq!(reflect_index(3, 4), 3);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
    }

    #[test]
    fn test_sobel_rejects_zero_sized_image() {
        let image = RgbImage::new(0, 0);
        assert!(SobelDetector::new().detect(&image).is_err());
    }

    #[test]
    fn test_sobel_flat_image_has_no_edges() {
        let image = RgbImage::from_pixel(16, 16, Rgb([120, 120, 120]));
        let map = SobelDetector::new().detect(&image).unwrap();
        assert_eq!(map.width(), 16);
        assert_eq!(map.height(), 16);
        assert!(map.as_slice().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_sobel_detects_vertical_step() {
        // Left half black, right half white: the seam must respond strongly,
        // far interiors not at all.
        let image = RgbImage::from_fn(16, 16, |x, _| {
            if x < 8 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let map = SobelDetector::new().detect(&image).unwrap();
        assert!(map.get(8, 8) > 0.5);
        assert_eq!(map.get(2, 8), 0.0);
        assert_eq!(map.get(13, 8), 0.0);
    }

    #[test]
    fn test_sobel_values_stay_in_unit_range() {
        let image = RgbImage::from_fn(12, 12, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let map = SobelDetector::new().detect(&image).unwrap();
        assert!(map.as_slice().iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_constant_detector_matches_image_shape() {
        let image = RgbImage::new(7, 5);
        let map = ConstantDetector::new(0.3).detect(&image).unwrap();
        assert_eq!(map.width(), 7);
        assert_eq!(map.height(), 5);
        assert!(map.as_slice().iter().all(|&p| p == 0.3));
    }
}
