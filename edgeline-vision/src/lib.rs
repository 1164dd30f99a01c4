//! edgeline-vision: edge-mask postprocessing
//!
//! Turns a single-channel edge probability map into a transparent-background
//! binary edge image. The network producing the map is behind the
//! [`EdgeDetector`] seam; everything here is a deterministic transform.

pub mod detector;
pub mod error;
pub mod postprocess;
pub mod probmap;

pub use detector::{EdgeDetector, SobelDetector};
pub use error::VisionError;
pub use postprocess::{Postprocessor, BORDER_WIDTH, EDGE_THRESHOLD};
pub use probmap::ProbabilityMap;
