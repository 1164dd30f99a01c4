//! edgeline-server: HTTP boundary for the edge-mask service
//!
//! Routes, multipart upload handling, and the exchange endpoints the
//! headset polls. All algorithmic work lives in edgeline-vision and
//! edgeline-store; this crate is glue.

pub mod config_loader;
pub mod http;
