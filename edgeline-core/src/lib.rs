pub mod config;
pub mod error;
pub mod store;
pub mod units;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{sanitize_filename, Store, ALLOWED_EXTENSIONS};
pub use units::format_bytes;
