//! Human-readable byte sizes for gallery listings.

const UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];

/// Format a byte count with the nearest unit and two decimals.
pub fn format_bytes(size: u64) -> String {
    let mut value = size as f64;
    let mut index = 0;
    while value >= 1024.0 && index < UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{:.2} {}", value, UNITS[index])
}
