//! Store model: the three on-disk artifact stores and filename rules.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raster formats accepted in every store (case-insensitive).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Logical location of an artifact. Identity is (store, filename).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Store {
    /// Uploaded source images.
    Raw,
    /// Transparent edge masks produced by the postprocessor.
    Processed,
    /// Drop directory the headset deposits into.
    ExchangeInbox,
}

impl Store {
    /// Directory name under the data root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Store::Raw => "raw",
            Store::Processed => "processed",
            Store::ExchangeInbox => "exchange-inbox",
        }
    }

    /// Stores addressable through the upload/gallery surface.
    pub fn parse_public(name: &str) -> Option<Store> {
        match name {
            "raw" => Some(Store::Raw),
            "processed" => Some(Store::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Whether a filename carries an allow-listed raster extension.
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && ALLOWED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a))
        })
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe flat name.
///
/// Path separators and traversal sequences are stripped, anything outside
/// `[A-Za-z0-9._-]` collapses to `_`, and names that reduce to nothing or to
/// a bare dotfile are rejected. The extension allow-list is enforced here as
/// well so every caller gets the same policy.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Keep only the final path component, whichever separator was used.
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return Err(Error::Validation(format!("Unsafe filename: {:?}", filename)));
    }
    if !has_allowed_extension(&cleaned) {
        return Err(Error::Validation(format!(
            "Extension not allowed for {:?} (expected one of {})",
            filename,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(cleaned)
}

/// Base filename without its extension.
pub fn file_stem(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(filename)
}
