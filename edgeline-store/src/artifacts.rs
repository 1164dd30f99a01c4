//! Deposit, fetch, and listing of store artifacts.

use std::fs;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use edgeline_core::store::has_allowed_extension;
use edgeline_core::{format_bytes, sanitize_filename, Error, Result, Store};

use crate::layout::StoreLayout;

/// Gallery entry for one stored artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub filename: String,
    /// Human-readable size, e.g. "1.50 kB".
    pub size: String,
    /// Creation timestamp, `%Y-%m-%d %H:%M:%S`.
    pub created: String,
    /// Fetch reference for clients.
    pub path: String,
}

/// Store an uploaded payload as a whole-file write.
///
/// Rejects empty payloads and unsafe or disallowed filenames before touching
/// the filesystem. Returns the sanitized filename the artifact was stored
/// under. An existing artifact with the same name is overwritten.
pub fn deposit(layout: &StoreLayout, store: Store, filename: &str, bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(Error::Validation(
            "Uploading an empty file is not allowed".to_string(),
        ));
    }
    let safe_name = sanitize_filename(filename)?;
    let path = layout.artifact_path(store, &safe_name);
    fs::write(&path, bytes)?;
    info!(store = %store, filename = %safe_name, bytes = bytes.len(), "Deposited artifact");
    Ok(safe_name)
}

/// Read an artifact by exact filename.
///
/// The contract is explicit-key only; there is no "latest artifact" lookup.
pub fn fetch(layout: &StoreLayout, store: Store, filename: &str) -> Result<Vec<u8>> {
    let safe_name = sanitize_filename(filename)?;
    let path = layout.artifact_path(store, &safe_name);
    match fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(format!(
            "No {} artifact named {:?}",
            store, safe_name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// List the allow-listed artifacts of a store, in directory-iteration order.
pub fn list_artifacts(layout: &StoreLayout, store: Store) -> Result<Vec<ArtifactInfo>> {
    let dir = layout.dir(store);
    let mut artifacts = Vec::new();

    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let filename = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !has_allowed_extension(&filename) {
            continue;
        }

        // Not every filesystem reports a birth time.
        let created = metadata.created().or_else(|_| metadata.modified())?;
        let created: DateTime<Local> = created.into();

        artifacts.push(ArtifactInfo {
            path: format!("/images/{}/{}", store, filename),
            size: format_bytes(metadata.len()),
            created: created.format("%Y-%m-%d %H:%M:%S").to_string(),
            filename,
        });
    }

    debug!(store = %store, count = artifacts.len(), "Listed artifacts");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, StoreLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::open(dir.path()).unwrap();
        (dir, layout)
    }

    #[test]
    fn test_deposit_and_fetch_roundtrip() {
        let (_dir, layout) = scratch();
        let name = deposit(&layout, Store::Raw, "shot.png", b"not-really-png").unwrap();
        assert_eq!(name, "shot.png");
        let bytes = fetch(&layout, Store::Raw, "shot.png").unwrap();
        assert_eq!(bytes, b"not-really-png");
    }

    #[test]
    fn test_deposit_rejects_empty_payload() {
        let (_dir, layout) = scratch();
        let err = deposit(&layout, Store::Raw, "shot.png", b"").unwrap_err();
        match err {
            Error::Validation(msg) => assert!(msg.contains("empty")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_deposit_rejects_disallowed_extension() {
        let (_dir, layout) = scratch();
        assert!(deposit(&layout, Store::Raw, "evil.exe", b"x").is_err());
        assert!(deposit(&layout, Store::Raw, "notes.txt", b"x").is_err());
    }

    #[test]
    fn test_deposit_sanitizes_traversal() {
        let (_dir, layout) = scratch();
        let name = deposit(&layout, Store::Raw, "../../escape.png", b"x").unwrap();
        assert_eq!(name, "escape.png");
        assert!(layout.artifact_path(Store::Raw, "escape.png").exists());
    }

    #[test]
    fn test_deposit_overwrites_same_name() {
        let (_dir, layout) = scratch();
        deposit(&layout, Store::Processed, "a.png", b"first").unwrap();
        deposit(&layout, Store::Processed, "a.png", b"second").unwrap();
        assert_eq!(fetch(&layout, Store::Processed, "a.png").unwrap(), b"second");
    }

    #[test]
    fn test_fetch_missing_is_not_found() {
        let (_dir, layout) = scratch();
        let err = fetch(&layout, Store::Processed, "missing.png").unwrap_err();
        match err {
            Error::NotFound(msg) => assert!(msg.contains("missing.png")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_list_artifacts_filters_and_formats() {
        let (_dir, layout) = scratch();
        deposit(&layout, Store::Raw, "a.png", &[0u8; 1536]).unwrap();
        std::fs::write(layout.dir(Store::Raw).join("readme.txt"), b"ignored").unwrap();

        let listed = list_artifacts(&layout, Store::Raw).unwrap();
        assert_eq!(listed.len(), 1);
        let info = &listed[0];
        assert_eq!(info.filename, "a.png");
        assert_eq!(info.size, "1.50 kB");
        assert_eq!(info.path, "/images/raw/a.png");
        // e.g. "2026-08-30 12:34:56"
        assert_eq!(info.created.len(), 19);
    }

    #[test]
    fn test_list_artifacts_skips_reserved_data_dir() {
        let (_dir, layout) = scratch();
        let listed = list_artifacts(&layout, Store::Processed).unwrap();
        assert!(listed.is_empty());
    }
}
