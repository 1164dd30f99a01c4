//! On-disk layout of the artifact stores.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use edgeline_core::{Result, Store};

/// Subdirectory reserved for future alternate representations (image
/// graphs, point clouds). Created on startup, currently inert.
pub const RESERVED_DATA_DIR: &str = "data";

/// Root of the three artifact stores.
///
/// Cheap to clone; all paths derive from the root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Open (and create if needed) the store directories under `root`.
    pub fn open(root: &Path) -> Result<StoreLayout> {
        for store in [Store::Raw, Store::Processed, Store::ExchangeInbox] {
            fs::create_dir_all(root.join(store.dir_name()))?;
        }
        // Reserved alternate-representation folders, no behavior attached.
        fs::create_dir_all(root.join(Store::Raw.dir_name()).join(RESERVED_DATA_DIR))?;
        fs::create_dir_all(root.join(Store::Processed.dir_name()).join(RESERVED_DATA_DIR))?;

        info!(root = %root.display(), "Opened artifact stores");
        Ok(StoreLayout {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory backing a store.
    pub fn dir(&self, store: Store) -> PathBuf {
        self.root.join(store.dir_name())
    }

    /// Full path of an artifact. The filename must already be sanitized.
    pub fn artifact_path(&self, store: Store, filename: &str) -> PathBuf {
        self.dir(store).join(filename)
    }
}
