//! Directory-based exchange mailbox between the headset and the server.
//!
//! Two peers hand images to each other through shared directories instead of
//! a session: the headset drops files into `exchange-inbox`, the server
//! drains them into `processed`, and the headset fetches results by exact
//! name. There is no locking and no claim state; a file that stays in the
//! inbox is simply processed again on the next poll (at-least-once,
//! idempotent by filename overwrite).

use std::fs;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use edgeline_core::store::has_allowed_extension;
use edgeline_core::{Error, Result, Store};
use edgeline_vision::{EdgeDetector, Postprocessor};

use crate::artifacts::deposit;
use crate::layout::StoreLayout;

/// Outcome of one successful drain step.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    /// Inbox filename that was consumed (and retained).
    pub source: String,
    /// Filename of the mask now present in the processed store.
    pub processed: String,
}

/// Drain-and-process side of the exchange.
pub struct Mailbox {
    layout: StoreLayout,
    postprocessor: Postprocessor,
}

impl Mailbox {
    pub fn new(
        layout: StoreLayout,
        detector: Arc<dyn EdgeDetector>,
        save_probability_map: bool,
    ) -> Self {
        Self {
            layout,
            postprocessor: Postprocessor::new(detector, save_probability_map),
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Deposit a payload from the peer into the exchange inbox.
    pub fn deposit_inbox(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        deposit(&self.layout, Store::ExchangeInbox, filename, bytes)
    }

    /// Process the first eligible inbox file, if any.
    ///
    /// The source file is intentionally not deleted afterwards: repeated
    /// polls reprocess it until external cleanup, and the overwrite of the
    /// processed artifact makes that harmless. A failure leaves the source
    /// in place for a later retry and is surfaced with detail.
    pub fn consume_inbox(&self) -> Result<Option<ProcessedReport>> {
        let inbox = self.layout.dir(Store::ExchangeInbox);
        for entry in fs::read_dir(&inbox)? {
            let entry = entry?;
            if !entry.metadata()?.is_file() {
                continue;
            }
            let filename = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !has_allowed_extension(&filename) {
                continue;
            }

            let processed_dir = self.layout.dir(Store::Processed);
            let artifact = self
                .postprocessor
                .process_file(&entry.path(), &processed_dir)
                .map_err(|e| {
                    warn!(source = %filename, error = %e, "Inbox processing failed, source retained");
                    Error::Processing(format!("Failed to process {:?}: {}", filename, e))
                })?;

            let processed = artifact
                .mask_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            info!(source = %filename, processed = %processed, "Drained inbox file");
            return Ok(Some(ProcessedReport {
                source: filename,
                processed,
            }));
        }
        Ok(None)
    }
}
