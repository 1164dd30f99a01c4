//! edgeline-store: on-disk artifact stores and the exchange mailbox
//!
//! Three flat directories (`raw`, `processed`, `exchange-inbox`) hold every
//! artifact the service knows about. There is no database and no locking:
//! ownership of a file is implied by the directory it sits in, and the
//! mailbox infers its state from directory listings alone.

pub mod artifacts;
pub mod layout;
pub mod mailbox;

pub use artifacts::{deposit, fetch, list_artifacts, ArtifactInfo};
pub use layout::StoreLayout;
pub use mailbox::{Mailbox, ProcessedReport};
