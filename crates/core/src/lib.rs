//! galsync-core - Core library for the galsync uploader
//!
//! This library syncs a static gallery's build output to an S3-compatible
//! bucket: scan the local tree, compare each file against remote metadata,
//! upload the difference. Storage access goes through the [`store::ObjectStore`]
//! trait so the engine can be tested without a network.

pub mod config;
pub mod error;
pub mod scan;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::{FailurePolicy, Policy, UploadOptions};
pub use error::{Error, Result};
pub use scan::{scan_tree, LocalFile};
pub use store::{MemoryStore, ObjectStore, RemoteObject, S3Store};
pub use sync::{decide, SyncDecision, SyncReport, SyncRunner};
