//! Content-addressed file emission
//!
//! The emitter decides whether new content actually differs from what
//! was last recorded, classifies tracked and discovered files
//! (current / drifted / missing / orphaned), and removes files no
//! current run claims.

pub mod emitter;
pub mod tracking;

pub use emitter::{AuditEntry, Emitter, FileState, WriteOutcome};
pub use tracking::{TrackedFile, TrackingManifest, MANIFEST_FILE_NAME};
