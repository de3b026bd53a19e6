//! inkwell-core - Core library for Inkwell
//!
//! This crate contains the models, sync record store, remote API client,
//! asset resolution, and the synchronization decision engine used by the
//! Inkwell CLI.

pub mod assets;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod remote;
pub mod resolve;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
pub use models::{Document, DraftRef, PublicationRecord, ResolvedDocument};
pub use sync::{BatchReport, SyncAction, SyncEngine, SyncMode, SyncOutcome};
