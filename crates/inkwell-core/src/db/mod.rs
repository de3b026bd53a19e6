//! Database layer for Inkwell

mod connection;
mod migrations;
mod store;

pub use connection::Database;
pub use store::{SqliteSyncStore, SyncStore};
