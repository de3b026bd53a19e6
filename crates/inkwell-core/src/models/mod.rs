//! Data models for Inkwell

mod asset;
mod document;
mod draft;
mod publication;
mod resolved;

pub use asset::AssetCacheEntry;
pub use document::Document;
pub use draft::DraftRef;
pub use publication::PublicationRecord;
pub use resolved::ResolvedDocument;
