//! Resolved representation of a document

use serde::{Deserialize, Serialize};

/// The fully assembled form of a document, ready for remote submission.
///
/// All embedded asset references in `body` have already been replaced by
/// their remote-accessible URLs, so a re-uploaded asset changes the body
/// (and therefore the fingerprint) on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDocument {
    /// Document title
    pub title: String,
    /// Rendered body with asset URLs substituted
    pub body: String,
    /// Short summary / digest line
    pub digest: String,
    /// Author name
    pub author: String,
    /// Media reference of the cover asset, when one resolved
    pub cover_ref: Option<String>,
}
