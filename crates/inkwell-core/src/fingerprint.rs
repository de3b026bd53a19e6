//! Content fingerprinting over resolved representations.
//!
//! The fingerprint is computed after asset resolution and markup
//! transformation, so a re-uploaded asset (new remote URL in the body or a
//! new cover reference) changes the fingerprint and triggers an update.

use sha2::{Digest, Sha256};

use crate::models::ResolvedDocument;

/// Compute the deterministic fingerprint of a resolved representation.
///
/// Each field is length-prefixed before hashing so that field boundaries
/// cannot alias (e.g. `("ab", "c")` vs `("a", "bc")`).
#[must_use]
pub fn fingerprint(resolved: &ResolvedDocument) -> String {
    let mut hasher = Sha256::new();
    for field in [
        resolved.title.as_str(),
        resolved.body.as_str(),
        resolved.digest.as_str(),
        resolved.author.as_str(),
        resolved.cover_ref.as_deref().unwrap_or(""),
    ] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    // Absent cover must differ from present-but-empty cover
    hasher.update([u8::from(resolved.cover_ref.is_some())]);
    hex::encode(hasher.finalize())
}
