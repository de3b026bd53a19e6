//! Markup resolution: front matter, asset substitution, cover lookup.
//!
//! Turns raw Markdown source into the resolved representation that gets
//! fingerprinted and submitted: YAML front matter supplies title/author/
//! digest, embedded image locators are replaced with their uploaded URLs,
//! and a cover asset is resolved best-effort.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::assets::{AssetResolver, ResolvedAsset};
use crate::db::SyncStore;
use crate::error::Result;
use crate::models::ResolvedDocument;
use crate::remote::RemoteApi;

/// Extensions probed when looking for a conventional cover asset next to
/// the document (same file stem), in priority order.
const COVER_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

const DIGEST_PREVIEW_CHARS: usize = 120;

/// Fallback values applied when front matter omits a field.
#[derive(Debug, Clone, Default)]
pub struct DocumentDefaults {
    pub author: Option<String>,
    pub digest: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    author: Option<String>,
    digest: Option<String>,
    cover: Option<String>,
}

/// Resolve raw Markdown source into a [`ResolvedDocument`].
///
/// Inline asset failures propagate (fatal to this document); cover
/// resolution failures are logged and swallowed.
pub async fn resolve_document<S: SyncStore, R: RemoteApi>(
    raw: &str,
    document_path: &Path,
    defaults: &DocumentDefaults,
    assets: &AssetResolver<'_, S, R>,
) -> Result<ResolvedDocument> {
    let document_dir = document_path.parent().unwrap_or_else(|| Path::new("."));

    let (front, raw_body) = split_front_matter(raw);
    let front: FrontMatter = match front {
        Some(yaml) => serde_yaml::from_str(yaml)?,
        None => FrontMatter::default(),
    };

    let body = substitute_assets(raw_body, document_dir, assets).await?;

    let title = front
        .title
        .or_else(|| first_heading(raw_body))
        .or_else(|| file_stem(document_path))
        .unwrap_or_default();

    let author = front
        .author
        .or_else(|| defaults.author.clone())
        .unwrap_or_default();

    let digest = front
        .digest
        .or_else(|| defaults.digest.clone())
        .or_else(|| digest_preview(raw_body))
        .unwrap_or_default();

    let cover_ref = resolve_cover(front.cover.as_deref(), document_path, document_dir, assets)
        .await
        .map(|asset| asset.media_ref);

    Ok(ResolvedDocument {
        title,
        body,
        digest,
        author,
        cover_ref,
    })
}

/// Split a leading `---` YAML block off the source, if present.
fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix("---\n").or_else(|| raw.strip_prefix("---\r\n")) else {
        return (None, raw);
    };

    for terminator in ["\n---\n", "\n---\r\n"] {
        if let Some(end) = rest.find(terminator) {
            return (Some(&rest[..end]), &rest[end + terminator.len()..]);
        }
    }
    if let Some(yaml) = rest.strip_suffix("\n---") {
        return (Some(yaml), "");
    }

    (None, raw)
}

/// Replace every Markdown image locator with its uploaded URL.
///
/// Each distinct locator is resolved once per document; repeated embeds of
/// the same asset reuse the first resolution.
async fn substitute_assets<S: SyncStore, R: RemoteApi>(
    raw_body: &str,
    document_dir: &Path,
    assets: &AssetResolver<'_, S, R>,
) -> Result<String> {
    let re = image_locator_regex();
    let mut resolved_cache: HashMap<String, ResolvedAsset> = HashMap::new();
    let mut body = String::with_capacity(raw_body.len());
    let mut last = 0;

    for captures in re.captures_iter(raw_body) {
        let Some(locator) = captures.get(1) else {
            continue;
        };

        let url = match resolved_cache.get(locator.as_str()) {
            Some(asset) => asset.url.clone(),
            None => {
                let asset = assets.resolve(locator.as_str(), document_dir).await?;
                let url = asset.url.clone();
                resolved_cache.insert(locator.as_str().to_string(), asset);
                url
            }
        };

        body.push_str(&raw_body[last..locator.start()]);
        body.push_str(&url);
        last = locator.end();
    }

    body.push_str(&raw_body[last..]);
    Ok(body)
}

/// Resolve the cover asset, best-effort.
///
/// Front matter's `cover:` wins; otherwise an image file sharing the
/// document's stem is probed. Any failure is logged and ignored.
async fn resolve_cover<S: SyncStore, R: RemoteApi>(
    explicit: Option<&str>,
    document_path: &Path,
    document_dir: &Path,
    assets: &AssetResolver<'_, S, R>,
) -> Option<ResolvedAsset> {
    let locator = match explicit {
        Some(locator) => locator.to_string(),
        None => conventional_cover(document_path, document_dir)?,
    };

    match assets.resolve(&locator, document_dir).await {
        Ok(asset) => Some(asset),
        Err(error) => {
            tracing::warn!(
                document = %document_path.display(),
                %locator,
                %error,
                "cover asset resolution failed, continuing without a cover"
            );
            None
        }
    }
}

fn conventional_cover(document_path: &Path, document_dir: &Path) -> Option<String> {
    let stem = document_path.file_stem()?.to_str()?;
    COVER_EXTENSIONS.iter().find_map(|ext| {
        let name = format!("{stem}.{ext}");
        document_dir.join(&name).is_file().then_some(name)
    })
}

fn image_locator_regex() -> Regex {
    Regex::new(r#"!\[[^\]]*\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#).expect("Invalid regex")
}

fn first_heading(body: &str) -> Option<String> {
    body.lines().find_map(|line| {
        line.strip_prefix("# ")
            .map(|heading| heading.trim().to_string())
    })
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// First non-empty, non-heading, non-image line, truncated for a summary.
fn digest_preview(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("!["))
        .map(|line| line.chars().take(DIGEST_PREVIEW_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SqliteSyncStore};
    use crate::error::Error;
    use crate::test_support::{png_bytes, MockRemote};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_split_front_matter() {
        let (front, body) = split_front_matter("---\ntitle: Hi\n---\nBody");
        assert_eq!(front, Some("title: Hi"));
        assert_eq!(body, "Body");

        let (front, body) = split_front_matter("No front matter");
        assert!(front.is_none());
        assert_eq!(body, "No front matter");
    }

    #[test]
    fn test_first_heading_and_digest_preview() {
        let body = "# Title line\n\nFirst paragraph here.\nMore.";
        assert_eq!(first_heading(body), Some("Title line".into()));
        assert_eq!(digest_preview(body), Some("First paragraph here.".into()));
    }

    #[tokio::test]
    async fn test_resolve_substitutes_image_urls() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        write(tmp.path(), "pic.png", &png_bytes());
        let doc = write(
            tmp.path(),
            "post.md",
            b"---\ntitle: With image\n---\nIntro\n\n![alt](pic.png)\n",
        );
        let raw = std::fs::read_to_string(&doc).unwrap();

        let resolved = resolve_document(&raw, &doc, &DocumentDefaults::default(), &assets)
            .await
            .unwrap();

        assert_eq!(resolved.title, "With image");
        assert!(resolved.body.contains("https://media.example.com/"));
        assert!(!resolved.body.contains("(pic.png)"));
        assert_eq!(remote.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_locator_resolves_once() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        write(tmp.path(), "pic.png", &png_bytes());
        let doc = write(
            tmp.path(),
            "post.md",
            b"![one](pic.png)\n![two](pic.png)\n",
        );
        let raw = std::fs::read_to_string(&doc).unwrap();

        resolve_document(&raw, &doc, &DocumentDefaults::default(), &assets)
            .await
            .unwrap();
        assert_eq!(remote.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_front_matter() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        let doc = write(tmp.path(), "untitled.md", b"Just a paragraph.\n");
        let raw = std::fs::read_to_string(&doc).unwrap();

        let defaults = DocumentDefaults {
            author: Some("Cato".into()),
            digest: None,
        };
        let resolved = resolve_document(&raw, &doc, &defaults, &assets).await.unwrap();

        assert_eq!(resolved.title, "untitled");
        assert_eq!(resolved.author, "Cato");
        assert_eq!(resolved.digest, "Just a paragraph.");
    }

    #[tokio::test]
    async fn test_conventional_cover_is_picked_up() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        write(tmp.path(), "post.png", &png_bytes());
        let doc = write(tmp.path(), "post.md", b"# Post\n\nBody.\n");
        let raw = std::fs::read_to_string(&doc).unwrap();

        let resolved = resolve_document(&raw, &doc, &DocumentDefaults::default(), &assets)
            .await
            .unwrap();
        assert!(resolved.cover_ref.is_some());
        assert_eq!(remote.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_broken_cover_is_non_fatal() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        let doc = write(
            tmp.path(),
            "post.md",
            b"---\ncover: missing.png\n---\nBody.\n",
        );
        let raw = std::fs::read_to_string(&doc).unwrap();

        let resolved = resolve_document(&raw, &doc, &DocumentDefaults::default(), &assets)
            .await
            .unwrap();
        assert!(resolved.cover_ref.is_none());
    }

    #[tokio::test]
    async fn test_broken_inline_asset_is_fatal() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSyncStore::new(db.connection());
        let remote = MockRemote::new();
        let assets = AssetResolver::new(&store, &remote);

        let tmp = tempdir().unwrap();
        let doc = write(tmp.path(), "post.md", b"![x](missing.png)\n");
        let raw = std::fs::read_to_string(&doc).unwrap();

        let result = resolve_document(&raw, &doc, &DocumentDefaults::default(), &assets).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
