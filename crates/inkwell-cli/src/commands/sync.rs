use std::path::Path;

use inkwell_core::db::{Database, SqliteSyncStore};
use inkwell_core::remote::HttpRemoteClient;
use inkwell_core::resolve::DocumentDefaults;
use inkwell_core::{SyncEngine, SyncMode};

use crate::error::CliError;

pub async fn run_sync(
    db: &Database,
    remote: &HttpRemoteClient,
    defaults: &DocumentDefaults,
    path: &Path,
    publish: bool,
) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::DocumentNotFound(path.to_path_buf()));
    }

    let store = SqliteSyncStore::new(db.connection());
    let engine = SyncEngine::new(&store, remote, defaults.clone());
    let mode = if publish {
        SyncMode::CreateAndPublish
    } else {
        SyncMode::Create
    };

    let report = engine.sync_all(path, mode).await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => {
                let mut line = format!("{} {}", result.action, outcome.path.display());
                if let Some(draft) = &result.draft_token {
                    line.push_str(&format!(" (draft {draft}"));
                    if let Some(publication) = &result.publication_token {
                        line.push_str(&format!(", publication {publication}"));
                    }
                    line.push(')');
                }
                println!("{line}");
            }
            Err(error) => println!("failed {}: {error}", outcome.path.display()),
        }
    }

    let stats = report.stats;
    println!(
        "{} created, {} updated, {} skipped, {} failed",
        stats.created, stats.updated, stats.skipped, stats.failed
    );

    if report.has_failures() {
        return Err(CliError::DocumentsFailed {
            failed: stats.failed,
            total: stats.total(),
        });
    }
    Ok(())
}
