use std::path::Path;

use inkwell_core::db::{Database, SqliteSyncStore};
use inkwell_core::remote::HttpRemoteClient;
use inkwell_core::resolve::DocumentDefaults;
use inkwell_core::SyncEngine;

use crate::error::CliError;

pub async fn run_publish(
    db: &Database,
    remote: &HttpRemoteClient,
    defaults: &DocumentDefaults,
    path: &Path,
) -> Result<(), CliError> {
    let store = SqliteSyncStore::new(db.connection());
    let engine = SyncEngine::new(&store, remote, defaults.clone());

    let token = engine.publish_document(path).await?;
    println!("published {} (publication {token})", path.display());
    Ok(())
}
