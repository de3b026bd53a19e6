use std::path::Path;

use inkwell_core::db::{Database, SqliteSyncStore};
use inkwell_core::remote::HttpRemoteClient;
use inkwell_core::resolve::DocumentDefaults;
use inkwell_core::SyncEngine;

use crate::confirm::Confirmer;
use crate::error::CliError;

pub async fn run_delete(
    db: &Database,
    remote: &HttpRemoteClient,
    defaults: &DocumentDefaults,
    path: &Path,
    confirmer: &dyn Confirmer,
) -> Result<(), CliError> {
    let prompt = format!("Delete the published article for {}?", path.display());
    if !confirmer.ask(&prompt) {
        return Err(CliError::Aborted);
    }

    let store = SqliteSyncStore::new(db.connection());
    let engine = SyncEngine::new(&store, remote, defaults.clone());

    engine.delete_published_document(path).await?;
    println!("deleted publication for {}", path.display());
    Ok(())
}
