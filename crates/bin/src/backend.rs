//! Document file loading and saving.

use std::path::{Path, PathBuf};

use binderkit::backend::InMemory;

use crate::cli::StoreArgs;

const STORE_FILE: &str = "binders.json";

/// Path of the document file for `args`.
pub fn store_path(args: &StoreArgs) -> PathBuf {
    args.data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STORE_FILE)
}

/// Load the document file, starting empty when it does not exist yet.
pub async fn open_store(path: &Path) -> Result<InMemory, Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = InMemory::load_from_file(path)
        .await
        .map_err(|e| format!("Failed to load {}: {e}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        documents = store.len().await,
        "opened document file"
    );
    Ok(store)
}

/// Write every document back to disk.
pub async fn save_store(store: &InMemory, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    store.save_to_file(path).await?;
    tracing::debug!(path = %path.display(), "saved document file");
    Ok(())
}
