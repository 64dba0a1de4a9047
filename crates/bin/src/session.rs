//! One CLI invocation's view of the document file.
//!
//! The file plays the remote role: binders are checked out of it, edited in
//! a [`Workspace`] and pushed back before the file is rewritten.

use std::{path::PathBuf, sync::Arc};

use binderkit::{
    BinderId, SharedBinder, SystemClock, Workspace, WorkspaceConfig,
    backend::{DocumentStore, InMemory},
    binder::BinderDocument,
    sync::{PushOutcome, SyncCoordinator},
};

use crate::{backend, cli::StoreArgs};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub struct Session {
    store: Arc<InMemory>,
    path: PathBuf,
    workspace: Workspace,
    coordinator: SyncCoordinator,
}

impl Session {
    pub async fn open(args: &StoreArgs) -> CliResult<Self> {
        let path = backend::store_path(args);
        let store = Arc::new(backend::open_store(&path).await?);
        let config = WorkspaceConfig::for_owner(args.owner.clone())
            .with_writer_id(format!("cli-{}", std::process::id()))
            .with_default_grid_size(args.grid.clone());
        // Drafts are not kept between invocations.
        let workspace = Workspace::new(config, Arc::new(InMemory::new()), Arc::new(SystemClock));
        let coordinator = workspace.coordinator(store.clone());
        Ok(Self {
            store,
            path,
            workspace,
            coordinator,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Open a stored binder for editing.
    pub async fn checkout(&mut self, id: &str) -> CliResult<SharedBinder> {
        let id = BinderId::new(id);
        Ok(self.workspace.checkout(&self.coordinator, &id).await?)
    }

    /// Push `binder` and rewrite the document file.
    pub async fn commit(&self, binder: &SharedBinder) -> CliResult<PushOutcome> {
        let outcome = self.coordinator.push(binder).await?;
        backend::save_store(&self.store, &self.path).await?;
        Ok(outcome)
    }

    /// Every stored binder document of the session's owner, by key.
    pub async fn documents(&self) -> CliResult<Vec<BinderDocument>> {
        let prefix = format!("{}_", self.workspace.config().owner_id);
        let mut documents = Vec::new();
        for key in self.store.keys().await {
            if !key.starts_with(&prefix) {
                continue;
            }
            let Some(value) = self.store.get_document(&key).await? else {
                continue;
            };
            match BinderDocument::from_value(value) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable binder document"),
            }
        }
        Ok(documents)
    }
}
