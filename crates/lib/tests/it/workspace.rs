//! Workspace session management and local persistence.

use std::sync::Arc;

use binderkit::{
    BinderId, ErrorKind, Placement, Workspace, WorkspaceConfig,
    backend::{DocumentStore, InMemory},
    store::MoveMode,
    sync::SyncStatus,
};

use crate::helpers::{card, test_clock};

fn workspace_with(local: Arc<InMemory>) -> Workspace {
    Workspace::new(
        WorkspaceConfig::for_owner("alice").with_writer_id("laptop"),
        local,
        test_clock(),
    )
}

#[tokio::test]
async fn test_create_opens_and_activates() {
    let mut ws = workspace_with(Arc::new(InMemory::new()));
    let first = ws.create_binder("First", None).unwrap();
    let second = ws.create_binder("Second", Some("5x5")).unwrap();

    let first_id = first.lock().await.id().clone();
    let second_id = second.lock().await.id().clone();
    assert_eq!(ws.active_id(), Some(&second_id));
    assert_eq!(ws.open_binders().count(), 2);
    assert_eq!(second.lock().await.grid().cards_per_page(), 25);
    assert_eq!(first.lock().await.settings().grid_size, "3x3");

    ws.switch_to(&first_id).unwrap();
    assert_eq!(ws.active_id(), Some(&first_id));

    ws.close(&first_id).unwrap();
    assert!(ws.active().is_none());
    let err = ws.switch_to(&first_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unknown_grid_is_rejected() {
    let mut ws = workspace_with(Arc::new(InMemory::new()));
    let err = ws.create_binder("Odd", Some("6x1")).unwrap_err();
    assert!(err.is_unknown_grid_size());
    assert_eq!(ws.open_binders().count(), 0);
}

#[tokio::test]
async fn test_local_round_trip_keeps_history() {
    let local = Arc::new(InMemory::new());
    let mut ws = workspace_with(local.clone());
    let binder = ws.create_binder("Keepers", None).unwrap();
    let id = {
        let mut binder = binder.lock().await;
        binder.add_card(card("A"), Placement::FirstEmpty).unwrap();
        binder.add_card(card("B"), Placement::FirstEmpty).unwrap();
        binder.move_card(0, 1, MoveMode::Swap).unwrap();
        binder.id().clone()
    };
    let saved = binder.lock().await.to_document();

    ws.save_local(&id).await.unwrap();
    assert_eq!(local.keys().await, vec![format!("local_alice_{id}")]);

    let mut restored_ws = workspace_with(local.clone());
    let restored = restored_ws.load_local(&id).await.unwrap();
    let mut restored = restored.lock().await;
    assert_eq!(restored.to_document(), saved);
    assert_eq!(restored.history().len(), 3);
    assert_eq!(restored.status(), SyncStatus::Local);

    restored.undo().unwrap();
    assert_eq!(restored.store().get(0).unwrap().name(), "A");
}

#[tokio::test]
async fn test_load_local_errors() {
    let mut ws = workspace_with(Arc::new(InMemory::new()));
    let err = ws.load_local(&BinderId::from("missing")).await.unwrap_err();
    assert!(err.is_not_found());

    let binder = ws.create_binder("Open", None).unwrap();
    let id = binder.lock().await.id().clone();
    ws.save_local(&id).await.unwrap();
    let err = ws.load_local(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_load_local_rejects_corrupt_history() {
    let local = Arc::new(InMemory::new());
    let mut ws = workspace_with(local.clone());
    let binder = ws.create_binder("Damaged", None).unwrap();
    let id = {
        let mut binder = binder.lock().await;
        binder.add_card(card("A"), Placement::FirstEmpty).unwrap();
        binder.id().clone()
    };
    ws.save_local(&id).await.unwrap();
    let key = format!("local_alice_{id}");
    let saved = local.get_document(&key).await.unwrap().unwrap();

    for (field, value) in [("limit", serde_json::json!(0)), ("cursor", serde_json::json!(7))] {
        let mut record = saved.clone();
        record["history"][field] = value;
        local.put_document(&key, record).await.unwrap();

        let mut restored_ws = workspace_with(local.clone());
        let err = restored_ws.load_local(&id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage, "{field}");
        assert_eq!(restored_ws.open_binders().count(), 0);
    }
}

#[tokio::test]
async fn test_save_all_writes_every_open_binder() {
    let local = Arc::new(InMemory::new());
    let mut ws = workspace_with(local.clone());
    for name in ["One", "Two", "Three"] {
        ws.create_binder(name, None).unwrap();
    }
    assert_eq!(ws.save_all().await.unwrap(), 3);
    assert_eq!(local.len().await, 3);

    let id = ws.active_id().unwrap().clone();
    ws.delete_local(&id).await.unwrap();
    assert_eq!(local.len().await, 2);
    assert!(local.get_document(&ws.local_key(&id)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_checkout_opens_remote_binder() {
    let remote = Arc::new(InMemory::new());
    let mut laptop = workspace_with(Arc::new(InMemory::new()));
    let binder = laptop.create_binder("Shared", None).unwrap();
    binder
        .lock()
        .await
        .add_card(card("A"), Placement::FirstEmpty)
        .unwrap();
    laptop.coordinator(remote.clone()).push(&binder).await.unwrap();
    let id = binder.lock().await.id().clone();

    let mut phone = Workspace::new(
        WorkspaceConfig::for_owner("alice").with_writer_id("phone"),
        Arc::new(InMemory::new()),
        test_clock(),
    );
    let coordinator = phone.coordinator(remote.clone());
    let opened = phone.checkout(&coordinator, &id).await.unwrap();
    assert_eq!(opened.lock().await.store().len(), 1);

    let err = phone.checkout(&coordinator, &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
