//! Clipboard transfers between binders.

use std::sync::Arc;

use binderkit::{
    CardData, CardEntry, ErrorKind, Placement, Workspace, WorkspaceConfig,
    backend::InMemory, clipboard::Clipboard,
};

use crate::helpers::{card, test_clock};

fn workspace() -> Workspace {
    Workspace::new(
        WorkspaceConfig::for_owner("alice"),
        Arc::new(InMemory::new()),
        test_clock(),
    )
}

#[test]
fn test_take_until_exhausted() {
    let mut clipboard = Clipboard::new();
    let x = card("X");
    clipboard.put(x.clone());
    clipboard.put(x.reissue());
    assert_eq!(clipboard.len(), 1);
    assert_eq!(clipboard.total_units(), 2);

    assert_eq!(clipboard.take(0).unwrap().card_id(), x.card_id());
    assert_eq!(clipboard.take(0).unwrap().card_id(), x.card_id());
    assert!(clipboard.get(0).is_none());

    let err: binderkit::Error = clipboard.take(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_variants_are_staged_separately() {
    let mut clipboard = Clipboard::new();
    clipboard.put(CardEntry::new("x", CardData::named("X")));
    clipboard.put(CardEntry::new("x", CardData::named("X").with_variant("foil")));
    clipboard.put(CardEntry::new("x", CardData::named("X")));

    assert_eq!(clipboard.len(), 2);
    assert_eq!(clipboard.get(0).unwrap().count, 2);
    assert_eq!(clipboard.get(1).unwrap().card.variant(), Some("foil"));
}

#[tokio::test]
async fn test_cut_survives_binder_switch() {
    let mut ws = workspace();
    let source = ws.create_binder("Source", None).unwrap();
    let source_id = source.lock().await.id().clone();
    let target = ws.create_binder("Target", Some("4x4")).unwrap();
    let target_id = target.lock().await.id().clone();

    source
        .lock()
        .await
        .add_card(card("Pikachu"), Placement::At(3))
        .unwrap();
    ws.switch_to(&source_id).unwrap();
    ws.cut(&source_id, 3).await.unwrap();
    assert!(source.lock().await.store().is_empty());
    assert_eq!(ws.clipboard().total_units(), 1);

    ws.switch_to(&target_id).unwrap();
    let position = ws
        .paste(&target_id, 0, Placement::FirstEmpty)
        .await
        .unwrap();

    assert_eq!(position, 0);
    assert!(ws.clipboard().is_empty());
    let target = target.lock().await;
    assert_eq!(target.store().get(0).unwrap().name(), "Pikachu");
    assert_eq!(target.history().len(), 1);
}

#[tokio::test]
async fn test_paste_twice_gives_distinct_instances() {
    let mut ws = workspace();
    let binder = ws.create_binder("Dupes", None).unwrap();
    let id = binder.lock().await.id().clone();
    let x = card("X");
    ws.clipboard_mut().put(x.clone());
    ws.clipboard_mut().put(x.reissue());

    let first = ws.paste(&id, 0, Placement::FirstEmpty).await.unwrap();
    let second = ws.paste(&id, 0, Placement::FirstEmpty).await.unwrap();

    let binder = binder.lock().await;
    let a = binder.store().get(first).unwrap();
    let b = binder.store().get(second).unwrap();
    assert_eq!(a.card_id(), b.card_id());
    assert_ne!(a.instance_id(), b.instance_id());
}

#[tokio::test]
async fn test_rejected_paste_keeps_clipboard() {
    let config = WorkspaceConfig::for_owner("guest").with_max_cards(Some(1));
    let mut ws = Workspace::new(config, Arc::new(InMemory::new()), test_clock());
    let binder = ws.create_binder("Guest", None).unwrap();
    let id = binder.lock().await.id().clone();
    binder
        .lock()
        .await
        .add_card(card("A"), Placement::FirstEmpty)
        .unwrap();
    ws.clipboard_mut().put(card("B"));

    let err = ws
        .paste(&id, 0, Placement::FirstEmpty)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(ws.clipboard().total_units(), 1);
    assert_eq!(binder.lock().await.store().len(), 1);
}

#[tokio::test]
async fn test_paste_from_missing_index() {
    let mut ws = workspace();
    let binder = ws.create_binder("Empty", None).unwrap();
    let id = binder.lock().await.id().clone();
    let err = ws.paste(&id, 0, Placement::FirstEmpty).await.unwrap_err();
    assert!(err.is_not_found());
}
