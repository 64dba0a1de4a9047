//! PositionalCardStore integration tests.

use binderkit::{
    ErrorKind, GridRegistry,
    store::{BulkMode, MoveMode, Placement},
};

use crate::helpers::{assert_unique_instances, card, layout, new_binder, store_with, test_clock};

fn three_by_three() -> binderkit::GridSize {
    GridRegistry::default().get("3x3").unwrap()
}

fn at(cards: &[(usize, &str)]) -> Vec<(usize, String)> {
    cards.iter().map(|(p, n)| (*p, n.to_string())).collect()
}

#[test]
fn test_swap_exchanges_occupants() {
    let mut store = store_with(&[(0, "A"), (1, "B"), (2, "C")], 3);
    store.move_card(0, 2, MoveMode::Swap).unwrap();
    assert_eq!(layout(&store), at(&[(0, "C"), (1, "B"), (2, "A")]));
}

#[test]
fn test_swap_with_empty_slot_moves_card() {
    let mut store = store_with(&[(0, "A")], 5);
    store.move_card(0, 4, MoveMode::Swap).unwrap();
    assert_eq!(layout(&store), at(&[(4, "A")]));
}

#[test]
fn test_shift_leaves_cards_outside_range_untouched() {
    let mut store = store_with(&[(0, "A"), (3, "B")], 4);
    store.move_card(0, 1, MoveMode::Shift).unwrap();
    assert_eq!(layout(&store), at(&[(1, "A"), (3, "B")]));
}

#[test]
fn test_shift_forward_pulls_intervening_cards_back() {
    let mut store = store_with(&[(0, "A"), (1, "B"), (2, "C"), (3, "D")], 4);
    store.move_card(0, 2, MoveMode::Shift).unwrap();
    assert_eq!(
        layout(&store),
        at(&[(0, "B"), (1, "C"), (2, "A"), (3, "D")])
    );
}

#[test]
fn test_shift_backward_pushes_intervening_cards_forward() {
    let mut store = store_with(&[(0, "A"), (1, "B"), (2, "C"), (3, "D")], 4);
    store.move_card(3, 1, MoveMode::Shift).unwrap();
    assert_eq!(
        layout(&store),
        at(&[(0, "A"), (1, "D"), (2, "B"), (3, "C")])
    );
}

#[test]
fn test_move_rejects_positions_outside_extent() {
    let mut store = store_with(&[(0, "A")], 3);
    let err = store.move_card(0, 3, MoveMode::Shift).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPosition);
    assert_eq!(layout(&store), at(&[(0, "A")]));
}

#[test]
fn test_shift_from_empty_slot_fails() {
    let mut store = store_with(&[(0, "A")], 3);
    let err = store.move_card(1, 2, MoveMode::Shift).unwrap_err();
    assert!(err.is_slot_empty());
}

#[test]
fn test_add_into_occupied_slot_shifts_following_cards() {
    let mut store = store_with(&[(0, "A"), (1, "B"), (4, "C")], 5);
    let position = store.add(card("X"), Placement::At(1), None).unwrap();
    assert_eq!(position, 1);
    assert_eq!(
        layout(&store),
        at(&[(0, "A"), (1, "X"), (2, "B"), (5, "C")])
    );
}

#[test]
fn test_add_many_into_occupied_run_shifts_by_count() {
    let mut store = store_with(&[(0, "A"), (1, "B")], 2);
    let position = store
        .add_many(vec![card("X"), card("Y")], Placement::At(1), None)
        .unwrap();
    assert_eq!(position, 1);
    assert_eq!(
        layout(&store),
        at(&[(0, "A"), (1, "X"), (2, "Y"), (3, "B")])
    );
}

#[test]
fn test_add_past_last_addressable_slot_is_rejected() {
    let mut store = store_with(&[(0, "A"), (1, "B")], 2);
    let err = store
        .add_many(vec![card("X"), card("Y")], Placement::At(usize::MAX), None)
        .unwrap_err();
    assert!(err.is_invalid_position());

    let err = store
        .add(card("X"), Placement::At(usize::MAX), None)
        .unwrap_err();
    assert!(err.is_invalid_position());
    assert_eq!(layout(&store), at(&[(0, "A"), (1, "B")]));
    assert_eq!(store.extent(), 2);
}

#[test]
fn test_add_beyond_occupied_range_keeps_gap_empty() {
    let mut store = store_with(&[(0, "A")], 1);
    store.add(card("Z"), Placement::At(12), None).unwrap();
    assert_eq!(layout(&store), at(&[(0, "A"), (12, "Z")]));
    assert_eq!(store.extent(), 13);
    assert!((1..12).all(|p| !store.is_occupied(p)));
}

#[test]
fn test_add_prefers_page_window_then_falls_back() {
    let grid = three_by_three();
    let mut store = store_with(&[(0, "A")], 9);

    let on_page = store
        .add(card("B"), Placement::on_page(&grid, 1), None)
        .unwrap();
    assert_eq!(on_page, 9);

    // Fill page 1 (slots 9..=26), then ask for it again.
    for i in 0..17 {
        store
            .add(card(&format!("F{i}")), Placement::on_page(&grid, 1), None)
            .unwrap();
    }
    let fallback = store
        .add(card("Late"), Placement::on_page(&grid, 1), None)
        .unwrap();
    assert_eq!(fallback, 1);
}

#[test]
fn test_add_rejects_ceiling_without_change() {
    let mut store = store_with(&[(0, "A"), (1, "B")], 2);
    let before = store.snapshot();
    let err = store
        .add(card("C"), Placement::FirstEmpty, Some(2))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_add_rejects_instance_already_placed() {
    let mut store = store_with(&[(0, "A")], 1);
    let placed = store.get(0).unwrap().clone();
    let err = store.add(placed, Placement::At(5), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateInstance);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_remove_leaves_hole() {
    let mut store = store_with(&[(0, "A"), (1, "B"), (2, "C")], 3);
    let removed = store.remove(1).unwrap();
    assert_eq!(removed.name(), "B");
    assert_eq!(layout(&store), at(&[(0, "A"), (2, "C")]));

    let err = store.remove(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SlotEmpty);
}

#[test]
fn test_bulk_insert_keeps_order_and_count() {
    let grid = three_by_three();
    let mut store = store_with(
        &[(0, "A"), (2, "B"), (5, "C"), (9, "D"), (10, "E")],
        27,
    );
    let report = store
        .bulk_move(&[5, 0, 2], 1, BulkMode::Insert, &grid)
        .unwrap();

    assert_eq!(report.target_position, 9);
    assert_eq!(report.placed, vec![9, 10, 11]);
    assert_eq!(
        layout(&store),
        at(&[(9, "A"), (10, "B"), (11, "C"), (12, "D"), (13, "E")])
    );
    assert_eq!(store.len(), 5);
    assert_unique_instances(&store);
}

#[test]
fn test_bulk_fill_skips_occupied_slots() {
    let grid = three_by_three();
    let mut store = store_with(&[(0, "A"), (1, "B"), (9, "X"), (11, "Y")], 27);
    let report = store
        .bulk_move(&[0, 1], 1, BulkMode::Fill, &grid)
        .unwrap();

    assert_eq!(report.placed, vec![10, 12]);
    assert_eq!(
        layout(&store),
        at(&[(9, "X"), (10, "A"), (11, "Y"), (12, "B")])
    );
}

/// Fill with no room left on or after the target page appends past the last
/// occupied slot rather than failing.
#[test]
fn test_bulk_fill_falls_back_to_appending() {
    let grid = GridRegistry::default().get("2x2").unwrap();
    // Page 1 of a 2x2 grid is slots 4..=11; fill it completely.
    let mut cards: Vec<(usize, String)> = (4..12).map(|p| (p, format!("P{p}"))).collect();
    cards.push((0, "Moving".to_string()));
    let refs: Vec<(usize, &str)> = cards.iter().map(|(p, n)| (*p, n.as_str())).collect();
    let mut store = store_with(&refs, 12);

    let report = store.bulk_move(&[0], 1, BulkMode::Fill, &grid).unwrap();

    assert_eq!(report.placed, vec![12]);
    assert_eq!(store.get(12).unwrap().name(), "Moving");
    assert_eq!(store.len(), 9);
}

#[test]
fn test_bulk_move_trims_slots_it_emptied() {
    let grid = three_by_three();
    let mut store = store_with(&[(0, "A"), (30, "B")], 31);
    store.bulk_move(&[30], 0, BulkMode::Insert, &grid).unwrap();
    assert_eq!(layout(&store), at(&[(0, "B"), (1, "A")]));
    assert_eq!(store.extent(), 2);
}

#[test]
fn test_bulk_move_keeps_blank_pages_past_last_card() {
    let grid = three_by_three();
    let mut store = store_with(&[(0, "A"), (1, "B")], 45);
    store.bulk_move(&[1], 0, BulkMode::Insert, &grid).unwrap();
    assert_eq!(layout(&store), at(&[(0, "B"), (1, "A")]));
    assert_eq!(store.extent(), 45);

    // Cards pushed past the old extent still widen it.
    let mut store = store_with(&[(0, "A"), (9, "B"), (10, "C")], 11);
    store.bulk_move(&[0], 1, BulkMode::Insert, &grid).unwrap();
    assert_eq!(layout(&store), at(&[(9, "A"), (10, "B"), (11, "C")]));
    assert_eq!(store.extent(), 12);
}

#[test]
fn test_binder_bulk_move_keeps_added_pages() {
    let mut binder = new_binder(test_clock());
    binder.add_card(card("A"), Placement::FirstEmpty).unwrap();
    binder.add_card(card("B"), Placement::FirstEmpty).unwrap();
    binder.add_page();
    binder.add_page();
    assert_eq!(binder.page_count(), 3);

    binder.bulk_move(&[1], 0, BulkMode::Insert).unwrap();

    assert_eq!(binder.page_count(), 3);
    assert_eq!(binder.store().extent(), 45);
    assert_eq!(binder.store().get(0).unwrap().name(), "B");
}

#[test]
fn test_bulk_move_with_empty_selection_fails_cleanly() {
    let grid = three_by_three();
    let mut store = store_with(&[(0, "A")], 9);
    let before = store.snapshot();
    let err = store
        .bulk_move(&[0, 4], 1, BulkMode::Insert, &grid)
        .unwrap_err();
    assert!(err.is_slot_empty());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_compact_page_only_touches_that_page() {
    let grid = three_by_three();
    let mut store = store_with(&[(1, "A"), (4, "B"), (12, "C"), (20, "D")], 27);
    let moved = store.compact_page(&grid, 1);
    assert_eq!(moved, 2);
    assert_eq!(
        layout(&store),
        at(&[(1, "A"), (4, "B"), (9, "C"), (10, "D")])
    );
}

#[test]
fn test_compact_binder_closes_every_hole() {
    let mut store = store_with(&[(1, "A"), (4, "B"), (12, "C")], 27);
    let moved = store.compact_binder();
    assert_eq!(moved, 3);
    assert_eq!(layout(&store), at(&[(0, "A"), (1, "B"), (2, "C")]));
    assert_eq!(store.extent(), 3);
    assert_eq!(store.compact_binder(), 0);
}

#[test]
fn test_instances_stay_unique_and_time_moves_forward() {
    let grid = three_by_three();
    let mut store = store_with(&[], 0);
    let mut last = store.last_modified();

    for i in 0..12 {
        store
            .add(card(&format!("C{i}")), Placement::FirstEmpty, None)
            .unwrap();
    }
    store.move_card(0, 7, MoveMode::Shift).unwrap();
    store.move_card(3, 11, MoveMode::Swap).unwrap();
    store.remove(5).unwrap();
    store
        .bulk_move(&[1, 2, 8], 2, BulkMode::Fill, &grid)
        .unwrap();
    store.compact_binder();

    assert_eq!(store.len(), 11);
    assert_unique_instances(&store);
    assert!(store.last_modified() > last);
    last = store.last_modified();
    store.compact_page(&grid, 0);
    assert!(store.last_modified() >= last);
}
