use std::collections::HashSet;

use proptest::prelude::*;
use puzzlekit_core::PieceId;
use puzzlekit_layout::{point, Layout, Piece};

use crate::common::{close, piece, placed_layout, rectangle};

#[test]
fn test_unique_ids_across_imports() {
    let mut layout = Layout::default();
    let mut front = rectangle("front", 40.0, 40.0);
    front.quantity = 2;
    let mut back = rectangle("back", 40.0, 40.0);
    back.quantity = 3;

    let mut ids = layout.import_piece(&front);
    ids.extend(layout.import_piece(&back));
    ids.extend(layout.import_piece(&front));

    let unique: HashSet<&PieceId> = ids.iter().collect();
    assert_eq!(layout.piece_count(), 5);
    assert_eq!(unique.len(), 5);
}

#[test]
fn test_reimport_keeps_placement() {
    let (mut layout, sheet, ids) = placed_layout(1);
    let before = *piece(&layout, &ids[0]).transform();

    let mut updated = rectangle("piece0", 50.0, 30.0);
    updated.name = "Renamed".into();
    layout.add_piece(Piece::new(&updated));

    let p = piece(&layout, &ids[0]);
    assert_eq!(p.name(), "Renamed");
    assert_eq!(*p.transform(), before);
    assert_eq!(p.sheet(), Some(sheet));
}

#[test]
fn test_membership_is_exclusive() {
    let (mut layout, sheet, ids) = placed_layout(3);
    let trash = layout.trash_sheet().id();
    layout.set_piece_sheet(&ids[1], Some(trash));
    layout.set_piece_sheet(&ids[2], None);

    for id in &ids {
        let owner = piece(&layout, id).sheet();
        let matches = [
            owner.is_none(),
            owner == Some(trash),
            owner == Some(sheet),
        ];
        assert_eq!(matches.iter().filter(|m| **m).count(), 1);
    }

    assert_eq!(layout.placed_pieces().len(), 1);
    assert_eq!(layout.trashed_pieces().len(), 1);
    assert_eq!(layout.unplaced_pieces().len(), 1);
}

#[test]
fn test_unknown_sheet_is_rejected() {
    let (mut layout, sheet, ids) = placed_layout(1);
    assert!(!layout.set_piece_sheet(&ids[0], Some(puzzlekit_core::SheetId::new())));
    assert_eq!(piece(&layout, &ids[0]).sheet(), Some(sheet));
}

proptest! {
    #[test]
    fn prop_clear_transformations_resets_to_origin(
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
        angle in -360.0f64..360.0,
        flip in any::<bool>(),
    ) {
        let (mut layout, _, ids) = placed_layout(1);
        let id = &ids[0];
        layout.translate_piece(id, dx, dy);
        layout.rotate_piece(id, &point(dx, dy), angle);
        if flip {
            layout.flip_piece_horizontally(id);
        }

        layout.clear_piece_transformations(id);
        let top_left = piece(&layout, id).mapped_bounding_rect().top_left();
        prop_assert!(close(top_left, point(0.0, 0.0)), "{top_left:?}");
    }
}
