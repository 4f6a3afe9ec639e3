use puzzlekit_core::{PieceId, SheetId};
use puzzlekit_layout::{
    point, Layout, LayoutCommand, LayoutDocument, Sheet, Transform2D, TransformationOrigin,
    UndoStack, ZValueMove,
};

use crate::common::{piece, placed_layout};

type PieceState = (PieceId, Transform2D, Option<SheetId>, f64);

fn snapshot(layout: &Layout) -> Vec<PieceState> {
    layout
        .pieces()
        .into_iter()
        .map(|p| (p.unique_id(), *p.transform(), p.sheet(), p.z_value()))
        .collect()
}

fn assert_inverse(layout: &mut Layout, mut command: LayoutCommand) {
    let before = snapshot(layout);
    command.redo(layout);
    command.undo(layout);
    assert_eq!(snapshot(layout), before, "{}", command.text());
}

#[test]
fn test_every_command_undoes_exactly() {
    let (mut layout, sheet, ids) = placed_layout(3);
    layout.set_follow_grainline(true);
    let second = layout.create_sheet("Sheet 2");
    let origin = TransformationOrigin::new(point(60.0, 40.0), false);

    let commands = vec![
        LayoutCommand::move_piece(&layout, &ids[0], 12.5, -4.0, false).unwrap(),
        LayoutCommand::move_pieces(&layout, &ids, 3.0, 7.0, false).unwrap(),
        LayoutCommand::rotate_piece(&layout, &ids[1], origin, 33.0, false).unwrap(),
        LayoutCommand::rotate_pieces(&layout, &ids, origin, -15.0, false).unwrap(),
        LayoutCommand::move_on_sheet(&layout, &ids[2], Some(second)).unwrap(),
        LayoutCommand::move_on_sheet(&layout, &ids[2], None).unwrap(),
        LayoutCommand::z_value_move_piece(&layout, &ids[0], ZValueMove::Top).unwrap(),
        LayoutCommand::z_value_move_pieces(&layout, &ids[1..], ZValueMove::Bottom).unwrap(),
        LayoutCommand::remove_sheet(&layout, sheet).unwrap(),
    ];

    for command in commands {
        assert_inverse(&mut layout, command);
    }
}

#[test]
fn test_three_moves_merge_into_one_step() {
    let (mut layout, _, ids) = placed_layout(1);
    let start = piece(&layout, &ids[0]).mapped_bounding_rect().top_left();
    let mut stack = UndoStack::new();

    for (dx, dy) in [(1.0, 2.0), (3.0, -1.0), (-0.5, 4.0)] {
        let cmd = LayoutCommand::move_piece(&layout, &ids[0], dx, dy, true).unwrap();
        stack.push(cmd, &mut layout);
    }

    assert_eq!(stack.undo_count(), 1);
    let moved = piece(&layout, &ids[0]).mapped_bounding_rect().top_left();
    assert!((moved.x - start.x - 3.5).abs() < 1e-9);
    assert!((moved.y - start.y - 5.0).abs() < 1e-9);

    assert!(stack.undo(&mut layout));
    assert_eq!(piece(&layout, &ids[0]).mapped_bounding_rect().top_left(), start);
    assert!(!stack.can_undo());
}

#[test]
fn test_remove_sheet_unplaces_and_restores() {
    let (layout, sheet, ids) = placed_layout(3);
    let mut doc = LayoutDocument {
        layout,
        history: UndoStack::new(),
    };

    let remove = LayoutCommand::remove_sheet(&doc.layout, sheet).unwrap();
    doc.execute(remove);

    for id in &ids {
        assert_eq!(piece(&doc.layout, id).sheet(), None);
    }
    let hidden = doc.layout.sheet(sheet).expect("still retrievable");
    assert!(!hidden.is_visible());
    assert!(doc.layout.sheets().is_empty());

    assert!(doc.undo());
    for id in &ids {
        assert_eq!(piece(&doc.layout, id).sheet(), Some(sheet));
    }
    assert!(doc.layout.sheet(sheet).unwrap().is_visible());
    assert_eq!(doc.layout.focused_sheet_id(), Some(sheet));
}

#[test]
fn test_separate_rotations_as_one_macro() {
    let (mut layout, _, ids) = placed_layout(3);
    let before = snapshot(&layout);
    let mut stack = UndoStack::new();

    let commands: Vec<LayoutCommand> = ids
        .iter()
        .map(|id| {
            let center = piece(&layout, id).mapped_bounding_rect().center();
            LayoutCommand::rotate_piece(&layout, id, TransformationOrigin::new(center, false), 90.0, false)
                .unwrap()
        })
        .collect();
    stack.push_macro("rotate pieces separately", commands, &mut layout);

    assert_eq!(stack.undo_count(), 1);
    assert_eq!(stack.undo_text(), Some("rotate pieces separately"));
    assert_ne!(snapshot(&layout), before);

    stack.undo(&mut layout);
    assert_eq!(snapshot(&layout), before);
}

#[test]
fn test_add_sheet_then_move_piece_there() {
    let (layout, first, ids) = placed_layout(1);
    let mut doc = LayoutDocument {
        layout,
        history: UndoStack::new(),
    };
    let extra = Sheet::new("Sheet 2", doc.layout.settings());
    let extra_id = extra.id();

    doc.execute(LayoutCommand::add_sheet(&doc.layout, extra).unwrap());
    doc.execute(LayoutCommand::move_on_sheet(&doc.layout, &ids[0], Some(extra_id)).unwrap());
    assert_eq!(piece(&doc.layout, &ids[0]).sheet(), Some(extra_id));
    assert_eq!(doc.layout.focused_sheet_id(), Some(extra_id));

    doc.undo();
    doc.undo();
    assert_eq!(piece(&doc.layout, &ids[0]).sheet(), Some(first));
    assert_eq!(doc.layout.sheets().len(), 1);

    doc.redo();
    doc.redo();
    assert_eq!(piece(&doc.layout, &ids[0]).sheet(), Some(extra_id));
    assert_eq!(doc.layout.sheets().len(), 2);
}

#[test]
fn test_duplicate_sheet_command_is_refused() {
    let (layout, sheet, _) = placed_layout(0);
    let copy = layout.sheet(sheet).unwrap().clone();
    let err = LayoutCommand::add_sheet(&layout, copy).unwrap_err();
    assert!(matches!(
        err,
        puzzlekit_core::Error::Layout(puzzlekit_core::LayoutError::DuplicateSheet { .. })
    ));
}
