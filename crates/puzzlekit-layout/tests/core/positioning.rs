use proptest::prelude::*;
use puzzlekit_core::units::mm_to_px;
use puzzlekit_layout::geometry::paths_superposition;
use puzzlekit_layout::settings::{max_sticky_distance, min_sticky_distance};
use puzzlekit_layout::{
    point, Grainline, GrainlineArrow, GrainlineType, Layout, LayoutCommand, Point,
    TransformationOrigin,
};

use crate::common::{piece, placed_layout, rectangle};

fn gap_layout(gap_mm: f64) -> (Layout, Vec<puzzlekit_core::PieceId>) {
    let (mut layout, _, ids) = placed_layout(2);
    layout.set_sticky_edges(true);
    layout.set_pieces_gap(mm_to_px(gap_mm));
    (layout, ids)
}

fn horizontal_distance(layout: &Layout, left: &puzzlekit_core::PieceId, right: &puzzlekit_core::PieceId) -> f64 {
    piece(layout, right).mapped_bounding_rect().left() - piece(layout, left).mapped_bounding_rect().right()
}

#[test]
fn test_sticky_exact_gap_needs_nothing() {
    let (mut layout, ids) = gap_layout(5.0);
    let gap = layout.settings().pieces_gap;
    let right_x = piece(&layout, &ids[0]).mapped_bounding_rect().right() + gap;
    layout.set_piece_position(&ids[1], point(right_x, 20.0));

    assert!(layout.sticky_position(&ids[0]).is_none());
}

#[test]
fn test_sticky_half_zone_snaps_to_gap() {
    let (mut layout, ids) = gap_layout(10.0);
    let gap = layout.settings().pieces_gap;
    let extra_zone = (gap * 0.5).clamp(min_sticky_distance(), max_sticky_distance());
    let right_x = piece(&layout, &ids[0]).mapped_bounding_rect().right() + gap + extra_zone / 2.0;
    layout.set_piece_position(&ids[1], point(right_x, 20.0));

    let correction = layout.sticky_position(&ids[0]).expect("inside the sticky zone");
    layout.translate_piece(&ids[0], correction.x, correction.y);

    assert!((horizontal_distance(&layout, &ids[0], &ids[1]) - gap).abs() < 1e-6);
    assert!(layout.sticky_position(&ids[0]).is_none());
}

#[test]
fn test_gap_warning_flags_close_pieces() {
    let (mut layout, ids) = gap_layout(10.0);
    layout.set_warning_gap_position(true);
    let gap = layout.settings().pieces_gap;
    let right_x = piece(&layout, &ids[0]).mapped_bounding_rect().right() + gap / 2.0;
    layout.set_piece_position(&ids[1], point(right_x, 20.0));

    assert!(piece(&layout, &ids[0]).has_invalid_gap_position());
    assert!(piece(&layout, &ids[1]).has_invalid_gap_position());
    assert!(!piece(&layout, &ids[0]).has_superposition());
}

#[test]
fn test_superposition_warning_follows_moves() {
    let (mut layout, _, ids) = placed_layout(2);
    layout.set_warning_superposition(true);
    assert!(!piece(&layout, &ids[0]).has_superposition());

    layout.set_piece_position(&ids[1], point(40.0, 30.0));
    assert!(piece(&layout, &ids[0]).has_superposition());
    assert!(piece(&layout, &ids[1]).has_superposition());

    layout.set_piece_position(&ids[1], point(400.0, 30.0));
    assert!(!piece(&layout, &ids[0]).has_superposition());
}

#[test]
fn test_grainline_front_candidate_wins() {
    let mut layout = Layout::default();
    let sheet = layout.create_sheet("Sheet 1");
    layout.set_sheet_grainline_type(sheet, GrainlineType::Vertical);
    let origin = point(300.0, 200.0);
    layout.set_transformation_origin(sheet, TransformationOrigin::new(origin, false));

    // Grainline at 10 degrees: 80 degrees from vertical at the front arrow,
    // 100 degrees at the rear one.
    let direction = 10f64.to_radians();
    let mut source = rectangle("sleeve", 120.0, 60.0);
    source.grainline = Grainline::new(
        point(10.0, 30.0),
        point(10.0 + 100.0 * direction.cos(), 30.0 - 100.0 * direction.sin()),
        GrainlineArrow::Both,
    );
    let id = layout.import_piece(&source).remove(0);
    layout.set_piece_sheet(&id, Some(sheet));

    let before = *piece(&layout, &id).transform();
    let angle = layout.rotate_piece_to_grainline(&id).expect("grainline is usable");
    assert!((angle - 80.0).abs() < 1e-9, "{angle}");

    let line = piece(&layout, &id).mapped_grainline().unwrap();
    assert!((line.angle() - 90.0).abs() < 1e-9, "{}", line.angle());

    let mut expected = before;
    expected.rotate(&origin, 80.0);
    assert!(piece(&layout, &id).transform().approx_eq(&expected, 1e-9));
}

#[test]
fn test_grainline_needs_a_sheet() {
    let mut layout = Layout::default();
    let mut source = rectangle("cuff", 40.0, 20.0);
    source.grainline = Grainline::new(point(0.0, 10.0), point(40.0, 10.0), GrainlineArrow::Both);
    let id = layout.import_piece(&source).remove(0);
    assert!(layout.rotate_piece_to_grainline(&id).is_none());
}

#[test]
fn test_rotate_command_follows_grainline() {
    let mut layout = Layout::default();
    let sheet = layout.create_sheet("Sheet 1");
    layout.set_sheet_grainline_type(sheet, GrainlineType::Vertical);
    layout.set_follow_grainline(true);
    let origin = point(300.0, 200.0);
    let transformation_origin = TransformationOrigin::new(origin, false);
    layout.set_transformation_origin(sheet, transformation_origin);

    // Grainline already points up the sheet.
    let mut source = rectangle("back", 60.0, 60.0);
    source.grainline = Grainline::new(point(30.0, 50.0), point(30.0, 10.0), GrainlineArrow::Both);
    let id = layout.import_piece(&source).remove(0);
    layout.set_piece_sheet(&id, Some(sheet));
    let before = *piece(&layout, &id).transform();

    let mut cmd = LayoutCommand::rotate_piece(&layout, &id, transformation_origin, 10.0, true)
        .unwrap()
        .with_angle_sum(170.0);

    // First replay turns by the gesture total, then snaps the rear arrow up.
    cmd.redo(&mut layout);
    let line = piece(&layout, &id).mapped_grainline().unwrap();
    assert!((line.angle() - 270.0).abs() < 1e-6, "{}", line.angle());
    let mut half_turn = before;
    half_turn.rotate(&origin, 180.0);
    assert!(piece(&layout, &id).transform().approx_eq(&half_turn, 1e-6));

    cmd.undo(&mut layout);
    assert!(piece(&layout, &id).transform().approx_eq(&before, 1e-9));

    // Later replays use the step angle, which snaps back to the start.
    cmd.redo(&mut layout);
    let line = piece(&layout, &id).mapped_grainline().unwrap();
    assert!((line.angle() - 90.0).abs() < 1e-6, "{}", line.angle());
    assert!(piece(&layout, &id).transform().approx_eq(&before, 1e-6));
}

fn polygon() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..7)
        .prop_map(|coords| coords.into_iter().map(|(x, y)| point(x, y)).collect())
}

proptest! {
    #[test]
    fn prop_superposition_is_symmetric(a in polygon(), b in polygon()) {
        prop_assert_eq!(paths_superposition(&a, &b), paths_superposition(&b, &a));
    }
}
