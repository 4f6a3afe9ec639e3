//! Sticky edges: snap a dragged piece to the configured gap from its nearest
//! neighbour, or onto the usable border of its sheet.
//!
//! Contours are sampled densely ([`prepare_sticky_path`]) and compared point
//! to point. The closest pair gives the segment the piece has to travel.

use tracing::trace;

use crate::geometry::{
    bounding_rect, closest_distance, paths_superposition, prepare_sticky_path, Line, Point, Rect,
    Vector, ACCURACY_POINT_ON_LINE,
};
use crate::piece::Piece;
use crate::settings::{max_sticky_distance, min_sticky_distance, sticky_shift, LayoutSettings};
use crate::sheet::Sheet;

/// Distances this close to the target gap need no correction.
const GAP_TOLERANCE: f64 = 1e-6;

/// Shortest separating segment found so far and the gap it should end at.
#[derive(Debug, Clone, Copy)]
struct StickyMatch {
    closest: Line,
    gap: f64,
}

impl StickyMatch {
    fn keep_shorter(best: &mut Option<StickyMatch>, candidate: StickyMatch) {
        let shorter = match best {
            Some(current) => candidate.closest.length() < current.closest.length(),
            None => true,
        };
        if shorter {
            *best = Some(candidate);
        }
    }
}

/// Correction that brings `piece` to the sticky target, if any.
///
/// `others` are the remaining pieces on the same sheet. Returns `None` when
/// sticky edges are off, the gap is not positive, nothing is close enough or
/// the piece already sits at the target distance.
pub fn sticky_position<'a>(
    piece: &Piece,
    others: impl IntoIterator<Item = &'a Piece>,
    sheet: &Sheet,
    settings: &LayoutSettings,
) -> Option<Vector> {
    if !settings.sticky_edges || settings.pieces_gap <= 0.0 {
        return None;
    }

    let path = piece.mapped_external_contour();
    if path.is_empty() {
        return None;
    }
    let sticky_path = prepare_sticky_path(&path, sticky_shift());

    let mut best = None;
    if settings.sticky_sheet_edges {
        if let Some(candidate) = sheet_edge_match(&path, &sticky_path, sheet) {
            StickyMatch::keep_shorter(&mut best, candidate);
        }
    }

    let unique_id = piece.unique_id();
    let neighbours = others
        .into_iter()
        .filter(|other| other.unique_id() != unique_id);
    if let Some(candidate) = neighbour_match(&path, &sticky_path, neighbours, settings.pieces_gap) {
        StickyMatch::keep_shorter(&mut best, candidate);
    }

    let offset = correction(&best?);
    if let Some(v) = offset {
        trace!("Sticky correction for {}: ({:.3}, {:.3})", unique_id, v.x, v.y);
    }
    offset
}

/// Border of the usable sheet area, only while the piece is inside it and
/// close to an edge.
fn sheet_edge_match(path: &[Point], sticky_path: &[Point], sheet: &Sheet) -> Option<StickyMatch> {
    let usable = sheet.margins_rect();
    let bounding = bounding_rect(path);
    if !usable.contains_rect(&bounding) {
        return None;
    }
    if usable.contains_rect(&bounding.expanded(max_sticky_distance())) {
        return None;
    }

    let border = usable.expanded(-ACCURACY_POINT_ON_LINE);
    let border_path = prepare_sticky_path(&rect_path(&border), sticky_shift());
    closest_distance(sticky_path, &border_path).map(|closest| StickyMatch { closest, gap: 0.0 })
}

fn neighbour_match<'a>(
    path: &[Point],
    sticky_path: &[Point],
    neighbours: impl Iterator<Item = &'a Piece>,
    gap: f64,
) -> Option<StickyMatch> {
    let zone = bounding_rect(path).expanded(gap + min_sticky_distance());

    let mut best = None;
    for other in neighbours {
        let other_path = other.mapped_external_contour();
        if other_path.is_empty() {
            continue;
        }
        let other_rect = bounding_rect(&other_path);
        if !zone.touches(&other_rect) || paths_superposition(path, &other_path) {
            continue;
        }

        let other_sticky = prepare_sticky_path(&other_path, sticky_shift());
        if let Some(closest) = closest_distance(sticky_path, &other_sticky) {
            StickyMatch::keep_shorter(&mut best, StickyMatch { closest, gap });
        }
    }
    best
}

fn correction(found: &StickyMatch) -> Option<Vector> {
    let line = found.closest;
    if line.is_null() {
        return None;
    }

    let gap = found.gap;
    let extra_zone = if gap.abs() < f64::EPSILON {
        max_sticky_distance()
    } else {
        (gap * 0.5).clamp(min_sticky_distance(), max_sticky_distance())
    };

    let length = line.length();
    if (length - gap).abs() <= GAP_TOLERANCE {
        return None;
    }

    if length > gap && length <= gap + extra_zone {
        return Some(line.with_length(length - gap).vector());
    }

    if length < gap && length >= gap - extra_zone {
        let pushed = line.with_angle(line.angle() + 180.0).with_length(gap - length);
        return Some(pushed.vector());
    }

    None
}

fn rect_path(rect: &Rect) -> Vec<Point> {
    vec![
        rect.top_left(),
        rect.top_right(),
        rect.bottom_right(),
        rect.bottom_left(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{point, Margins, Size};
    use crate::piece::PieceSource;
    use puzzlekit_core::units::mm_to_px;

    fn square(id: &str, x: f64, y: f64, side: f64) -> Piece {
        let source = PieceSource::new(
            id,
            id,
            vec![
                point(0.0, 0.0),
                point(side, 0.0),
                point(side, side),
                point(0.0, side),
            ],
        );
        let mut piece = Piece::new(&source);
        piece.translate(x, y);
        piece
    }

    fn settings(gap_mm: f64) -> LayoutSettings {
        LayoutSettings {
            pieces_gap: mm_to_px(gap_mm),
            sticky_edges: true,
            sheet_size: Size::new(2000.0, 2000.0),
            sheet_margins: Margins::uniform(0.0),
            ..LayoutSettings::default()
        }
    }

    fn sheet(settings: &LayoutSettings) -> Sheet {
        Sheet::new("Sheet", settings)
    }

    #[test]
    fn test_disabled_without_gap_or_setting() {
        let mut settings = settings(0.0);
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 160.0, 100.0, 50.0);
        assert!(sticky_position(&a, [&b], &s, &settings).is_none());

        settings.pieces_gap = mm_to_px(5.0);
        settings.sticky_edges = false;
        assert!(sticky_position(&a, [&b], &s, &settings).is_none());
    }

    #[test]
    fn test_exact_gap_needs_no_correction() {
        let settings = settings(5.0);
        let gap = settings.pieces_gap;
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 150.0 + gap, 100.0, 50.0);
        assert!(sticky_position(&a, [&b], &s, &settings).is_none());
    }

    #[test]
    fn test_attracts_to_gap() {
        let settings = settings(10.0);
        let gap = settings.pieces_gap;
        let extra = (gap * 0.5).clamp(min_sticky_distance(), max_sticky_distance());
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 150.0 + gap + extra / 2.0, 100.0, 50.0);

        let v = sticky_position(&a, [&b], &s, &settings).unwrap();
        assert!((v.x - extra / 2.0).abs() < 1e-6, "{v:?}");
        assert!(v.y.abs() < 1e-6);
    }

    #[test]
    fn test_pushes_away_when_too_close() {
        let settings = settings(10.0);
        let gap = settings.pieces_gap;
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 150.0 + gap - 4.0, 100.0, 50.0);

        let v = sticky_position(&a, [&b], &s, &settings).unwrap();
        assert!((v.x + 4.0).abs() < 1e-6, "{v:?}");
    }

    #[test]
    fn test_far_neighbour_is_ignored() {
        let settings = settings(5.0);
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 600.0, 100.0, 50.0);
        assert!(sticky_position(&a, [&b], &s, &settings).is_none());
    }

    #[test]
    fn test_overlapping_neighbour_is_ignored() {
        let settings = settings(5.0);
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        let b = square("b", 120.0, 100.0, 50.0);
        assert!(sticky_position(&a, [&b], &s, &settings).is_none());
    }

    #[test]
    fn test_piece_itself_is_skipped() {
        let settings = settings(5.0);
        let s = sheet(&settings);
        let a = square("a", 100.0, 100.0, 50.0);
        assert!(sticky_position(&a, [&a], &s, &settings).is_none());
    }

    #[test]
    fn test_sheet_edge_snaps_to_border() {
        let mut settings = settings(5.0);
        settings.sticky_sheet_edges = true;
        let s = sheet(&settings);
        let a = square("a", 20.0, 500.0, 50.0);

        let v = sticky_position(&a, std::iter::empty(), &s, &settings).unwrap();
        assert!((v.x + 20.0 - ACCURACY_POINT_ON_LINE).abs() < 1e-6, "{v:?}");
    }

    #[test]
    fn test_sheet_edge_ignored_outside_or_far() {
        let mut settings = settings(5.0);
        settings.sticky_sheet_edges = true;
        let s = sheet(&settings);

        let far = square("a", 500.0, 500.0, 50.0);
        assert!(sticky_position(&far, std::iter::empty(), &s, &settings).is_none());

        let outside = square("b", -10.0, 500.0, 50.0);
        assert!(sticky_position(&outside, std::iter::empty(), &s, &settings).is_none());
    }
}
