//! Position checks for the pieces of one sheet.
//!
//! Works on plain contours so it can be run over any snapshot of a sheet.
//! The layout applies the result to its pieces and reports transitions.

use std::collections::HashMap;

use puzzlekit_core::PieceId;

use crate::geometry::{
    bounding_rect, closest_distance, paths_superposition, prepare_sticky_path, Point, Rect,
    ACCURACY_POINT_ON_LINE,
};
use crate::settings::{sticky_shift, LayoutSettings};

/// Validation flags of one piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionValidity {
    pub out_of_bound: bool,
    pub superposition: bool,
    pub gap: bool,
}

/// Mapped external contour of a piece on the sheet being validated.
#[derive(Debug, Clone)]
pub struct SheetPiece {
    pub id: PieceId,
    pub contour: Vec<Point>,
}

/// Bounding box of `contour` leaves `usable`.
pub fn is_out_of_bound(contour: &[Point], usable: &Rect) -> bool {
    !usable.contains_rect(&bounding_rect(contour))
}

/// For each piece, whether it overlaps any other piece.
pub fn superposition_flags(pieces: &[SheetPiece]) -> Vec<bool> {
    pairwise_flags(pieces, |a, b| paths_superposition(&a.contour, &b.contour))
}

/// For each piece, whether some neighbour is closer than `gap`.
///
/// Only neighbours whose gap-expanded bounding boxes touch are sampled. A
/// non-positive gap never flags anything.
pub fn gap_flags(pieces: &[SheetPiece], gap: f64) -> Vec<bool> {
    if gap <= 0.0 {
        return vec![false; pieces.len()];
    }

    let prepared: Vec<(Rect, Vec<Point>)> = pieces
        .iter()
        .map(|p| {
            (
                bounding_rect(&p.contour).expanded(gap),
                prepare_sticky_path(&p.contour, sticky_shift()),
            )
        })
        .collect();

    pairwise_flags(&prepared, |(rect_a, path_a), (rect_b, path_b)| {
        rect_a.touches(rect_b)
            && closest_distance(path_a, path_b)
                .map(|line| line.length() < gap - ACCURACY_POINT_ON_LINE)
                .unwrap_or(false)
    })
}

/// Symmetric pair test; both members of a hitting pair are flagged.
fn pairwise_flags<T>(items: &[T], hit: impl Fn(&T, &T) -> bool) -> Vec<bool> {
    let mut flags = vec![false; items.len()];
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if flags[i] && flags[j] {
                continue;
            }
            if hit(&items[i], &items[j]) {
                flags[i] = true;
                flags[j] = true;
            }
        }
    }
    flags
}

/// Run every enabled check. Disabled checks report `false`.
pub fn validate_positions(
    pieces: &[SheetPiece],
    usable: &Rect,
    settings: &LayoutSettings,
) -> HashMap<PieceId, PositionValidity> {
    let mut result: HashMap<PieceId, PositionValidity> = pieces
        .iter()
        .map(|p| (p.id.clone(), PositionValidity::default()))
        .collect();

    if settings.warning_out_of_bound {
        for piece in pieces {
            if let Some(v) = result.get_mut(&piece.id) {
                v.out_of_bound = is_out_of_bound(&piece.contour, usable);
            }
        }
    }

    if settings.warning_superposition {
        for (piece, flag) in pieces.iter().zip(superposition_flags(pieces)) {
            if let Some(v) = result.get_mut(&piece.id) {
                v.superposition = flag;
            }
        }
    }

    if settings.warning_gap_position {
        for (piece, flag) in pieces.iter().zip(gap_flags(pieces, settings.pieces_gap)) {
            if let Some(v) = result.get_mut(&piece.id) {
                v.gap = flag;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    fn square(id: &str, x: f64, y: f64, side: f64) -> SheetPiece {
        SheetPiece {
            id: PieceId::from(id),
            contour: vec![
                point(x, y),
                point(x + side, y),
                point(x + side, y + side),
                point(x, y + side),
            ],
        }
    }

    #[test]
    fn test_out_of_bound() {
        let usable = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(!is_out_of_bound(&square("a", 10.0, 10.0, 100.0).contour, &usable));
        assert!(is_out_of_bound(&square("a", 5.0, 10.0, 50.0).contour, &usable));
    }

    #[test]
    fn test_superposition_marks_both_pieces() {
        let pieces = vec![
            square("a", 0.0, 0.0, 10.0),
            square("b", 5.0, 5.0, 10.0),
            square("c", 100.0, 100.0, 10.0),
        ];
        assert_eq!(superposition_flags(&pieces), vec![true, true, false]);
    }

    #[test]
    fn test_contained_piece_is_superposition() {
        let pieces = vec![square("a", 0.0, 0.0, 100.0), square("b", 40.0, 40.0, 10.0)];
        assert_eq!(superposition_flags(&pieces), vec![true, true]);
    }

    #[test]
    fn test_gap_flags() {
        let pieces = vec![
            square("a", 0.0, 0.0, 10.0),
            square("b", 14.0, 0.0, 10.0),
            square("c", 50.0, 0.0, 10.0),
        ];
        assert_eq!(gap_flags(&pieces, 10.0), vec![true, true, false]);
        assert_eq!(gap_flags(&pieces, 3.0), vec![false, false, false]);
        assert_eq!(gap_flags(&pieces, 0.0), vec![false, false, false]);
    }

    #[test]
    fn test_disabled_checks_report_false() {
        let pieces = vec![square("a", -5.0, 0.0, 10.0), square("b", 0.0, 0.0, 10.0)];
        let usable = Rect::new(0.0, 0.0, 100.0, 100.0);

        let settings = LayoutSettings::default();
        let result = validate_positions(&pieces, &usable, &settings);
        assert!(result.values().all(|v| *v == PositionValidity::default()));

        let settings = LayoutSettings {
            warning_out_of_bound: true,
            warning_superposition: true,
            ..LayoutSettings::default()
        };
        let result = validate_positions(&pieces, &usable, &settings);
        let a = result[&PieceId::from("a")];
        assert!(a.out_of_bound && a.superposition && !a.gap);
        assert!(!result[&PieceId::from("b")].out_of_bound);
    }
}
