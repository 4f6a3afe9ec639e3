use puzzlekit_core::{PieceId, SheetId};
use puzzlekit_layout::{point, Layout, Piece, PieceSource, Point};

pub fn rectangle(id: &str, width: f64, height: f64) -> PieceSource {
    PieceSource::new(
        id,
        id,
        vec![
            point(0.0, 0.0),
            point(width, 0.0),
            point(width, height),
            point(0.0, height),
        ],
    )
}

/// Layout with one sheet and `count` 50x30 pieces placed in a row.
pub fn placed_layout(count: usize) -> (Layout, SheetId, Vec<PieceId>) {
    let mut layout = Layout::default();
    let sheet = layout.create_sheet("Sheet 1");
    let ids = (0..count)
        .map(|i| {
            let id = layout
                .import_piece(&rectangle(&format!("piece{i}"), 50.0, 30.0))
                .remove(0);
            layout.set_piece_sheet(&id, Some(sheet));
            layout.set_piece_position(&id, point(20.0 + 80.0 * i as f64, 20.0));
            id
        })
        .collect();
    (layout, sheet, ids)
}

pub fn piece<'a>(layout: &'a Layout, id: &PieceId) -> &'a Piece {
    layout.piece(id).expect("piece is registered")
}

pub fn close(a: Point, b: Point) -> bool {
    (a - b).norm() < 1e-6
}
