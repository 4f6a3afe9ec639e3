use proptest::prelude::*;
use puzzlekit_core::PieceId;
use puzzlekit_layout::zorder::{corrected_z_values, levels, plan_move};
use puzzlekit_layout::{LayoutCommand, ZValueMove};

use crate::common::{piece, placed_layout};

fn renormalize(values: &[(PieceId, f64)]) -> Vec<(PieceId, f64)> {
    let corrected = corrected_z_values(&levels(values));
    values
        .iter()
        .map(|(id, _)| (id.clone(), corrected[id]))
        .collect()
}

fn z_values() -> impl Strategy<Value = Vec<(PieceId, f64)>> {
    prop::collection::vec(0u8..6, 1..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, level)| (PieceId::new(format!("p{i}")), f64::from(level) * 0.3))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_renormalization_is_idempotent(values in z_values()) {
        let once = renormalize(&values);
        let twice = renormalize(&once);
        for ((_, a), (_, b)) in once.iter().zip(&twice) {
            prop_assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_top_on_topmost_keeps_order(values in z_values()) {
        let normalized = renormalize(&values);
        let max = normalized.iter().map(|(_, z)| *z).fold(f64::MIN, f64::max);
        let topmost: Vec<PieceId> = normalized
            .iter()
            .filter(|(_, z)| *z == max)
            .map(|(id, _)| id.clone())
            .collect();
        prop_assume!(topmost.len() == 1);

        let planned = plan_move(&normalized, &topmost, ZValueMove::Top);
        for (id, z) in &normalized {
            prop_assert!((planned[id] - z).abs() < 1e-12);
        }
    }
}

#[test]
fn test_z_move_command_renumbers_sheet() {
    let (mut layout, _, ids) = placed_layout(3);
    let mut cmd = LayoutCommand::z_value_move_piece(&layout, &ids[2], ZValueMove::Bottom).unwrap();
    cmd.redo(&mut layout);

    assert_eq!(piece(&layout, &ids[2]).z_value(), 0.0);
    assert_eq!(piece(&layout, &ids[0]).z_value(), 0.5);
    assert_eq!(piece(&layout, &ids[1]).z_value(), 0.5);
}
