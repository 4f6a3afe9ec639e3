//! Stacking order of the pieces on a sheet.
//!
//! Pieces with the same z-value form a level. After every move the levels are
//! renumbered to `index / level_count`, so values stay in `[0, 1)` and pieces
//! sharing a level keep exactly equal values.

use std::collections::{HashMap, HashSet};

use puzzlekit_core::PieceId;
use serde::{Deserialize, Serialize};

/// Two z-values closer than this share a level.
pub const Z_EPSILON: f64 = 1e-9;

/// Direction of a stacking move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZValueMove {
    Top,
    Up,
    Down,
    Bottom,
}

impl std::fmt::Display for ZValueMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZValueMove::Top => write!(f, "top"),
            ZValueMove::Up => write!(f, "up"),
            ZValueMove::Down => write!(f, "down"),
            ZValueMove::Bottom => write!(f, "bottom"),
        }
    }
}

/// Group pieces into levels, lowest first. Ids inside a level are sorted.
pub fn levels(z_values: &[(PieceId, f64)]) -> Vec<Vec<PieceId>> {
    let mut sorted: Vec<&(PieceId, f64)> = z_values.iter().collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut result: Vec<(f64, Vec<PieceId>)> = Vec::new();
    for (id, z) in sorted {
        match result.last_mut() {
            Some((level_z, ids)) if (z - *level_z).abs() <= Z_EPSILON => ids.push(id.clone()),
            _ => result.push((*z, vec![id.clone()])),
        }
    }

    result
        .into_iter()
        .map(|(_, mut ids)| {
            ids.sort();
            ids
        })
        .collect()
}

/// Distance between two neighbouring levels after renumbering.
pub fn level_step(z_values: &[(PieceId, f64)]) -> f64 {
    match levels(z_values).len() {
        0 => 0.0,
        n => 1.0 / n as f64,
    }
}

/// Assign `index / level_count` to each level.
pub fn corrected_z_values(order: &[Vec<PieceId>]) -> HashMap<PieceId, f64> {
    if order.is_empty() {
        return HashMap::new();
    }

    let step = 1.0 / order.len() as f64;
    order
        .iter()
        .enumerate()
        .flat_map(|(i, level)| level.iter().map(move |id| (id.clone(), i as f64 * step)))
        .collect()
}

/// New z-values for every piece in `z_values` after moving `moving`.
///
/// `z_values` holds all pieces of the sheet. Moving ids that are not on the
/// sheet are ignored.
pub fn plan_move(
    z_values: &[(PieceId, f64)],
    moving: &[PieceId],
    direction: ZValueMove,
) -> HashMap<PieceId, f64> {
    let on_sheet: HashSet<&PieceId> = z_values.iter().map(|(id, _)| id).collect();
    let mut moving_set: Vec<PieceId> = moving
        .iter()
        .filter(|id| on_sheet.contains(id))
        .cloned()
        .collect();
    moving_set.sort();
    moving_set.dedup();
    let is_moving = |id: &PieceId| moving_set.binary_search(id).is_ok();

    let order = match direction {
        ZValueMove::Top | ZValueMove::Bottom => {
            let rest: Vec<(PieceId, f64)> = z_values
                .iter()
                .filter(|(id, _)| !is_moving(id))
                .cloned()
                .collect();
            let mut order = levels(&rest);
            if !moving_set.is_empty() {
                if direction == ZValueMove::Top {
                    order.push(moving_set.clone());
                } else {
                    order.insert(0, moving_set.clone());
                }
            }
            order
        }
        ZValueMove::Up | ZValueMove::Down => {
            let step = level_step(z_values);
            let shift = if direction == ZValueMove::Up { -step } else { step };
            let shifted: Vec<(PieceId, f64)> = z_values
                .iter()
                .map(|(id, z)| {
                    if is_moving(id) {
                        (id.clone(), *z)
                    } else {
                        (id.clone(), z + shift)
                    }
                })
                .collect();
            levels(&shifted)
        }
    };

    let corrected = corrected_z_values(&order);
    z_values
        .iter()
        .map(|(id, z)| (id.clone(), corrected.get(id).copied().unwrap_or(*z)))
        .collect()
}
