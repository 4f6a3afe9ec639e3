//! Runtime layout settings.
//!
//! Built once from [`LayoutDefaults`] when a layout is created. Lengths are
//! converted from millimetres to internal pixels here and nowhere else.

use puzzlekit_core::units::mm_to_px;
use puzzlekit_core::Unit;
use puzzlekit_settings::LayoutDefaults;
use serde::{Deserialize, Serialize};

use crate::geometry::{Margins, Size};

/// Subdivision step of sticky paths, in mm.
pub const STICKY_SHIFT_MM: f64 = 1.0;
/// Lower bound of the sticky tolerance window, in mm.
pub const MIN_STICKY_DISTANCE_MM: f64 = 3.0;
/// Upper bound of the sticky tolerance window, in mm.
pub const MAX_STICKY_DISTANCE_MM: f64 = 10.0;

/// Sticky path subdivision step in pixels.
pub fn sticky_shift() -> f64 {
    mm_to_px(STICKY_SHIFT_MM)
}

/// Minimum sticky distance in pixels.
pub fn min_sticky_distance() -> f64 {
    mm_to_px(MIN_STICKY_DISTANCE_MM)
}

/// Maximum sticky distance in pixels.
pub fn max_sticky_distance() -> f64 {
    mm_to_px(MAX_STICKY_DISTANCE_MM)
}

/// Settings of one layout. All lengths in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    pub unit: Unit,
    pub pieces_gap: f64,
    pub warning_superposition: bool,
    pub warning_out_of_bound: bool,
    pub warning_gap_position: bool,
    pub sticky_edges: bool,
    pub sticky_sheet_edges: bool,
    pub follow_grainline: bool,
    pub horizontal_scale: f64,
    pub vertical_scale: f64,
    /// Paper size given to new sheets
    pub sheet_size: Size,
    /// Margins given to new sheets
    pub sheet_margins: Margins,
    pub ignore_margins: bool,
}

impl From<&LayoutDefaults> for LayoutSettings {
    fn from(defaults: &LayoutDefaults) -> Self {
        let m = &defaults.sheet_margins;
        Self {
            unit: defaults.unit,
            pieces_gap: mm_to_px(defaults.pieces_gap),
            warning_superposition: defaults.warning_superposition,
            warning_out_of_bound: defaults.warning_out_of_bound,
            warning_gap_position: defaults.warning_gap_position,
            sticky_edges: defaults.sticky_edges,
            sticky_sheet_edges: defaults.sticky_sheet_edges,
            follow_grainline: defaults.follow_grainline,
            horizontal_scale: defaults.horizontal_scale,
            vertical_scale: defaults.vertical_scale,
            sheet_size: Size::new(mm_to_px(defaults.sheet_width), mm_to_px(defaults.sheet_height)),
            sheet_margins: Margins::new(
                mm_to_px(m.left),
                mm_to_px(m.top),
                mm_to_px(m.right),
                mm_to_px(m.bottom),
            ),
            ignore_margins: defaults.ignore_margins,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self::from(&LayoutDefaults::default())
    }
}

impl LayoutSettings {
    /// Pieces gap in the display unit.
    pub fn pieces_gap_converted(&self) -> f64 {
        self.unit.from_px(self.pieces_gap)
    }

    /// Set the pieces gap from a value in the display unit.
    pub fn set_pieces_gap_converted(&mut self, value: f64) {
        self.pieces_gap = self.unit.to_px(value).max(0.0);
    }

    /// Any of the position warnings is on.
    pub fn any_warning(&self) -> bool {
        self.warning_superposition || self.warning_out_of_bound || self.warning_gap_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_converted_to_px() {
        let defaults = LayoutDefaults {
            pieces_gap: 25.4,
            sheet_width: 254.0,
            ..LayoutDefaults::default()
        };
        let settings = LayoutSettings::from(&defaults);
        assert!((settings.pieces_gap - 96.0).abs() < 1e-9);
        assert!((settings.sheet_size.width - 960.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_in_display_unit() {
        let mut settings = LayoutSettings {
            unit: Unit::Mm,
            ..LayoutSettings::default()
        };
        settings.set_pieces_gap_converted(5.0);
        assert!((settings.pieces_gap_converted() - 5.0).abs() < 1e-9);

        settings.set_pieces_gap_converted(-2.0);
        assert_eq!(settings.pieces_gap, 0.0);
    }

    #[test]
    fn test_sticky_window_is_ordered() {
        assert!(sticky_shift() < min_sticky_distance());
        assert!(min_sticky_distance() < max_sticky_distance());
    }
}
