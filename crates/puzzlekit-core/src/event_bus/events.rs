//! Event type definitions for the event bus.

use serde::{Deserialize, Serialize};

use crate::types::{PieceId, SheetId};

/// Change notification emitted by a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutEvent {
    /// A piece's placement transform changed.
    PieceTransformationChanged { piece: PieceId },
    /// A piece was selected or deselected.
    PieceSelectionChanged { piece: PieceId },
    /// A piece moved to another sheet, to the trash, or to unplaced.
    PieceSheetChanged { piece: PieceId },
    /// A piece's stacking value changed.
    PieceZValueChanged { piece: PieceId },
    /// One of a piece's validity flags flipped.
    PiecePositionValidityChanged { piece: PieceId },
    /// The focused sheet changed.
    ActiveSheetChanged { sheet: Option<SheetId> },
    /// A sheet was added, hidden or shown again.
    SheetListChanged,
    /// A sheet's transformation origin moved.
    TransformationOriginChanged { sheet: SheetId },
    /// Layout-wide settings or contents were reset.
    LayoutChanged,
}

impl LayoutEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            LayoutEvent::PieceTransformationChanged { .. }
            | LayoutEvent::PieceSelectionChanged { .. }
            | LayoutEvent::PieceSheetChanged { .. }
            | LayoutEvent::PieceZValueChanged { .. }
            | LayoutEvent::PiecePositionValidityChanged { .. } => EventCategory::Piece,
            LayoutEvent::ActiveSheetChanged { .. }
            | LayoutEvent::SheetListChanged
            | LayoutEvent::TransformationOriginChanged { .. } => EventCategory::Sheet,
            LayoutEvent::LayoutChanged => EventCategory::Layout,
        }
    }

    /// The piece this event is about, if any
    pub fn piece(&self) -> Option<&PieceId> {
        match self {
            LayoutEvent::PieceTransformationChanged { piece }
            | LayoutEvent::PieceSelectionChanged { piece }
            | LayoutEvent::PieceSheetChanged { piece }
            | LayoutEvent::PieceZValueChanged { piece }
            | LayoutEvent::PiecePositionValidityChanged { piece } => Some(piece),
            _ => None,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            LayoutEvent::PieceTransformationChanged { piece } => {
                format!("Piece {} transformed", piece)
            }
            LayoutEvent::PieceSelectionChanged { piece } => {
                format!("Piece {} selection changed", piece)
            }
            LayoutEvent::PieceSheetChanged { piece } => format!("Piece {} changed sheet", piece),
            LayoutEvent::PieceZValueChanged { piece } => format!("Piece {} restacked", piece),
            LayoutEvent::PiecePositionValidityChanged { piece } => {
                format!("Piece {} position validity changed", piece)
            }
            LayoutEvent::ActiveSheetChanged { sheet: Some(sheet) } => {
                format!("Active sheet is {}", sheet)
            }
            LayoutEvent::ActiveSheetChanged { sheet: None } => "No active sheet".to_string(),
            LayoutEvent::SheetListChanged => "Sheet list changed".to_string(),
            LayoutEvent::TransformationOriginChanged { sheet } => {
                format!("Transformation origin of sheet {} moved", sheet)
            }
            LayoutEvent::LayoutChanged => "Layout changed".to_string(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Per-piece events.
    Piece,
    /// Sheet list, focus and origin events.
    Sheet,
    /// Whole-layout events.
    Layout,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Piece => write!(f, "Piece"),
            EventCategory::Sheet => write!(f, "Sheet"),
            EventCategory::Layout => write!(f, "Layout"),
        }
    }
}
