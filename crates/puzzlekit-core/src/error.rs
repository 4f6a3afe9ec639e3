//! Error handling for PuzzleKit
//!
//! Provides the error types used across the layout engine:
//! - Layout errors (caller contract violations such as unknown ids)
//! - Piece data errors (geometry missing for an enabled feature)
//!
//! Dangling references met while replaying undo commands are not errors;
//! commands skip them silently. All error types use `thiserror`.

use thiserror::Error;

/// Layout error type
///
/// Raised when a caller asks for an operation on a piece or sheet that
/// does not exist, or would break a structural invariant of the layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No piece with this unique id is registered in the layout
    #[error("Piece not found: {id}")]
    PieceNotFound {
        /// The unique id that was looked up.
        id: String,
    },

    /// No sheet with this id belongs to the layout
    #[error("Sheet not found: {id}")]
    SheetNotFound {
        /// The sheet id that was looked up.
        id: String,
    },

    /// A sheet with this id is already part of the layout
    #[error("Sheet already exists: {id}")]
    DuplicateSheet {
        /// The colliding sheet id.
        id: String,
    },

    /// A multi-piece operation was requested with no pieces
    #[error("Operation requires at least one piece")]
    EmptyPieceSet,
}

/// Piece data error type
///
/// Describes why a piece cannot be laid out. The layout takes no
/// corrective action; the caller decides whether to block or warn.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceDataError {
    /// The seam line has no points
    #[error("Seam line is empty")]
    EmptySeamLine,

    /// Seam allowance is enabled but its contour has no points
    #[error("Seam allowance line is empty")]
    EmptySeamAllowance,

    /// Grainline is enabled but has fewer than two points
    #[error("Grainline is empty")]
    EmptyGrainline,
}

/// Main error type for PuzzleKit
#[derive(Error, Debug)]
pub enum Error {
    /// Layout error
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Piece data error
    #[error(transparent)]
    PieceData(#[from] PieceDataError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error reports an unknown piece or sheet
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Layout(LayoutError::PieceNotFound { .. })
                | Error::Layout(LayoutError::SheetNotFound { .. })
        )
    }

    /// Check if this is a piece data error
    pub fn is_piece_data_error(&self) -> bool {
        matches!(self, Error::PieceData(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_data_error_reason() {
        assert_eq!(PieceDataError::EmptySeamLine.to_string(), "Seam line is empty");
        assert_eq!(
            PieceDataError::EmptySeamAllowance.to_string(),
            "Seam allowance line is empty"
        );
        assert_eq!(PieceDataError::EmptyGrainline.to_string(), "Grainline is empty");
    }

    #[test]
    fn test_layout_error_conversion() {
        let err: Error = LayoutError::PieceNotFound {
            id: "front_2".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(!err.is_piece_data_error());
        assert_eq!(err.to_string(), "Piece not found: front_2");
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("broken");
        assert_eq!(err.to_string(), "broken");
        assert!(!err.is_not_found());
    }
}
