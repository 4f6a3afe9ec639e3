//! # PuzzleKit Layout
//!
//! The layout engine: places cut-pattern pieces onto sheets, keeps their
//! positions valid, snaps them together with a controlled gap, aligns them to
//! the fabric grainline and manages their stacking order. Every user-visible
//! mutation is an undoable command.
//!
//! ## Architecture
//!
//! ```text
//! LayoutDocument
//!   ├── Layout (arena of pieces and sheets, focus, settings, events)
//!   │     ├── Piece (contour, transform, flags, sheet id)
//!   │     └── Sheet (size, margins, grainline, transformation origin)
//!   └── UndoStack (LayoutCommand history, merge, macros)
//!
//! Algorithms
//!   ├── sticky      (gap snapping)
//!   ├── validation  (out of bound, superposition, gap)
//!   ├── grainline   (rotation to the fabric grain)
//!   └── zorder      (level renumbering)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use puzzlekit_layout::{LayoutCommand, LayoutDocument, PieceSource};
//!
//! let mut doc = LayoutDocument::default();
//! let sheet = doc.layout.create_sheet("Sheet 1");
//! let id = doc.layout.import_piece(&source).remove(0);
//!
//! let place = LayoutCommand::move_on_sheet(&doc.layout, &id, Some(sheet))?;
//! doc.execute(place);
//! doc.undo();
//! ```

pub mod commands;
pub mod document;
pub mod geometry;
pub mod grainline;
pub mod history;
pub mod layout;
pub mod piece;
pub mod settings;
pub mod sheet;
pub mod sticky;
pub mod transform;
pub mod validation;
pub mod zorder;

pub use commands::{CommandKind, CommandMacro, LayoutCommand};
pub use document::LayoutDocument;
pub use geometry::{point, Line, Margins, Point, Rect, Size, Vector};
pub use grainline::{Grainline, GrainlineArrow, GrainlineType};
pub use history::UndoStack;
pub use layout::Layout;
pub use piece::{Piece, PieceSource};
pub use settings::LayoutSettings;
pub use sheet::{Sheet, TransformationOrigin};
pub use transform::Transform2D;
pub use validation::PositionValidity;
pub use zorder::ZValueMove;
