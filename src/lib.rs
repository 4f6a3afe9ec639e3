//! # PuzzleKit
//!
//! A manual layout engine for cut-pattern pieces:
//! - Sheets with margins, grainline direction and a transformation origin
//! - Sticky edges that keep a configured gap between neighbouring pieces
//! - Out-of-bound, superposition and gap warnings
//! - Automatic rotation to the fabric grainline
//! - Stacking order and a mergeable undo/redo history
//!
//! ## Architecture
//!
//! 1. **puzzlekit-core** - Errors, units, ids, layout events
//! 2. **puzzlekit-settings** - Layout defaults loaded from JSON or TOML
//! 3. **puzzlekit-layout** - Pieces, sheets, algorithms, commands, undo
//! 4. **puzzlekit** - This facade

pub use puzzlekit_core::{
    Error, EventBus, EventBusConfig, EventCategory, EventFilter, LayoutError, LayoutEvent,
    PieceDataError, PieceId, Result, SheetId, Unit,
};

pub use puzzlekit_settings::{Config, LayoutDefaults};

pub use puzzlekit_layout::{
    CommandKind, CommandMacro, Grainline, GrainlineArrow, GrainlineType, Layout, LayoutCommand,
    LayoutDocument, LayoutSettings, Piece, PieceSource, PositionValidity, Sheet, Transform2D,
    TransformationOrigin, UndoStack, ZValueMove,
};

pub use puzzlekit_layout::geometry;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with tracing
///
/// Honours `RUST_LOG`, defaulting to `info`. Fails if a global subscriber
/// is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!("PuzzleKit {} logging initialized", VERSION);
    Ok(())
}
