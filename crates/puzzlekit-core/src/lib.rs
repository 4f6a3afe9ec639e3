//! # PuzzleKit Core
//!
//! Core types and utilities shared by the PuzzleKit crates.
//! Provides the error taxonomy, measurement units, stable identifiers
//! for pieces and sheets, and the event bus that carries layout change
//! notifications to presentation layers.

pub mod error;
pub mod event_bus;
pub mod types;
pub mod units;

pub use error::{Error, LayoutError, PieceDataError, Result};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, LayoutEvent,
    SubscriptionId,
};

pub use types::{PieceId, SheetId};

pub use units::{Unit, PRINT_DPI};
