//! Identifier types shared across the workspace.
//!
//! ## Modules
//!
//! - [`ids`]: stable ids for pieces and sheets

pub mod ids;

pub use ids::*;
