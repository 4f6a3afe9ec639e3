//! Stable identifiers.
//!
//! Pieces are keyed by a string derived from their source geometry plus a
//! copy suffix. Sheets get a random UUID when they are created.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique id of a piece inside a layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Wrap an already formatted id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of copy number `copy_number` of the source piece `base`.
    ///
    /// The first copy keeps the base id, later copies get `_N` appended.
    pub fn for_copy(base: &str, copy_number: u16) -> Self {
        if copy_number > 1 {
            Self(format!("{}_{}", base, copy_number))
        } else {
            Self(base.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PieceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique id of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(Uuid);

impl SheetId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SheetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
