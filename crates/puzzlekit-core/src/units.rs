//! Unit conversion utilities
//!
//! The layout engine works in device pixels at print resolution. Settings and
//! user-facing values are expressed in millimetres, centimetres or inches and
//! converted once on the way in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Print resolution used for the internal pixel unit.
pub const PRINT_DPI: f64 = 96.0;

const MM_PER_INCH: f64 = 25.4;

/// Length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Pixels at [`PRINT_DPI`]
    Px,
    /// Millimetres
    Mm,
    /// Centimetres
    Cm,
    /// Inches
    Inch,
}

impl Default for Unit {
    fn default() -> Self {
        Self::Cm
    }
}

impl Unit {
    /// How many pixels one of this unit spans.
    pub fn px_per_unit(self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Mm => PRINT_DPI / MM_PER_INCH,
            Unit::Cm => PRINT_DPI * 10.0 / MM_PER_INCH,
            Unit::Inch => PRINT_DPI,
        }
    }

    /// Convert `value` from this unit into pixels.
    pub fn to_px(self, value: f64) -> f64 {
        value * self.px_per_unit()
    }

    /// Convert a pixel length into this unit.
    pub fn from_px(self, px: f64) -> f64 {
        px / self.px_per_unit()
    }

    /// Short suffix used when formatting lengths
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::Inch => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Ok(Self::Px),
            "mm" | "millimeter" | "millimetre" => Ok(Self::Mm),
            "cm" | "centimeter" | "centimetre" => Ok(Self::Cm),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            _ => Err(format!("Unknown unit: {}", s)),
        }
    }
}

/// Convert a length between two units.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return value;
    }
    to.from_px(from.to_px(value))
}

/// Millimetres to internal pixels.
#[inline]
pub fn mm_to_px(mm: f64) -> f64 {
    Unit::Mm.to_px(mm)
}

/// Internal pixels to millimetres.
#[inline]
pub fn px_to_mm(px: f64) -> f64 {
    Unit::Mm.from_px(px)
}

/// Format a pixel length in the given unit, e.g. `"12.50 mm"`.
pub fn format_length(px: f64, unit: Unit) -> String {
    format!("{:.2} {}", unit.from_px(px), unit)
}
