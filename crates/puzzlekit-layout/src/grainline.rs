//! Grainline data and the rotation that aligns it with the fabric.

use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point, Vector};

/// Which ends of the grainline carry an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrainlineArrow {
    /// Arrows at both ends
    #[default]
    Both,
    /// Arrow at the end of the line only
    Front,
    /// Arrow at the start of the line only
    Rear,
    /// Both ends plus the two perpendicular directions
    FourWays,
}

impl GrainlineArrow {
    pub fn has_front(self) -> bool {
        matches!(self, Self::Both | Self::Front | Self::FourWays)
    }

    pub fn has_rear(self) -> bool {
        matches!(self, Self::Both | Self::Rear | Self::FourWays)
    }

    pub fn has_sides(self) -> bool {
        matches!(self, Self::FourWays)
    }
}

/// Fabric grain direction of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrainlineType {
    Horizontal,
    Vertical,
    /// Follows the longer side of the sheet
    #[default]
    NotFixed,
}

/// Grainline marking of a piece, in piece coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grainline {
    pub enabled: bool,
    /// Polyline of the marking; first and last point give its direction.
    pub points: Vec<Point>,
    pub arrow: GrainlineArrow,
}

impl Grainline {
    pub fn new(start: Point, end: Point, arrow: GrainlineArrow) -> Self {
        Self {
            enabled: true,
            points: vec![start, end],
            arrow,
        }
    }

    /// At least two points
    pub fn is_shape_valid(&self) -> bool {
        self.points.len() >= 2
    }

    /// Directed main line, start to end.
    pub fn main_line(&self) -> Option<Line> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => Some(Line::new(*first, *last)),
            _ => None,
        }
    }
}

/// Rotation in degrees that brings `grainline` onto the fabric grain.
///
/// `orientation` must already be resolved; anything but `Vertical` is
/// treated as horizontal. The reference line starts at the grainline's first
/// point. Every arrow direction allowed by `arrow` yields two candidates (the
/// counter-clockwise angle and its clockwise complement); the one with the
/// smallest magnitude wins, earlier candidates winning ties.
pub fn rotation_to_fabric(grainline: &Line, arrow: GrainlineArrow, orientation: GrainlineType) -> f64 {
    if grainline.is_null() {
        return 0.0;
    }

    let mut fabric = Line::new(grainline.p1, grainline.p1 - Vector::new(100.0, 0.0));
    if orientation == GrainlineType::Vertical {
        fabric.set_angle(fabric.angle() - 90.0);
    }

    let mut candidates = Vec::with_capacity(8);
    let mut push = |direction: Line| {
        let angle = direction.angle_to(&fabric);
        candidates.push(angle);
        candidates.push(-(360.0 - angle));
    };

    if arrow.has_front() {
        push(*grainline);
    }
    if arrow.has_rear() {
        push(grainline.with_angle(grainline.angle() + 180.0));
    }
    if arrow.has_sides() {
        push(grainline.with_angle(grainline.angle() + 90.0));
        push(grainline.with_angle(grainline.angle() - 90.0));
    }

    candidates
        .into_iter()
        .fold(None::<f64>, |best, angle| match best {
            Some(b) if b.abs() <= angle.abs() => Some(b),
            _ => Some(angle),
        })
        .unwrap_or(0.0)
}
