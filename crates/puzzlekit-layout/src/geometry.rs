//! Geometry helpers
//!
//! Plain 2D primitives in sheet coordinates (pixels, y axis pointing down)
//! plus the stateless algorithms the layout builds on: bounding rectangles,
//! dense path sampling, closest point pairs and overlap tests.
//!
//! Angles follow the screen convention used throughout the layout: a line
//! pointing right has angle 0, a line pointing up has angle 90.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A point in sheet coordinates.
pub type Point = Point2<f64>;

/// A displacement in sheet coordinates.
pub type Vector = Vector2<f64>;

/// Distance under which a point is considered to lie on a line (0.1555 mm).
pub const ACCURACY_POINT_ON_LINE: f64 = 0.1555 / 25.4 * 96.0;

const EPSILON: f64 = 1e-9;

/// Shorthand for `Point::new`
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn fuzzy_is_null(value: f64) -> bool {
    value.abs() <= 1e-12
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Swap width and height
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Margins around the usable area of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Axis aligned rectangle.
///
/// A rectangle with no area is "empty": it never intersects or contains
/// anything. `united` ignores rectangles that are null (zero width and zero
/// height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        point(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        point(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        point(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        point(self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// No area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Zero width and zero height
    pub fn is_null(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Move each edge by the given amounts (positive values grow right/down).
    pub fn adjusted(&self, dx1: f64, dy1: f64, dx2: f64, dy2: f64) -> Self {
        Self::new(
            self.x + dx1,
            self.y + dy1,
            self.width + dx2 - dx1,
            self.height + dy2 - dy1,
        )
    }

    /// Grow by `distance` on every side.
    pub fn expanded(&self, distance: f64) -> Self {
        self.adjusted(-distance, -distance, distance, distance)
    }

    /// Overlap with positive area. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// `other` lies inside this rectangle, edges included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Edges included.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Intersect, or either rectangle contains the other.
    pub fn touches(&self, other: &Rect) -> bool {
        self.intersects(other) || self.contains_rect(other) || other.contains_rect(self)
    }

    /// Smallest rectangle containing both.
    pub fn united(&self, other: &Rect) -> Rect {
        if self.is_null() {
            return *other;
        }
        if other.is_null() {
            return *self;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Directed line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(point(x1, y1), point(x2, y2))
    }

    pub fn dx(&self) -> f64 {
        self.p2.x - self.p1.x
    }

    pub fn dy(&self) -> f64 {
        self.p2.y - self.p1.y
    }

    pub fn vector(&self) -> Vector {
        self.p2 - self.p1
    }

    pub fn length(&self) -> f64 {
        self.dx().hypot(self.dy())
    }

    /// Both ends coincide
    pub fn is_null(&self) -> bool {
        fuzzy_is_null(self.dx()) && fuzzy_is_null(self.dy())
    }

    /// Direction in degrees, counter-clockwise on screen, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        let (dx, dy) = (self.dx(), self.dy());
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        let theta = (-dy).atan2(dx).to_degrees();
        let normalized = if theta < 0.0 { theta + 360.0 } else { theta };
        if normalized >= 360.0 - 1e-12 {
            0.0
        } else {
            normalized
        }
    }

    /// Counter-clockwise angle from this line to `other`, in `[0, 360)`.
    pub fn angle_to(&self, other: &Line) -> f64 {
        if self.is_null() || other.is_null() {
            return 0.0;
        }
        normalize_degrees(other.angle() - self.angle())
    }

    /// Keep `p1` and the direction, change the length.
    pub fn set_length(&mut self, length: f64) {
        let old = self.length();
        if old > 0.0 {
            self.p2 = self.p1 + self.vector() * (length / old);
        }
    }

    /// Keep `p1` and the length, change the direction.
    pub fn set_angle(&mut self, degrees: f64) {
        let length = self.length();
        let radians = degrees.to_radians();
        self.p2 = self.p1 + Vector::new(radians.cos() * length, -radians.sin() * length);
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.set_length(length);
        self
    }

    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.set_angle(degrees);
        self
    }

    pub fn translated(&self, offset: Vector) -> Self {
        Self::new(self.p1 + offset, self.p2 + offset)
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 - 1e-12 {
        0.0
    } else {
        wrapped
    }
}

/// Bounding rectangle of a point set. Empty input gives a null rectangle.
pub fn bounding_rect(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Even-odd point in polygon test. The polygon is implicitly closed.
pub fn polygon_contains_point(polygon: &[Point], p: &Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn orientation(a: &Point, b: &Point, c: &Point) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross.abs() <= EPSILON {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

fn on_segment(a: &Point, b: &Point, p: &Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// Closed segment intersection: touching ends and collinear overlap count.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(a1, a2, b1))
        || (o2 == 0 && on_segment(a1, a2, b2))
        || (o3 == 0 && on_segment(b1, b2, a1))
        || (o4 == 0 && on_segment(b1, b2, a2))
}

fn closed_edges(path: &[Point]) -> impl Iterator<Item = (&Point, &Point)> {
    let n = path.len();
    (0..n).map(move |i| (&path[i], &path[(i + 1) % n]))
}

fn boundaries_intersect(path1: &[Point], path2: &[Point]) -> bool {
    closed_edges(path1)
        .any(|(a1, a2)| closed_edges(path2).any(|(b1, b2)| segments_intersect(a1, a2, b1, b2)))
}

/// Do the regions enclosed by two closed contours overlap?
///
/// Cheap bounding-rectangle rejection first, then boundary crossing and
/// vertex containment in both directions. The result is symmetric.
pub fn paths_superposition(path1: &[Point], path2: &[Point]) -> bool {
    if path1.is_empty() || path2.is_empty() {
        return false;
    }

    let rect1 = bounding_rect(path1);
    let rect2 = bounding_rect(path2);
    if !rect1.touches(&rect2) {
        return false;
    }

    boundaries_intersect(path1, path2)
        || path2.iter().any(|p| polygon_contains_point(path1, p))
        || path1.iter().any(|p| polygon_contains_point(path2, p))
}

/// Split an edge into equal parts no longer than `step`.
///
/// Emits both ends plus every subdivision point. Edges shorter than one step,
/// zero-length edges and a zero step fall back to the two raw ends.
pub fn cut_edge(edge: &Line, step: f64) -> Vec<Point> {
    if fuzzy_is_null(step) {
        return vec![edge.p1, edge.p2];
    }

    let length = edge.length();
    let n = (length / step).floor();
    if n.is_nan() || n < 1.0 {
        return vec![edge.p1, edge.p2];
    }

    let n = n as usize;
    let shift = length / n as f64;
    (0..=n)
        .map(|i| edge.with_length(shift * i as f64).p2)
        .collect()
}

/// Dense sampling of a closed contour, edge by edge.
pub fn prepare_sticky_path(path: &[Point], step: f64) -> Vec<Point> {
    if path.len() < 2 {
        return path.to_vec();
    }

    closed_edges(path)
        .flat_map(|(a, b)| cut_edge(&Line::new(*a, *b), step))
        .collect()
}

/// Shortest segment from a point of `path1` to a point of `path2`.
///
/// Brute force over both point sets. `None` when either set is empty.
pub fn closest_distance(path1: &[Point], path2: &[Point]) -> Option<Line> {
    let mut best: Option<(f64, Line)> = None;
    for p1 in path1 {
        for p2 in path2 {
            let length = (p2 - p1).norm_squared();
            let closer = match best {
                Some((min, _)) => length < min,
                None => true,
            };
            if closer {
                best = Some((length, Line::new(*p1, *p2)));
            }
        }
    }
    best.map(|(_, line)| line)
}
