//! Affine placement transform of a piece.
//!
//! Wraps a homogeneous 3x3 matrix. Every mutating operation is applied after
//! the existing transform, in sheet coordinates.

use nalgebra::{Matrix3, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point, Rect};

/// 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3<f64>,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Pure translation
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::from_matrix(Matrix3::new_translation(&Vector2::new(dx, dy)))
    }

    /// Pure scaling about the origin
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::from_matrix(Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy)))
    }

    /// Rotation about `center`.
    ///
    /// Positive degrees turn counter-clockwise on screen, so a line's angle
    /// grows by exactly `degrees`.
    pub fn rotation_about(center: &Point, degrees: f64) -> Self {
        let to_center = Matrix3::new_translation(&center.coords);
        let from_center = Matrix3::new_translation(&-center.coords);
        let rotation = Rotation2::new(-degrees.to_radians()).to_homogeneous();
        Self::from_matrix(to_center * rotation * from_center)
    }

    /// Mirror across the vertical line `x = axis_x`.
    pub fn mirror_x(axis_x: f64) -> Self {
        Self::translation(-axis_x, 0.0)
            .then(&Self::scaling(-1.0, 1.0))
            .then(&Self::translation(axis_x, 0.0))
    }

    /// Mirror across the horizontal line `y = axis_y`.
    pub fn mirror_y(axis_y: f64) -> Self {
        Self::translation(0.0, -axis_y)
            .then(&Self::scaling(1.0, -1.0))
            .then(&Self::translation(0.0, axis_y))
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform2D) -> Transform2D {
        Self::from_matrix(next.matrix * self.matrix)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        *self = self.then(&Self::translation(dx, dy));
    }

    pub fn rotate(&mut self, center: &Point, degrees: f64) {
        *self = self.then(&Self::rotation_about(center, degrees));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        *self = self.then(&Self::scaling(sx, sy));
    }

    pub fn map(&self, p: &Point) -> Point {
        self.matrix.transform_point(p)
    }

    pub fn map_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.map(p)).collect()
    }

    pub fn map_line(&self, line: &Line) -> Line {
        Line::new(self.map(&line.p1), self.map(&line.p2))
    }

    /// Bounding rectangle of the mapped corners of `rect`.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        crate::geometry::bounding_rect(&[
            self.map(&rect.top_left()),
            self.map(&rect.top_right()),
            self.map(&rect.bottom_right()),
            self.map(&rect.bottom_left()),
        ])
    }

    /// Horizontal translation component
    pub fn dx(&self) -> f64 {
        self.matrix[(0, 2)]
    }

    /// Vertical translation component
    pub fn dy(&self) -> f64 {
        self.matrix[(1, 2)]
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::identity(), 1e-12)
    }

    /// Component-wise comparison.
    pub fn approx_eq(&self, other: &Transform2D, epsilon: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}
