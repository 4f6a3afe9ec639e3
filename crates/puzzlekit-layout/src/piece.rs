//! Pattern pieces placed on a layout.
//!
//! A [`PieceSource`] is what the pattern side hands over: the piece geometry
//! in its own coordinates plus flipping and grainline rules. A [`Piece`] is
//! one copy of a source with a placement transform, a sheet and the
//! validation flags computed by the layout.

use puzzlekit_core::{PieceDataError, PieceId, SheetId};
use serde::{Deserialize, Serialize};

use crate::geometry::{bounding_rect, Line, Point, Rect};
use crate::grainline::{rotation_to_fabric, Grainline, GrainlineType};
use crate::sheet::TransformationOrigin;
use crate::transform::Transform2D;

/// Piece geometry and rules as delivered by the pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceSource {
    pub id: String,
    pub name: String,
    /// Seam line
    pub contour: Vec<Point>,
    pub hide_main_path: bool,
    pub seam_allowance: Vec<Point>,
    pub seam_allowance_enabled: bool,
    /// The seam allowance is already part of the contour.
    pub seam_allowance_built_in: bool,
    pub grainline: Grainline,
    pub piece_label_rect: Vec<Point>,
    pub pattern_label_rect: Vec<Point>,
    /// Number of copies to lay out
    pub quantity: u16,
    pub force_flipping: bool,
    pub forbid_flipping: bool,
    pub follow_grainline: bool,
}

impl Default for PieceSource {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            contour: Vec::new(),
            hide_main_path: false,
            seam_allowance: Vec::new(),
            seam_allowance_enabled: false,
            seam_allowance_built_in: false,
            grainline: Grainline::default(),
            piece_label_rect: Vec::new(),
            pattern_label_rect: Vec::new(),
            quantity: 1,
            force_flipping: false,
            forbid_flipping: false,
            follow_grainline: false,
        }
    }
}

impl PieceSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, contour: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contour,
            ..Self::default()
        }
    }
}

/// One placed (or not yet placed) copy of a pattern piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    source_id: String,
    copy_number: u16,
    name: String,
    contour: Vec<Point>,
    hide_main_path: bool,
    seam_allowance: Vec<Point>,
    seam_allowance_enabled: bool,
    seam_allowance_built_in: bool,
    grainline: Grainline,
    piece_label_rect: Vec<Point>,
    pattern_label_rect: Vec<Point>,
    force_flipping: bool,
    forbid_flipping: bool,
    follow_grainline: bool,

    x_scale: f64,
    y_scale: f64,
    transform: Transform2D,
    vertically_flipped: bool,
    horizontally_flipped: bool,

    selected: bool,
    out_of_bound: bool,
    has_superposition: bool,
    invalid_gap_position: bool,
    z_value: f64,
    sheet: Option<SheetId>,
}

impl Piece {
    /// Copy number 1 at original scale.
    pub fn new(source: &PieceSource) -> Self {
        Self::from_source(source, 1, 1.0, 1.0)
    }

    /// Build copy `copy_number` of `source` with the layout scale baked in.
    ///
    /// The piece starts with its bounding box at the sheet origin, flipped if
    /// the source forces flipping.
    pub fn from_source(source: &PieceSource, copy_number: u16, x_scale: f64, y_scale: f64) -> Self {
        let mut piece = Self {
            source_id: source.id.clone(),
            copy_number: copy_number.max(1),
            name: source.name.clone(),
            contour: source.contour.clone(),
            hide_main_path: source.hide_main_path,
            seam_allowance: source.seam_allowance.clone(),
            seam_allowance_enabled: source.seam_allowance_enabled,
            seam_allowance_built_in: source.seam_allowance_built_in,
            grainline: source.grainline.clone(),
            piece_label_rect: source.piece_label_rect.clone(),
            pattern_label_rect: source.pattern_label_rect.clone(),
            force_flipping: source.force_flipping,
            forbid_flipping: source.forbid_flipping,
            follow_grainline: source.follow_grainline,
            x_scale,
            y_scale,
            transform: Transform2D::identity(),
            vertically_flipped: false,
            horizontally_flipped: false,
            selected: false,
            out_of_bound: false,
            has_superposition: false,
            invalid_gap_position: false,
            z_value: 1.0,
            sheet: None,
        };
        piece.clear_transformations();
        piece
    }

    /// Layout-unique id: the source id, suffixed with the copy number for
    /// copies after the first.
    pub fn unique_id(&self) -> PieceId {
        PieceId::for_copy(&self.source_id, self.copy_number)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn copy_number(&self) -> u16 {
        self.copy_number
    }

    /// Copy numbers start at 1; smaller values are clamped.
    pub fn set_copy_number(&mut self, copy_number: u16) {
        self.copy_number = copy_number.max(1);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contour(&self) -> &[Point] {
        &self.contour
    }

    pub fn seam_allowance(&self) -> &[Point] {
        &self.seam_allowance
    }

    pub fn is_seam_allowance_enabled(&self) -> bool {
        self.seam_allowance_enabled
    }

    pub fn is_seam_allowance_built_in(&self) -> bool {
        self.seam_allowance_built_in
    }

    pub fn is_hide_main_path(&self) -> bool {
        self.hide_main_path
    }

    pub fn grainline(&self) -> &Grainline {
        &self.grainline
    }

    pub fn set_grainline(&mut self, grainline: Grainline) {
        self.grainline = grainline;
    }

    pub fn piece_label_rect(&self) -> &[Point] {
        &self.piece_label_rect
    }

    pub fn pattern_label_rect(&self) -> &[Point] {
        &self.pattern_label_rect
    }

    pub fn is_force_flipping(&self) -> bool {
        self.force_flipping
    }

    pub fn is_forbid_flipping(&self) -> bool {
        self.forbid_flipping
    }

    pub fn is_follow_grainline(&self) -> bool {
        self.follow_grainline
    }

    pub fn set_follow_grainline(&mut self, follow: bool) {
        self.follow_grainline = follow;
    }

    pub fn x_scale(&self) -> f64 {
        self.x_scale
    }

    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    /// Outline used for layout: the seam allowance when it is drawn
    /// separately, otherwise the seam line.
    pub fn external_contour(&self) -> &[Point] {
        if self.seam_allowance_enabled && !self.seam_allowance_built_in {
            &self.seam_allowance
        } else {
            &self.contour
        }
    }

    /// External contour in sheet coordinates.
    pub fn mapped_external_contour(&self) -> Vec<Point> {
        self.transform.map_points(self.external_contour())
    }

    /// Bounding rectangle of the external contour in piece coordinates.
    pub fn detail_bounding_rect(&self) -> Rect {
        bounding_rect(self.external_contour())
    }

    /// Bounding rectangle of the mapped external contour.
    pub fn mapped_bounding_rect(&self) -> Rect {
        bounding_rect(&self.mapped_external_contour())
    }

    /// Main grainline in sheet coordinates.
    pub fn mapped_grainline(&self) -> Option<Line> {
        self.grainline
            .main_line()
            .map(|line| self.transform.map_line(&line))
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform.translate(dx, dy);
    }

    /// Rotate about `center` in sheet coordinates.
    pub fn rotate(&mut self, center: &Point, degrees: f64) {
        self.transform.rotate(center, degrees);
    }

    /// Reset to the baked scale with the bounding box at the sheet origin.
    pub fn clear_transformations(&mut self) {
        self.transform = Transform2D::scaling(self.x_scale, self.y_scale);
        let offset = self.mapped_bounding_rect().top_left();
        self.transform.translate(-offset.x, -offset.y);

        self.vertically_flipped = false;
        self.horizontally_flipped = false;
        if self.force_flipping {
            self.flip_vertically();
        }
    }

    /// Translation part of the transform.
    pub fn position(&self) -> Point {
        Point::new(self.transform.dx(), self.transform.dy())
    }

    /// Move so the mapped bounding box starts at `pos`.
    pub fn set_position(&mut self, pos: Point) {
        let offset = self.mapped_bounding_rect().top_left();
        self.transform.translate(pos.x - offset.x, pos.y - offset.y);
    }

    /// Mirror across the vertical axis through the mapped detail centre.
    pub fn flip_vertically(&mut self) {
        let center = self.transform.map(&self.detail_bounding_rect().center());
        self.transform = self.transform.then(&Transform2D::mirror_x(center.x));
        self.vertically_flipped = !self.vertically_flipped;
    }

    /// Mirror across the horizontal axis through the mapped detail centre.
    pub fn flip_horizontally(&mut self) {
        let center = self.transform.map(&self.detail_bounding_rect().center());
        self.transform = self.transform.then(&Transform2D::mirror_y(center.y));
        self.horizontally_flipped = !self.horizontally_flipped;
    }

    pub fn is_vertically_flipped(&self) -> bool {
        self.vertically_flipped
    }

    pub fn is_horizontally_flipped(&self) -> bool {
        self.horizontally_flipped
    }

    /// Take geometry and rules from a newer version of the same piece.
    ///
    /// Placement, sheet, z-value and selection are kept. The flip state is
    /// corrected when the new flipping rules demand it.
    pub fn update(&mut self, other: &Piece) {
        self.name = other.name.clone();
        self.contour = other.contour.clone();
        self.hide_main_path = other.hide_main_path;
        self.seam_allowance = other.seam_allowance.clone();
        self.seam_allowance_enabled = other.seam_allowance_enabled;
        self.seam_allowance_built_in = other.seam_allowance_built_in;
        self.grainline = other.grainline.clone();
        self.piece_label_rect = other.piece_label_rect.clone();
        self.pattern_label_rect = other.pattern_label_rect.clone();
        self.force_flipping = other.force_flipping;
        self.forbid_flipping = other.forbid_flipping;
        self.follow_grainline = other.follow_grainline;

        if (self.force_flipping && !self.vertically_flipped)
            || (self.forbid_flipping && self.vertically_flipped)
        {
            self.flip_vertically();
        }
    }

    /// Check the piece has the geometry layout needs.
    pub fn validate(&self) -> Result<(), PieceDataError> {
        if !self.hide_main_path && self.contour.is_empty() {
            return Err(PieceDataError::EmptySeamLine);
        }

        if self.seam_allowance_enabled {
            if self.seam_allowance_built_in && self.contour.is_empty() {
                return Err(PieceDataError::EmptySeamLine);
            }
            if !self.seam_allowance_built_in && self.seam_allowance.is_empty() {
                return Err(PieceDataError::EmptySeamAllowance);
            }
        }

        if self.grainline.enabled && !self.grainline.is_shape_valid() {
            return Err(PieceDataError::EmptyGrainline);
        }

        Ok(())
    }

    /// Turn the piece so its grainline runs with the fabric grain.
    ///
    /// Rotates about the transformation origin, or about the piece's own
    /// centre when the origin is custom. Returns the applied angle, or `None`
    /// when the grainline is disabled or degenerate.
    pub fn rotate_to_grainline(
        &mut self,
        orientation: GrainlineType,
        origin: &TransformationOrigin,
    ) -> Option<f64> {
        if !self.grainline.enabled {
            return None;
        }
        let line = self.mapped_grainline().filter(|line| !line.is_null())?;

        let degrees = rotation_to_fabric(&line, self.grainline.arrow, orientation);
        let center = if origin.custom {
            self.mapped_bounding_rect().center()
        } else {
            origin.origin
        };
        self.rotate(&center, degrees);
        Some(degrees)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn out_of_bound(&self) -> bool {
        self.out_of_bound
    }

    pub fn has_superposition(&self) -> bool {
        self.has_superposition
    }

    pub fn has_invalid_gap_position(&self) -> bool {
        self.invalid_gap_position
    }

    /// Set the out-of-bound flag; true when it changed.
    pub fn set_out_of_bound(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.out_of_bound, value) != value
    }

    /// Set the superposition flag; true when it changed.
    pub fn set_has_superposition(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.has_superposition, value) != value
    }

    /// Set the gap flag; true when it changed.
    pub fn set_invalid_gap_position(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.invalid_gap_position, value) != value
    }

    /// Drop all validation flags; true when any of them was set.
    pub fn reset_warnings(&mut self) -> bool {
        let a = self.set_out_of_bound(false);
        let b = self.set_has_superposition(false);
        let c = self.set_invalid_gap_position(false);
        a || b || c
    }

    pub fn z_value(&self) -> f64 {
        self.z_value
    }

    pub fn set_z_value(&mut self, z: f64) {
        self.z_value = z;
    }

    pub fn sheet(&self) -> Option<SheetId> {
        self.sheet
    }

    /// Assign the sheet without any bookkeeping; see
    /// [`Layout::set_piece_sheet`](crate::Layout::set_piece_sheet).
    pub fn set_sheet(&mut self, sheet: Option<SheetId>) {
        self.sheet = sheet;
    }
}
