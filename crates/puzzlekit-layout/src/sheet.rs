//! Sheets of paper or fabric that pieces are placed on.
//!
//! A sheet does not own its pieces. Membership lives on the piece as a sheet
//! id, and the layout answers "which pieces are on this sheet".

use puzzlekit_core::SheetId;
use serde::{Deserialize, Serialize};

use crate::geometry::{Margins, Point, Rect, Size};
use crate::grainline::GrainlineType;
use crate::settings::LayoutSettings;

/// Pivot used when rotating the selection.
///
/// `custom` marks an origin the user placed explicitly; otherwise the origin
/// is recomputed from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformationOrigin {
    pub origin: Point,
    pub custom: bool,
}

impl TransformationOrigin {
    pub fn new(origin: Point, custom: bool) -> Self {
        Self { origin, custom }
    }
}

/// A single sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    id: SheetId,
    name: String,
    visible: bool,
    trash: bool,
    size: Size,
    margins: Margins,
    ignore_margins: bool,
    grainline_type: GrainlineType,
    transformation_origin: TransformationOrigin,
}

impl Sheet {
    /// New visible sheet with paper settings taken from `settings`.
    pub fn new(name: impl Into<String>, settings: &LayoutSettings) -> Self {
        Self::with_id(SheetId::new(), name, settings)
    }

    pub fn with_id(id: SheetId, name: impl Into<String>, settings: &LayoutSettings) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            trash: false,
            size: settings.sheet_size,
            margins: settings.sheet_margins,
            ignore_margins: settings.ignore_margins,
            grainline_type: GrainlineType::NotFixed,
            transformation_origin: TransformationOrigin::default(),
        }
    }

    pub(crate) fn new_trash(settings: &LayoutSettings) -> Self {
        let mut sheet = Self::new("Trash", settings);
        sheet.trash = true;
        sheet.visible = false;
        sheet
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_trash(&self) -> bool {
        self.trash
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    pub fn ignore_margins(&self) -> bool {
        self.ignore_margins
    }

    pub fn set_ignore_margins(&mut self, ignore: bool) {
        self.ignore_margins = ignore;
    }

    pub fn grainline_type(&self) -> GrainlineType {
        self.grainline_type
    }

    pub fn set_grainline_type(&mut self, grainline_type: GrainlineType) {
        self.grainline_type = grainline_type;
    }

    /// Grain direction with `NotFixed` resolved from the paper shape.
    ///
    /// Square sheets resolve to `Vertical`. There is no tolerance, so a
    /// nearly square sheet flips orientation with tiny size changes.
    pub fn grainline_orientation(&self) -> GrainlineType {
        match self.grainline_type {
            GrainlineType::NotFixed if self.size.height < self.size.width => {
                GrainlineType::Horizontal
            }
            GrainlineType::NotFixed => GrainlineType::Vertical,
            fixed => fixed,
        }
    }

    pub fn transformation_origin(&self) -> TransformationOrigin {
        self.transformation_origin
    }

    pub fn set_transformation_origin(&mut self, origin: TransformationOrigin) {
        self.transformation_origin = origin;
    }

    /// Whole paper.
    pub fn sheet_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width, self.size.height)
    }

    /// Usable area: the paper inside its margins, or the whole paper when
    /// margins are ignored.
    pub fn margins_rect(&self) -> Rect {
        if self.ignore_margins {
            return self.sheet_rect();
        }
        Rect::new(
            self.margins.left,
            self.margins.top,
            self.size.width - self.margins.right - self.margins.left,
            self.size.height - self.margins.bottom - self.margins.top,
        )
    }

    pub fn is_portrait(&self) -> bool {
        self.size.height >= self.size.width
    }

    /// Reset name, visibility, origin and the trash flag.
    pub fn clear(&mut self) {
        self.name.clear();
        self.visible = true;
        self.transformation_origin = TransformationOrigin::default();
        self.trash = false;
    }
}
