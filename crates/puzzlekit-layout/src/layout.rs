//! The layout aggregate.
//!
//! `Layout` owns every piece and sheet of a document. Pieces point at their
//! sheet by id; a piece without a sheet is unplaced, a piece on the trash
//! sheet is deleted but still registered. Every mutation goes through here so
//! change events and position validation stay in step with the state.

use std::collections::HashMap;

use puzzlekit_core::{EventBus, LayoutError, LayoutEvent, PieceId, SheetId, Unit};
use puzzlekit_settings::LayoutDefaults;
use tracing::{debug, trace};

use crate::geometry::{Margins, Point, Rect, Size, Vector};
use crate::grainline::GrainlineType;
use crate::piece::{Piece, PieceSource};
use crate::settings::LayoutSettings;
use crate::sheet::{Sheet, TransformationOrigin};
use crate::sticky;
use crate::transform::Transform2D;
use crate::validation::{validate_positions, SheetPiece};

/// Room left after the last piece by [`Layout::remove_unused_length`], px.
const UNUSED_LENGTH_EXTRA: f64 = 2.0;

/// Pieces, sheets and settings of one document.
#[derive(Debug)]
pub struct Layout {
    defaults: LayoutDefaults,
    settings: LayoutSettings,
    pieces: HashMap<PieceId, Piece>,
    sheets: Vec<Sheet>,
    trash: Sheet,
    focused: Option<SheetId>,
    events: EventBus,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(&LayoutDefaults::default())
    }
}

impl Layout {
    /// Empty layout configured from `defaults`.
    pub fn new(defaults: &LayoutDefaults) -> Self {
        Self::with_event_bus(defaults, EventBus::new())
    }

    pub fn with_event_bus(defaults: &LayoutDefaults, events: EventBus) -> Self {
        let settings = LayoutSettings::from(defaults);
        let trash = Sheet::new_trash(&settings);
        Self {
            defaults: defaults.clone(),
            settings,
            pieces: HashMap::new(),
            sheets: Vec::new(),
            trash,
            focused: None,
            events,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub(crate) fn emit(&self, event: LayoutEvent) {
        if let Err(e) = self.events.publish(event) {
            trace!("Layout event dropped: {}", e);
        }
    }

    /// Drop all pieces and sheets and restore the initial settings.
    pub fn clear(&mut self) {
        self.settings = LayoutSettings::from(&self.defaults);
        self.pieces.clear();
        self.sheets.clear();
        self.trash = Sheet::new_trash(&self.settings);
        self.focused = None;
        debug!("Layout cleared");
        self.emit(LayoutEvent::SheetListChanged);
        self.emit(LayoutEvent::LayoutChanged);
    }

    // ---------------------------------------------------------------------
    // Pieces

    /// Register `quantity` copies of a source piece at the layout scale.
    pub fn import_piece(&mut self, source: &PieceSource) -> Vec<PieceId> {
        let (x_scale, y_scale) = (self.settings.horizontal_scale, self.settings.vertical_scale);
        let mut ids = Vec::with_capacity(source.quantity.max(1) as usize);
        for copy in 1..=source.quantity.max(1) {
            ids.push(self.add_piece(Piece::from_source(source, copy, x_scale, y_scale)));
        }
        ids
    }

    /// Register a piece, or update the registered piece with the same id.
    ///
    /// Updating keeps the placement of the registered piece.
    pub fn add_piece(&mut self, mut piece: Piece) -> PieceId {
        let id = piece.unique_id();

        if let Some(existing) = self.pieces.get_mut(&id) {
            let before = *existing.transform();
            existing.update(&piece);
            let moved = *existing.transform() != before;
            let sheet = existing.sheet();
            debug!("Updated piece {}", id);
            if moved {
                self.emit(LayoutEvent::PieceTransformationChanged { piece: id.clone() });
            }
            if let Some(sheet) = sheet {
                self.revalidate_sheet(sheet);
            }
            return id;
        }

        if let Some(sheet) = piece.sheet() {
            if !self.is_known_sheet(sheet) {
                debug!("Piece {} refers to unknown sheet {}, unplacing", id, sheet);
                piece.set_sheet(None);
            }
        }
        let sheet = piece.sheet();
        self.pieces.insert(id.clone(), piece);
        trace!("Added piece {}", id);
        self.emit(LayoutEvent::PieceSheetChanged { piece: id.clone() });
        if let Some(sheet) = sheet {
            self.revalidate_sheet(sheet);
        }
        id
    }

    /// Unregister a piece.
    pub fn remove_piece(&mut self, id: &PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(id)?;
        debug!("Removed piece {}", id);
        self.emit(LayoutEvent::LayoutChanged);
        if let Some(sheet) = piece.sheet() {
            self.revalidate_sheet(sheet);
        }
        Some(piece)
    }

    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    /// Direct access without events or validation.
    pub fn piece_mut(&mut self, id: &PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    pub fn contains_piece(&self, id: &PieceId) -> bool {
        self.pieces.contains_key(id)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// All pieces, ordered by unique id.
    pub fn pieces(&self) -> Vec<&Piece> {
        self.sorted_pieces(|_| true)
    }

    /// Pieces on a regular sheet.
    pub fn placed_pieces(&self) -> Vec<&Piece> {
        let trash = self.trash.id();
        self.sorted_pieces(|p| p.sheet().is_some_and(|s| s != trash))
    }

    pub fn unplaced_pieces(&self) -> Vec<&Piece> {
        self.pieces_for_sheet(None)
    }

    pub fn trashed_pieces(&self) -> Vec<&Piece> {
        self.pieces_for_sheet(Some(self.trash.id()))
    }

    /// Pieces whose sheet is `sheet`; `None` selects unplaced pieces.
    pub fn pieces_for_sheet(&self, sheet: Option<SheetId>) -> Vec<&Piece> {
        self.sorted_pieces(|p| p.sheet() == sheet)
    }

    pub fn piece_ids_for_sheet(&self, sheet: Option<SheetId>) -> Vec<PieceId> {
        self.pieces_for_sheet(sheet)
            .into_iter()
            .map(Piece::unique_id)
            .collect()
    }

    fn sorted_pieces(&self, filter: impl Fn(&Piece) -> bool) -> Vec<&Piece> {
        let mut found: Vec<(&PieceId, &Piece)> =
            self.pieces.iter().filter(|(_, p)| filter(p)).collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found.into_iter().map(|(_, p)| p).collect()
    }

    // ---------------------------------------------------------------------
    // Sheets

    /// Append a sheet. The first sheet added becomes the focused one.
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<SheetId, LayoutError> {
        let id = sheet.id();
        if self.is_known_sheet(id) {
            return Err(LayoutError::DuplicateSheet { id: id.to_string() });
        }
        Ok(self.push_sheet(sheet))
    }

    /// Append a new sheet with the layout's paper settings.
    pub fn create_sheet(&mut self, name: impl Into<String>) -> SheetId {
        let sheet = Sheet::new(name, &self.settings);
        self.push_sheet(sheet)
    }

    fn push_sheet(&mut self, sheet: Sheet) -> SheetId {
        let id = sheet.id();
        self.sheets.push(sheet);
        debug!("Added sheet {}", id);
        self.emit(LayoutEvent::SheetListChanged);
        if self.focused.is_none() {
            self.set_focused_sheet(Some(id));
        }
        id
    }

    /// A regular sheet or the trash sheet.
    pub fn sheet(&self, id: SheetId) -> Option<&Sheet> {
        if self.trash.id() == id {
            return Some(&self.trash);
        }
        self.sheets.iter().find(|s| s.id() == id)
    }

    /// Direct access without events or validation.
    pub fn sheet_mut(&mut self, id: SheetId) -> Option<&mut Sheet> {
        if self.trash.id() == id {
            return Some(&mut self.trash);
        }
        self.sheets.iter_mut().find(|s| s.id() == id)
    }

    pub(crate) fn regular_sheet(&self, id: SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id() == id)
    }

    fn regular_sheet_mut(&mut self, id: SheetId) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id() == id)
    }

    /// Visible sheets in order.
    pub fn sheets(&self) -> Vec<&Sheet> {
        self.sheets.iter().filter(|s| s.is_visible()).collect()
    }

    /// Every sheet in order, hidden ones included. The trash is not listed.
    pub fn all_sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn trash_sheet(&self) -> &Sheet {
        &self.trash
    }

    /// Regular sheet or trash.
    pub fn is_known_sheet(&self, id: SheetId) -> bool {
        self.sheet(id).is_some()
    }

    pub fn focused_sheet_id(&self) -> Option<SheetId> {
        self.focused
    }

    pub fn focused_sheet(&self) -> Option<&Sheet> {
        self.focused.and_then(|id| self.regular_sheet(id))
    }

    /// Focus a sheet.
    ///
    /// `None` or an unknown id falls back to the first visible sheet, then to
    /// the first sheet. Focus is empty only when there are no sheets.
    pub fn set_focused_sheet(&mut self, sheet: Option<SheetId>) {
        let resolved = match sheet {
            Some(id) if self.regular_sheet(id).is_some() => Some(id),
            _ => self
                .sheets
                .iter()
                .find(|s| s.is_visible())
                .or_else(|| self.sheets.first())
                .map(Sheet::id),
        };

        self.focused = resolved;
        self.emit(LayoutEvent::ActiveSheetChanged { sheet: resolved });
    }

    /// All visible sheets share one paper size, portrait or landscape.
    pub fn is_sheets_uniform(&self) -> bool {
        let sheets = self.sheets();
        let Some(first) = sheets.first() else {
            return true;
        };

        let rounded = |size: Size| (size.width.round() as i64, size.height.round() as i64);
        let (w, h) = rounded(first.size());
        sheets.iter().all(|s| {
            let size = rounded(s.size());
            size == (w, h) || size == (h, w)
        })
    }

    // ---------------------------------------------------------------------
    // Piece mutations

    /// Move a piece to a sheet, to the trash or (with `None`) to unplaced.
    ///
    /// Pieces leaving the regular sheets lose their selection and warnings.
    pub fn set_piece_sheet(&mut self, id: &PieceId, sheet: Option<SheetId>) -> bool {
        if let Some(sheet) = sheet {
            if !self.is_known_sheet(sheet) {
                trace!("Cannot move {} to unknown sheet {}", id, sheet);
                return false;
            }
        }

        let trash = self.trash.id();
        let Some(piece) = self.pieces.get_mut(id) else {
            trace!("Cannot move unknown piece {}", id);
            return false;
        };

        let old = piece.sheet();
        piece.set_sheet(sheet);
        let parked = sheet.is_none() || sheet == Some(trash);
        let mut validity_changed = false;
        if parked {
            piece.set_selected(false);
            validity_changed = piece.reset_warnings();
        }

        self.emit(LayoutEvent::PieceSheetChanged { piece: id.clone() });
        if validity_changed {
            self.emit(LayoutEvent::PiecePositionValidityChanged { piece: id.clone() });
        }

        if let Some(old) = old.filter(|old| Some(*old) != sheet) {
            self.revalidate_sheet(old);
        }
        if let Some(sheet) = sheet {
            self.revalidate_sheet(sheet);
        }
        true
    }

    pub fn set_piece_transform(&mut self, id: &PieceId, transform: Transform2D) -> bool {
        self.mutate_piece(id, |p| p.set_transform(transform))
    }

    pub fn translate_piece(&mut self, id: &PieceId, dx: f64, dy: f64) -> bool {
        self.mutate_piece(id, |p| p.translate(dx, dy))
    }

    pub fn rotate_piece(&mut self, id: &PieceId, center: &Point, degrees: f64) -> bool {
        let center = *center;
        self.mutate_piece(id, |p| p.rotate(&center, degrees))
    }

    pub fn flip_piece_vertically(&mut self, id: &PieceId) -> bool {
        self.mutate_piece(id, Piece::flip_vertically)
    }

    pub fn flip_piece_horizontally(&mut self, id: &PieceId) -> bool {
        self.mutate_piece(id, Piece::flip_horizontally)
    }

    pub fn clear_piece_transformations(&mut self, id: &PieceId) -> bool {
        self.mutate_piece(id, Piece::clear_transformations)
    }

    pub fn set_piece_position(&mut self, id: &PieceId, pos: Point) -> bool {
        self.mutate_piece(id, |p| p.set_position(pos))
    }

    /// Align a placed piece with the grain of its sheet, pivoting on the
    /// sheet's transformation origin.
    ///
    /// Returns the applied rotation. Unplaced or trashed pieces and pieces
    /// without a usable grainline are left alone.
    pub fn rotate_piece_to_grainline(&mut self, id: &PieceId) -> Option<f64> {
        let sheet_id = self.pieces.get(id)?.sheet()?;
        let origin = self.regular_sheet(sheet_id)?.transformation_origin();
        self.rotate_piece_to_grainline_about(id, &origin)
    }

    /// Same as [`rotate_piece_to_grainline`](Self::rotate_piece_to_grainline)
    /// with an explicit origin.
    pub fn rotate_piece_to_grainline_about(
        &mut self,
        id: &PieceId,
        origin: &TransformationOrigin,
    ) -> Option<f64> {
        let sheet_id = self.pieces.get(id)?.sheet()?;
        let orientation = self.regular_sheet(sheet_id)?.grainline_orientation();

        let angle = self
            .pieces
            .get_mut(id)?
            .rotate_to_grainline(orientation, origin)?;
        trace!("Rotated {} by {:.3} to follow grainline", id, angle);
        self.piece_geometry_changed(id);
        Some(angle)
    }

    /// The piece or the layout asks for grainline alignment.
    pub fn follows_grainline(&self, id: &PieceId) -> bool {
        self.settings.follow_grainline
            || self.pieces.get(id).is_some_and(Piece::is_follow_grainline)
    }

    pub fn set_piece_z_value(&mut self, id: &PieceId, z: f64) -> bool {
        let Some(piece) = self.pieces.get_mut(id) else {
            return false;
        };
        piece.set_z_value(z);
        self.emit(LayoutEvent::PieceZValueChanged { piece: id.clone() });
        true
    }

    /// Sticky-edge correction for a placed piece.
    pub fn sticky_position(&self, id: &PieceId) -> Option<Vector> {
        let piece = self.pieces.get(id)?;
        let sheet_id = piece.sheet()?;
        let sheet = self.regular_sheet(sheet_id)?;
        let others = self
            .pieces
            .values()
            .filter(|p| p.sheet() == Some(sheet_id));
        sticky::sticky_position(piece, others, sheet, &self.settings)
    }

    fn mutate_piece(&mut self, id: &PieceId, change: impl FnOnce(&mut Piece)) -> bool {
        let Some(piece) = self.pieces.get_mut(id) else {
            trace!("Piece {} is gone, nothing to change", id);
            return false;
        };
        change(piece);
        self.piece_geometry_changed(id);
        true
    }

    fn piece_geometry_changed(&mut self, id: &PieceId) {
        self.emit(LayoutEvent::PieceTransformationChanged { piece: id.clone() });
        if let Some(sheet) = self.pieces.get(id).and_then(Piece::sheet) {
            self.revalidate_sheet(sheet);
        }
    }

    // ---------------------------------------------------------------------
    // Selection

    pub fn select_piece(&mut self, id: &PieceId, selected: bool) -> bool {
        let Some(piece) = self.pieces.get_mut(id) else {
            return false;
        };
        if piece.is_selected() == selected {
            return false;
        }
        piece.set_selected(selected);
        self.emit(LayoutEvent::PieceSelectionChanged { piece: id.clone() });
        true
    }

    /// Deselect every piece of a sheet.
    pub fn clear_selection(&mut self, sheet: SheetId) {
        for id in self.piece_ids_for_sheet(Some(sheet)) {
            self.select_piece(&id, false);
        }
    }

    pub fn selected_pieces(&self, sheet: SheetId) -> Vec<&Piece> {
        self.sorted_pieces(|p| p.sheet() == Some(sheet) && p.is_selected())
    }

    // ---------------------------------------------------------------------
    // Sheet mutations

    pub fn set_transformation_origin(&mut self, sheet: SheetId, origin: TransformationOrigin) -> bool {
        let Some(s) = self.sheet_mut(sheet) else {
            return false;
        };
        s.set_transformation_origin(origin);
        self.emit(LayoutEvent::TransformationOriginChanged { sheet });
        true
    }

    pub fn set_sheet_visible(&mut self, sheet: SheetId, visible: bool) -> bool {
        let Some(s) = self.regular_sheet_mut(sheet) else {
            return false;
        };
        s.set_visible(visible);
        self.emit(LayoutEvent::SheetListChanged);
        true
    }

    pub fn set_sheet_name(&mut self, sheet: SheetId, name: impl Into<String>) -> bool {
        let Some(s) = self.regular_sheet_mut(sheet) else {
            return false;
        };
        s.set_name(name);
        self.emit(LayoutEvent::SheetListChanged);
        true
    }

    pub fn set_sheet_size(&mut self, sheet: SheetId, size: Size) -> bool {
        self.mutate_sheet(sheet, |s| s.set_size(size))
    }

    pub fn set_sheet_margins(&mut self, sheet: SheetId, margins: Margins) -> bool {
        self.mutate_sheet(sheet, |s| s.set_margins(margins))
    }

    pub fn set_sheet_ignore_margins(&mut self, sheet: SheetId, ignore: bool) -> bool {
        self.mutate_sheet(sheet, |s| s.set_ignore_margins(ignore))
    }

    pub fn set_sheet_grainline_type(&mut self, sheet: SheetId, grainline_type: GrainlineType) -> bool {
        let Some(s) = self.regular_sheet_mut(sheet) else {
            return false;
        };
        s.set_grainline_type(grainline_type);
        self.emit(LayoutEvent::LayoutChanged);
        true
    }

    fn mutate_sheet(&mut self, sheet: SheetId, change: impl FnOnce(&mut Sheet)) -> bool {
        let Some(s) = self.regular_sheet_mut(sheet) else {
            trace!("Sheet {} is gone, nothing to change", sheet);
            return false;
        };
        change(s);
        self.emit(LayoutEvent::LayoutChanged);
        self.revalidate_sheet(sheet);
        true
    }

    /// Shrink a sheet along its grain to the extent of its pieces.
    ///
    /// The pieces are deselected. Returns whether the sheet got shorter.
    pub fn remove_unused_length(&mut self, sheet: SheetId) -> bool {
        let ids = self.piece_ids_for_sheet(Some(sheet));
        if ids.is_empty() || self.regular_sheet(sheet).is_none() {
            return false;
        }

        let mut used: Option<Rect> = None;
        for id in &ids {
            self.select_piece(id, false);
            if let Some(piece) = self.pieces.get(id) {
                let rect = piece.mapped_bounding_rect();
                used = Some(match used {
                    Some(u) => u.united(&rect),
                    None => rect,
                });
            }
        }
        let Some(used) = used else {
            return false;
        };

        let Some(s) = self.regular_sheet(sheet) else {
            return false;
        };
        let size = s.size();
        let margins = if s.ignore_margins() {
            Margins::default()
        } else {
            s.margins()
        };

        let new_size = match s.grainline_orientation() {
            GrainlineType::Vertical if size.height - margins.bottom > used.bottom() => Some(Size::new(
                size.width,
                used.bottom() + margins.bottom + UNUSED_LENGTH_EXTRA,
            )),
            GrainlineType::Horizontal if size.width - margins.right > used.right() => Some(Size::new(
                used.right() + margins.right + UNUSED_LENGTH_EXTRA,
                size.height,
            )),
            _ => None,
        }
        .filter(|new_size| *new_size != size);

        match new_size {
            Some(new_size) => {
                debug!(
                    "Sheet {} trimmed from {:.1}x{:.1} to {:.1}x{:.1}",
                    sheet, size.width, size.height, new_size.width, new_size.height
                );
                self.set_sheet_size(sheet, new_size)
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Settings

    pub fn set_unit(&mut self, unit: Unit) {
        self.settings.unit = unit;
        self.emit(LayoutEvent::LayoutChanged);
    }

    /// Gap between pieces in px. Negative values are clamped to zero.
    pub fn set_pieces_gap(&mut self, gap: f64) {
        let gap = gap.max(0.0);
        if gap == self.settings.pieces_gap {
            return;
        }
        self.settings.pieces_gap = gap;
        self.check_all_positions();
        self.emit(LayoutEvent::LayoutChanged);
    }

    pub fn set_warning_superposition(&mut self, enabled: bool) {
        self.settings.warning_superposition = enabled;
        self.check_all_positions();
    }

    pub fn set_warning_out_of_bound(&mut self, enabled: bool) {
        self.settings.warning_out_of_bound = enabled;
        self.check_all_positions();
    }

    pub fn set_warning_gap_position(&mut self, enabled: bool) {
        self.settings.warning_gap_position = enabled;
        self.check_all_positions();
    }

    pub fn set_sticky_edges(&mut self, enabled: bool) {
        self.settings.sticky_edges = enabled;
    }

    pub fn set_sticky_sheet_edges(&mut self, enabled: bool) {
        self.settings.sticky_sheet_edges = enabled;
    }

    pub fn set_follow_grainline(&mut self, enabled: bool) {
        self.settings.follow_grainline = enabled;
    }

    // ---------------------------------------------------------------------
    // Validation

    /// Recompute the warnings of every piece on a regular sheet.
    ///
    /// Only pieces whose flags actually change are reported.
    pub fn check_pieces_position_validity(&mut self, sheet: SheetId) {
        let Some(s) = self.regular_sheet(sheet) else {
            return;
        };
        let usable = s.margins_rect();

        let snapshot: Vec<SheetPiece> = self
            .pieces_for_sheet(Some(sheet))
            .into_iter()
            .map(|p| SheetPiece {
                id: p.unique_id(),
                contour: p.mapped_external_contour(),
            })
            .collect();
        let results = validate_positions(&snapshot, &usable, &self.settings);

        for entry in &snapshot {
            let (Some(validity), Some(piece)) = (results.get(&entry.id), self.pieces.get_mut(&entry.id))
            else {
                continue;
            };
            let a = piece.set_out_of_bound(validity.out_of_bound);
            let b = piece.set_has_superposition(validity.superposition);
            let c = piece.set_invalid_gap_position(validity.gap);
            if a || b || c {
                self.emit(LayoutEvent::PiecePositionValidityChanged {
                    piece: entry.id.clone(),
                });
            }
        }
    }

    /// Validate every regular sheet.
    pub fn check_all_positions(&mut self) {
        let ids: Vec<SheetId> = self.sheets.iter().map(Sheet::id).collect();
        for id in ids {
            self.check_pieces_position_validity(id);
        }
    }

    fn revalidate_sheet(&mut self, sheet: SheetId) {
        if self.settings.any_warning() {
            self.check_pieces_position_validity(sheet);
        }
    }
}
