//! Undoable layout mutations.
//!
//! Every change a user makes goes through a [`LayoutCommand`]. A command
//! captures the state it is going to replace when it is built, applies the
//! change in [`redo`](LayoutCommand::redo) and puts the captured state back in
//! [`undo`](LayoutCommand::undo).
//!
//! Commands refer to pieces and sheets by id. Building a command for an id
//! the layout does not know is an error; an id that disappears later is
//! skipped when the command is replayed.

use puzzlekit_core::{LayoutError, LayoutEvent, PieceId, Result, SheetId};
use tracing::trace;

use crate::geometry::normalize_degrees;
use crate::layout::Layout;
use crate::sheet::{Sheet, TransformationOrigin};
use crate::transform::Transform2D;
use crate::zorder::{plan_move, ZValueMove};

/// Runtime tag of a command. Only commands of the same kind merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MovePiece,
    MovePieces,
    RotatePiece,
    RotatePieces,
    MoveOnSheet,
    MoveOrigin,
    ZValueMovePiece,
    ZValueMovePieces,
    AddSheet,
    RemoveSheet,
    Macro,
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum LayoutCommand {
    MovePiece(PieceMove),
    MovePieces(PieceMove),
    RotatePiece(PieceRotate),
    RotatePieces(PieceRotate),
    MoveOnSheet(MoveOnSheet),
    MoveOrigin(OriginMove),
    ZValueMovePiece(PieceZValueMove),
    ZValueMovePieces(PieceZValueMove),
    AddSheet(AddSheet),
    RemoveSheet(RemoveSheet),
    Macro(CommandMacro),
}

/// Translation of one or more pieces.
#[derive(Debug, Clone)]
pub struct PieceMove {
    pub ids: Vec<PieceId>,
    pub dx: f64,
    pub dy: f64,
    pub allow_merge: bool,
    pub old_transforms: Vec<(PieceId, Transform2D)>,
}

/// Rotation of one or more pieces about a fixed origin.
#[derive(Debug, Clone)]
pub struct PieceRotate {
    pub ids: Vec<PieceId>,
    pub origin: TransformationOrigin,
    pub angle: f64,
    /// Whole gesture angle, used instead of `angle` on the first redo of a
    /// piece that follows the grainline.
    pub angle_sum: f64,
    pub allow_merge: bool,
    /// Layout setting at the time the command was built.
    pub follow_grainline: bool,
    pub first_call: bool,
    pub old_transforms: Vec<(PieceId, Transform2D)>,
}

/// Reassignment of a piece to a sheet, the trash, or unplaced.
#[derive(Debug, Clone)]
pub struct MoveOnSheet {
    pub piece: PieceId,
    pub sheet: Option<SheetId>,
    pub old_sheet: Option<SheetId>,
    pub old_transform: Transform2D,
}

#[derive(Debug, Clone)]
pub struct OriginMove {
    pub sheet: SheetId,
    pub origin: TransformationOrigin,
    pub old_origin: TransformationOrigin,
    pub allow_merge: bool,
}

/// Stacking change. `old_values` covers every piece of the sheet.
#[derive(Debug, Clone)]
pub struct PieceZValueMove {
    pub ids: Vec<PieceId>,
    pub direction: ZValueMove,
    pub old_values: Vec<(PieceId, f64)>,
}

#[derive(Debug, Clone)]
pub struct AddSheet {
    pub sheet: Sheet,
}

/// Hides a sheet and unplaces its pieces.
#[derive(Debug, Clone)]
pub struct RemoveSheet {
    pub sheet: SheetId,
    pub pieces: Vec<PieceId>,
}

/// Commands applied and reverted as one step.
#[derive(Debug, Clone)]
pub struct CommandMacro {
    pub text: String,
    pub commands: Vec<LayoutCommand>,
}

impl CommandMacro {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            commands: Vec::new(),
        }
    }
}

impl LayoutCommand {
    // ---------------------------------------------------------------------
    // Constructors

    pub fn move_piece(layout: &Layout, id: &PieceId, dx: f64, dy: f64, allow_merge: bool) -> Result<Self> {
        let old_transforms = capture_transforms(layout, std::slice::from_ref(id))?;
        Ok(LayoutCommand::MovePiece(PieceMove {
            ids: vec![id.clone()],
            dx,
            dy,
            allow_merge,
            old_transforms,
        }))
    }

    pub fn move_pieces(layout: &Layout, ids: &[PieceId], dx: f64, dy: f64, allow_merge: bool) -> Result<Self> {
        let old_transforms = capture_transforms(layout, ids)?;
        Ok(LayoutCommand::MovePieces(PieceMove {
            ids: ids.to_vec(),
            dx,
            dy,
            allow_merge,
            old_transforms,
        }))
    }

    pub fn rotate_piece(
        layout: &Layout,
        id: &PieceId,
        origin: TransformationOrigin,
        angle: f64,
        allow_merge: bool,
    ) -> Result<Self> {
        let rotate = PieceRotate::new(layout, std::slice::from_ref(id), origin, angle, allow_merge)?;
        Ok(LayoutCommand::RotatePiece(rotate))
    }

    pub fn rotate_pieces(
        layout: &Layout,
        ids: &[PieceId],
        origin: TransformationOrigin,
        angle: f64,
        allow_merge: bool,
    ) -> Result<Self> {
        let rotate = PieceRotate::new(layout, ids, origin, angle, allow_merge)?;
        Ok(LayoutCommand::RotatePieces(rotate))
    }

    /// `sheet` may be a regular sheet, the trash, or `None` for unplaced.
    pub fn move_on_sheet(layout: &Layout, id: &PieceId, sheet: Option<SheetId>) -> Result<Self> {
        let piece = layout.piece(id).ok_or_else(|| piece_not_found(id))?;
        if let Some(sheet) = sheet {
            if !layout.is_known_sheet(sheet) {
                return Err(sheet_not_found(sheet).into());
            }
        }

        Ok(LayoutCommand::MoveOnSheet(MoveOnSheet {
            piece: id.clone(),
            sheet,
            old_sheet: piece.sheet(),
            old_transform: *piece.transform(),
        }))
    }

    pub fn move_origin(
        layout: &Layout,
        sheet: SheetId,
        origin: TransformationOrigin,
        allow_merge: bool,
    ) -> Result<Self> {
        let old_origin = layout
            .regular_sheet(sheet)
            .ok_or_else(|| sheet_not_found(sheet))?
            .transformation_origin();

        Ok(LayoutCommand::MoveOrigin(OriginMove {
            sheet,
            origin,
            old_origin,
            allow_merge,
        }))
    }

    pub fn z_value_move_piece(layout: &Layout, id: &PieceId, direction: ZValueMove) -> Result<Self> {
        let z = PieceZValueMove::new(layout, std::slice::from_ref(id), direction)?;
        Ok(LayoutCommand::ZValueMovePiece(z))
    }

    pub fn z_value_move_pieces(layout: &Layout, ids: &[PieceId], direction: ZValueMove) -> Result<Self> {
        let z = PieceZValueMove::new(layout, ids, direction)?;
        Ok(LayoutCommand::ZValueMovePieces(z))
    }

    /// Fails if a sheet with the same id is already part of the layout.
    pub fn add_sheet(layout: &Layout, sheet: Sheet) -> Result<Self> {
        if layout.is_known_sheet(sheet.id()) {
            return Err(LayoutError::DuplicateSheet {
                id: sheet.id().to_string(),
            }
            .into());
        }
        Ok(LayoutCommand::AddSheet(AddSheet { sheet }))
    }

    pub fn remove_sheet(layout: &Layout, sheet: SheetId) -> Result<Self> {
        if layout.regular_sheet(sheet).is_none() {
            return Err(sheet_not_found(sheet).into());
        }
        Ok(LayoutCommand::RemoveSheet(RemoveSheet {
            sheet,
            pieces: layout.piece_ids_for_sheet(Some(sheet)),
        }))
    }

    // ---------------------------------------------------------------------
    // Description

    pub fn kind(&self) -> CommandKind {
        match self {
            LayoutCommand::MovePiece(_) => CommandKind::MovePiece,
            LayoutCommand::MovePieces(_) => CommandKind::MovePieces,
            LayoutCommand::RotatePiece(_) => CommandKind::RotatePiece,
            LayoutCommand::RotatePieces(_) => CommandKind::RotatePieces,
            LayoutCommand::MoveOnSheet(_) => CommandKind::MoveOnSheet,
            LayoutCommand::MoveOrigin(_) => CommandKind::MoveOrigin,
            LayoutCommand::ZValueMovePiece(_) => CommandKind::ZValueMovePiece,
            LayoutCommand::ZValueMovePieces(_) => CommandKind::ZValueMovePieces,
            LayoutCommand::AddSheet(_) => CommandKind::AddSheet,
            LayoutCommand::RemoveSheet(_) => CommandKind::RemoveSheet,
            LayoutCommand::Macro(_) => CommandKind::Macro,
        }
    }

    /// Label shown in undo/redo menus.
    pub fn text(&self) -> &str {
        match self {
            LayoutCommand::MovePiece(_) => "move piece",
            LayoutCommand::MovePieces(_) => "move pieces",
            LayoutCommand::RotatePiece(_) => "rotate piece",
            LayoutCommand::RotatePieces(_) => "rotate pieces",
            LayoutCommand::MoveOnSheet(_) => "move piece on sheet",
            LayoutCommand::MoveOrigin(_) => "move transformation origin",
            LayoutCommand::ZValueMovePiece(_) => "z value move piece",
            LayoutCommand::ZValueMovePieces(_) => "z value move pieces",
            LayoutCommand::AddSheet(_) => "add sheet",
            LayoutCommand::RemoveSheet(_) => "remove sheet",
            LayoutCommand::Macro(cmd) => &cmd.text,
        }
    }

    /// Whether this command takes part in a continuous gesture.
    pub fn allow_merge(&self) -> bool {
        match self {
            LayoutCommand::MovePiece(cmd) | LayoutCommand::MovePieces(cmd) => cmd.allow_merge,
            LayoutCommand::RotatePiece(cmd) | LayoutCommand::RotatePieces(cmd) => cmd.allow_merge,
            LayoutCommand::MoveOrigin(cmd) => cmd.allow_merge,
            _ => false,
        }
    }

    /// Fold `next`, which has already been applied, into this command.
    ///
    /// Returns the combined command, or `None` when the two stay separate
    /// steps. `next` decides whether merging is allowed.
    pub fn try_merge(&self, next: &LayoutCommand) -> Option<LayoutCommand> {
        if self.kind() != next.kind() || !next.allow_merge() {
            return None;
        }

        match (self, next) {
            (LayoutCommand::MovePiece(a), LayoutCommand::MovePiece(b))
            | (LayoutCommand::MovePieces(a), LayoutCommand::MovePieces(b)) => {
                if !same_pieces(&a.ids, &b.ids) {
                    return None;
                }
                let mut merged = a.clone();
                merged.dx += b.dx;
                merged.dy += b.dy;
                Some(self.with_move(merged))
            }
            (LayoutCommand::RotatePiece(a), LayoutCommand::RotatePiece(b))
            | (LayoutCommand::RotatePieces(a), LayoutCommand::RotatePieces(b)) => {
                if !same_pieces(&a.ids, &b.ids)
                    || a.origin != b.origin
                    || a.follow_grainline != b.follow_grainline
                {
                    return None;
                }
                let mut merged = a.clone();
                merged.angle = normalize_degrees(a.angle + b.angle);
                Some(self.with_rotate(merged))
            }
            (LayoutCommand::MoveOrigin(a), LayoutCommand::MoveOrigin(b)) => {
                if a.sheet != b.sheet || a.origin.custom != b.origin.custom {
                    return None;
                }
                let mut merged = a.clone();
                merged.origin = b.origin;
                Some(LayoutCommand::MoveOrigin(merged))
            }
            _ => None,
        }
    }

    fn with_move(&self, cmd: PieceMove) -> LayoutCommand {
        match self {
            LayoutCommand::MovePiece(_) => LayoutCommand::MovePiece(cmd),
            _ => LayoutCommand::MovePieces(cmd),
        }
    }

    fn with_rotate(&self, cmd: PieceRotate) -> LayoutCommand {
        match self {
            LayoutCommand::RotatePiece(_) => LayoutCommand::RotatePiece(cmd),
            _ => LayoutCommand::RotatePieces(cmd),
        }
    }

    // ---------------------------------------------------------------------
    // Replay

    pub fn redo(&mut self, layout: &mut Layout) {
        match self {
            LayoutCommand::MovePiece(cmd) | LayoutCommand::MovePieces(cmd) => {
                let sheet = first_piece_sheet(layout, &cmd.ids);
                focus_sheet(layout, sheet);
                for id in &cmd.ids {
                    if !layout.translate_piece(id, cmd.dx, cmd.dy) {
                        trace!("Skipping move of missing piece {}", id);
                    }
                }
            }
            LayoutCommand::RotatePiece(cmd) | LayoutCommand::RotatePieces(cmd) => {
                cmd.redo(layout);
            }
            LayoutCommand::MoveOnSheet(cmd) => {
                if !layout.contains_piece(&cmd.piece) {
                    trace!("Piece {} is gone, not moving it to another sheet", cmd.piece);
                    return;
                }
                if !layout.set_piece_sheet(&cmd.piece, cmd.sheet) {
                    return;
                }
                if layout.follows_grainline(&cmd.piece) {
                    layout.rotate_piece_to_grainline(&cmd.piece);
                }
                focus_sheet(layout, cmd.sheet);
            }
            LayoutCommand::MoveOrigin(cmd) => {
                if layout.set_transformation_origin(cmd.sheet, cmd.origin) {
                    focus_sheet(layout, Some(cmd.sheet));
                } else {
                    trace!("Sheet {} is gone, origin not moved", cmd.sheet);
                }
            }
            LayoutCommand::ZValueMovePiece(cmd) | LayoutCommand::ZValueMovePieces(cmd) => {
                cmd.redo(layout);
            }
            LayoutCommand::AddSheet(cmd) => {
                let id = cmd.sheet.id();
                if layout.regular_sheet(id).is_some() {
                    layout.set_sheet_visible(id, true);
                } else if let Err(e) = layout.add_sheet(cmd.sheet.clone()) {
                    trace!("Sheet {} not added: {}", id, e);
                    return;
                }
                focus_sheet(layout, Some(id));
            }
            LayoutCommand::RemoveSheet(cmd) => {
                if layout.regular_sheet(cmd.sheet).is_none() {
                    trace!("Sheet {} is gone, nothing to remove", cmd.sheet);
                    return;
                }
                cmd.pieces = layout.piece_ids_for_sheet(Some(cmd.sheet));
                for id in &cmd.pieces {
                    layout.set_piece_sheet(id, None);
                }
                layout.set_sheet_visible(cmd.sheet, false);
                if layout.focused_sheet_id() == Some(cmd.sheet) {
                    layout.set_focused_sheet(None);
                }
            }
            LayoutCommand::Macro(cmd) => {
                for sub in &mut cmd.commands {
                    sub.redo(layout);
                }
            }
        }
    }

    pub fn undo(&mut self, layout: &mut Layout) {
        match self {
            LayoutCommand::MovePiece(cmd) | LayoutCommand::MovePieces(cmd) => {
                let sheet = first_piece_sheet(layout, &cmd.ids);
                focus_sheet(layout, sheet);
                restore_transforms(layout, &cmd.old_transforms);
            }
            LayoutCommand::RotatePiece(cmd) | LayoutCommand::RotatePieces(cmd) => {
                if !cmd.ids.iter().any(|id| layout.contains_piece(id)) {
                    trace!("Rotated pieces are gone, nothing to restore");
                    return;
                }
                let sheet = first_piece_sheet(layout, &cmd.ids);
                focus_sheet(layout, sheet);
                restore_transforms(layout, &cmd.old_transforms);
                layout.emit(LayoutEvent::LayoutChanged);
            }
            LayoutCommand::MoveOnSheet(cmd) => {
                if !layout.contains_piece(&cmd.piece) {
                    trace!("Piece {} is gone, not restoring its sheet", cmd.piece);
                    return;
                }
                let old_sheet = cmd.old_sheet.filter(|s| layout.is_known_sheet(*s));
                layout.set_piece_sheet(&cmd.piece, old_sheet);
                layout.set_piece_transform(&cmd.piece, cmd.old_transform);
                focus_sheet(layout, old_sheet);
            }
            LayoutCommand::MoveOrigin(cmd) => {
                if layout.set_transformation_origin(cmd.sheet, cmd.old_origin) {
                    focus_sheet(layout, Some(cmd.sheet));
                }
            }
            LayoutCommand::ZValueMovePiece(cmd) | LayoutCommand::ZValueMovePieces(cmd) => {
                cmd.undo(layout);
            }
            LayoutCommand::AddSheet(cmd) => {
                let id = cmd.sheet.id();
                if !layout.set_sheet_visible(id, false) {
                    return;
                }
                if layout.focused_sheet_id() == Some(id) {
                    layout.set_focused_sheet(None);
                }
            }
            LayoutCommand::RemoveSheet(cmd) => {
                if !layout.set_sheet_visible(cmd.sheet, true) {
                    trace!("Sheet {} is gone, nothing to restore", cmd.sheet);
                    return;
                }
                for id in &cmd.pieces {
                    layout.set_piece_sheet(id, Some(cmd.sheet));
                }
                focus_sheet(layout, Some(cmd.sheet));
            }
            LayoutCommand::Macro(cmd) => {
                for sub in cmd.commands.iter_mut().rev() {
                    sub.undo(layout);
                }
            }
        }
    }
}

impl PieceRotate {
    fn new(
        layout: &Layout,
        ids: &[PieceId],
        origin: TransformationOrigin,
        angle: f64,
        allow_merge: bool,
    ) -> Result<Self> {
        Ok(Self {
            ids: ids.to_vec(),
            origin,
            angle,
            angle_sum: angle,
            allow_merge,
            follow_grainline: layout.settings().follow_grainline,
            first_call: true,
            old_transforms: capture_transforms(layout, ids)?,
        })
    }

    fn redo(&mut self, layout: &mut Layout) {
        if !self.ids.iter().any(|id| layout.contains_piece(id)) {
            trace!("Rotated pieces are gone, nothing to rotate");
            return;
        }
        let sheet = first_piece_sheet(layout, &self.ids);
        focus_sheet(layout, sheet);

        for id in &self.ids {
            let Some(piece) = layout.piece(id) else {
                trace!("Skipping rotation of missing piece {}", id);
                continue;
            };
            let follow = self.follow_grainline || piece.is_follow_grainline();
            let angle = if self.first_call && follow && piece.grainline().enabled {
                self.angle_sum
            } else {
                self.angle
            };

            layout.rotate_piece(id, &self.origin.origin, angle);
            if follow {
                layout.rotate_piece_to_grainline_about(id, &self.origin);
            }
        }

        self.first_call = false;
        layout.emit(LayoutEvent::LayoutChanged);
    }
}

impl LayoutCommand {
    /// Rotation whose first redo on grainline-following pieces uses the
    /// accumulated gesture angle.
    pub fn with_angle_sum(mut self, angle_sum: f64) -> Self {
        if let LayoutCommand::RotatePiece(cmd) | LayoutCommand::RotatePieces(cmd) = &mut self {
            cmd.angle_sum = angle_sum;
        }
        self
    }
}

impl PieceZValueMove {
    fn new(layout: &Layout, ids: &[PieceId], direction: ZValueMove) -> Result<Self> {
        if ids.is_empty() {
            return Err(LayoutError::EmptyPieceSet.into());
        }
        if let Some(missing) = ids.iter().find(|id| !layout.contains_piece(id)) {
            return Err(piece_not_found(missing).into());
        }

        let old_values = match first_piece_sheet(layout, ids) {
            Some(sheet) => sheet_z_values(layout, sheet),
            None => Vec::new(),
        };
        Ok(Self {
            ids: ids.to_vec(),
            direction,
            old_values,
        })
    }

    fn redo(&mut self, layout: &mut Layout) {
        let Some(sheet) = first_piece_sheet(layout, &self.ids) else {
            trace!("Z value move without a sheet, nothing to do");
            return;
        };
        focus_sheet(layout, Some(sheet));

        let current = sheet_z_values(layout, sheet);
        let planned = plan_move(&current, &self.ids, self.direction);
        for (id, _) in &current {
            if let Some(z) = planned.get(id) {
                layout.set_piece_z_value(id, *z);
            }
        }
        layout.emit(LayoutEvent::LayoutChanged);
    }

    fn undo(&mut self, layout: &mut Layout) {
        let Some(sheet) = first_piece_sheet(layout, &self.ids) else {
            return;
        };
        focus_sheet(layout, Some(sheet));

        for (id, z) in &self.old_values {
            if layout.piece(id).is_some_and(|p| p.sheet() == Some(sheet)) {
                layout.set_piece_z_value(id, *z);
            }
        }
    }
}

fn piece_not_found(id: &PieceId) -> LayoutError {
    LayoutError::PieceNotFound { id: id.to_string() }
}

fn sheet_not_found(id: SheetId) -> LayoutError {
    LayoutError::SheetNotFound { id: id.to_string() }
}

fn capture_transforms(layout: &Layout, ids: &[PieceId]) -> Result<Vec<(PieceId, Transform2D)>> {
    if ids.is_empty() {
        return Err(LayoutError::EmptyPieceSet.into());
    }
    ids.iter()
        .map(|id| {
            layout
                .piece(id)
                .map(|p| (id.clone(), *p.transform()))
                .ok_or_else(|| piece_not_found(id).into())
        })
        .collect()
}

fn restore_transforms(layout: &mut Layout, transforms: &[(PieceId, Transform2D)]) {
    for (id, transform) in transforms {
        if !layout.set_piece_transform(id, *transform) {
            trace!("Piece {} is gone, transform not restored", id);
        }
    }
}

fn sheet_z_values(layout: &Layout, sheet: SheetId) -> Vec<(PieceId, f64)> {
    layout
        .pieces_for_sheet(Some(sheet))
        .into_iter()
        .map(|p| (p.unique_id(), p.z_value()))
        .collect()
}

/// Sheet of the first piece that still exists.
fn first_piece_sheet(layout: &Layout, ids: &[PieceId]) -> Option<SheetId> {
    ids.iter().find_map(|id| layout.piece(id)).and_then(|p| p.sheet())
}

fn focus_sheet(layout: &mut Layout, sheet: Option<SheetId>) {
    let Some(sheet) = sheet else {
        return;
    };
    if layout.regular_sheet(sheet).is_some() && layout.focused_sheet_id() != Some(sheet) {
        layout.set_focused_sheet(Some(sheet));
    }
}

fn same_pieces(a: &[PieceId], b: &[PieceId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}
