//! Undo/redo history of layout commands

use tracing::{debug, trace, warn};

use crate::commands::{CommandMacro, LayoutCommand};
use crate::layout::Layout;

/// Applied and undone commands of one layout
#[derive(Debug, Default)]
pub struct UndoStack {
    undo_stack: Vec<LayoutCommand>,
    redo_stack: Vec<LayoutCommand>,
    /// Maximum number of undo steps, 0 for no limit
    undo_limit: usize,
    /// Macros being recorded, innermost last
    open_macros: Vec<CommandMacro>,
}

impl UndoStack {
    /// Create an unbounded stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a maximum undo depth (0 means unbounded)
    pub fn with_limit(undo_limit: usize) -> Self {
        Self {
            undo_limit,
            ..Self::default()
        }
    }

    /// Apply `command` and record it.
    ///
    /// Outside a macro the command is folded into the previous step when
    /// both belong to the same gesture. Pushing drops everything that could
    /// have been redone.
    pub fn push(&mut self, mut command: LayoutCommand, layout: &mut Layout) {
        command.redo(layout);

        if let Some(open) = self.open_macros.last_mut() {
            open.commands.push(command);
            return;
        }

        self.redo_stack.clear();
        if let Some(top) = self.undo_stack.last_mut() {
            if let Some(merged) = top.try_merge(&command) {
                trace!("Merged '{}' into the previous step", command.text());
                *top = merged;
                return;
            }
        }
        self.record(command);
    }

    fn record(&mut self, command: LayoutCommand) {
        self.undo_stack.push(command);
        if self.undo_limit > 0 && self.undo_stack.len() > self.undo_limit {
            let excess = self.undo_stack.len() - self.undo_limit;
            self.undo_stack.drain(..excess);
        }
    }

    /// Start recording a macro. Commands pushed until the matching
    /// [`end_macro`](Self::end_macro) become one step.
    pub fn begin_macro(&mut self, text: impl Into<String>) {
        self.open_macros.push(CommandMacro::new(text));
    }

    /// Close the innermost macro. Empty macros leave no step behind.
    pub fn end_macro(&mut self) {
        let Some(finished) = self.open_macros.pop() else {
            warn!("end_macro called without a matching begin_macro");
            return;
        };
        if finished.commands.is_empty() {
            return;
        }

        let command = LayoutCommand::Macro(finished);
        match self.open_macros.last_mut() {
            Some(parent) => parent.commands.push(command),
            None => {
                self.redo_stack.clear();
                self.record(command);
            }
        }
    }

    /// Apply `commands` as a single named step.
    pub fn push_macro(
        &mut self,
        text: impl Into<String>,
        commands: impl IntoIterator<Item = LayoutCommand>,
        layout: &mut Layout,
    ) {
        self.begin_macro(text);
        for command in commands {
            self.push(command, layout);
        }
        self.end_macro();
    }

    pub fn is_recording_macro(&self) -> bool {
        !self.open_macros.is_empty()
    }

    /// Revert the last step. Returns false if there is nothing to undo.
    pub fn undo(&mut self, layout: &mut Layout) -> bool {
        if self.is_recording_macro() {
            warn!("Cannot undo while a macro is being recorded");
            return false;
        }
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };
        debug!("Undo '{}'", command.text());
        command.undo(layout);
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the last undone step. Returns false if there is nothing to redo.
    pub fn redo(&mut self, layout: &mut Layout) -> bool {
        if self.is_recording_macro() {
            warn!("Cannot redo while a macro is being recorded");
            return false;
        }
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        debug!("Redo '{}'", command.text());
        command.redo(layout);
        self.undo_stack.push(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() && !self.is_recording_macro()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty() && !self.is_recording_macro()
    }

    pub fn undo_text(&self) -> Option<&str> {
        self.undo_stack.last().map(LayoutCommand::text)
    }

    pub fn redo_text(&self) -> Option<&str> {
        self.redo_stack.last().map(LayoutCommand::text)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Change the depth limit, dropping the oldest steps if needed.
    pub fn set_undo_limit(&mut self, undo_limit: usize) {
        self.undo_limit = undo_limit;
        if undo_limit > 0 && self.undo_stack.len() > undo_limit {
            let excess = self.undo_stack.len() - undo_limit;
            self.undo_stack.drain(..excess);
        }
    }

    /// Forget all history, including macros still being recorded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_macros.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::piece::PieceSource;
    use puzzlekit_core::PieceId;

    fn setup() -> (Layout, PieceId) {
        let mut layout = Layout::default();
        let sheet = layout.create_sheet("Sheet 1");
        let source = PieceSource::new(
            "front",
            "Front",
            vec![point(0.0, 0.0), point(30.0, 0.0), point(30.0, 30.0), point(0.0, 30.0)],
        );
        let id = layout.import_piece(&source).remove(0);
        layout.set_piece_sheet(&id, Some(sheet));
        (layout, id)
    }

    fn dx(layout: &Layout, id: &PieceId) -> f64 {
        layout.piece(id).unwrap().transform().dx()
    }

    #[test]
    fn test_push_undo_redo() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::new();
        assert!(!stack.can_undo());

        let cmd = LayoutCommand::move_piece(&layout, &id, 10.0, 0.0, false).unwrap();
        stack.push(cmd, &mut layout);
        assert_eq!(dx(&layout, &id), 10.0);
        assert_eq!(stack.undo_text(), Some("move piece"));

        assert!(stack.undo(&mut layout));
        assert_eq!(dx(&layout, &id), 0.0);
        assert_eq!(stack.redo_text(), Some("move piece"));

        assert!(stack.redo(&mut layout));
        assert_eq!(dx(&layout, &id), 10.0);
        assert!(!stack.redo(&mut layout));
    }

    #[test]
    fn test_gesture_is_one_step() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::new();

        let first = LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, false).unwrap();
        stack.push(first, &mut layout);
        for _ in 0..5 {
            let step = LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, true).unwrap();
            stack.push(step, &mut layout);
        }
        assert_eq!(stack.undo_count(), 1);
        assert_eq!(dx(&layout, &id), 6.0);

        let pause = LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, false).unwrap();
        stack.push(pause, &mut layout);
        assert_eq!(stack.undo_count(), 2);

        stack.undo(&mut layout);
        stack.undo(&mut layout);
        assert_eq!(dx(&layout, &id), 0.0);
    }

    #[test]
    fn test_push_clears_redo() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::new();
        stack.push(LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, false).unwrap(), &mut layout);
        stack.undo(&mut layout);
        assert!(stack.can_redo());

        stack.push(LayoutCommand::move_piece(&layout, &id, 2.0, 0.0, false).unwrap(), &mut layout);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_limit_drops_oldest() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::with_limit(2);
        for _ in 0..4 {
            let cmd = LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, false).unwrap();
            stack.push(cmd, &mut layout);
        }
        assert_eq!(stack.undo_count(), 2);
        while stack.undo(&mut layout) {}
        assert_eq!(dx(&layout, &id), 2.0);

        stack.set_undo_limit(0);
        assert_eq!(stack.undo_limit(), 0);
    }

    #[test]
    fn test_macro_is_one_step() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::new();

        stack.begin_macro("nudge");
        stack.push(LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, true).unwrap(), &mut layout);
        stack.push(LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, true).unwrap(), &mut layout);
        assert!(!stack.can_undo());
        assert!(!stack.undo(&mut layout));
        stack.end_macro();

        assert_eq!(stack.undo_count(), 1);
        assert_eq!(stack.undo_text(), Some("nudge"));
        assert_eq!(dx(&layout, &id), 2.0);

        stack.undo(&mut layout);
        assert_eq!(dx(&layout, &id), 0.0);
        stack.redo(&mut layout);
        assert_eq!(dx(&layout, &id), 2.0);
    }

    #[test]
    fn test_empty_macro_leaves_nothing() {
        let (mut layout, _) = setup();
        let mut stack = UndoStack::new();
        stack.push_macro("nothing", Vec::new(), &mut layout);
        assert_eq!(stack.undo_count(), 0);
        stack.end_macro();
        assert!(!stack.is_recording_macro());
    }

    #[test]
    fn test_clear() {
        let (mut layout, id) = setup();
        let mut stack = UndoStack::new();
        stack.push(LayoutCommand::move_piece(&layout, &id, 1.0, 0.0, false).unwrap(), &mut layout);
        stack.begin_macro("open");
        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.is_recording_macro());
    }
}
