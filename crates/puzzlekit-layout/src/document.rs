//! A layout together with its undo history.

use puzzlekit_settings::LayoutDefaults;

use crate::commands::LayoutCommand;
use crate::history::UndoStack;
use crate::layout::Layout;

#[derive(Debug, Default)]
pub struct LayoutDocument {
    pub layout: Layout,
    pub history: UndoStack,
}

impl LayoutDocument {
    pub fn new(defaults: &LayoutDefaults) -> Self {
        Self {
            layout: Layout::new(defaults),
            history: UndoStack::new(),
        }
    }

    /// Apply a command and record it in the history.
    pub fn execute(&mut self, command: LayoutCommand) {
        self.history.push(command, &mut self.layout);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.layout)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.layout)
    }

    /// Reset before loading another file. History goes first so no command
    /// outlives the pieces it refers to.
    pub fn clear(&mut self) {
        self.history.clear();
        self.layout.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_layout_and_history() {
        let mut doc = LayoutDocument::default();
        let sheet = doc.layout.create_sheet("Sheet 1");
        let other = crate::sheet::Sheet::new("Sheet 2", doc.layout.settings());
        let add = LayoutCommand::add_sheet(&doc.layout, other).unwrap();
        doc.execute(add);
        let remove = LayoutCommand::remove_sheet(&doc.layout, sheet).unwrap();
        doc.execute(remove);
        assert_eq!(doc.layout.sheets().len(), 1);

        doc.clear();
        assert!(doc.layout.all_sheets().is_empty());
        assert!(!doc.history.can_undo());
        assert!(!doc.undo());
    }
}
