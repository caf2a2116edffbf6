//! Undo/Redo command stack.
//!
//! Edits are pure, so every command is a document snapshot pair: undo
//! restores `before`, redo restores `after`. No inverse edits are computed.
//!
//! Rapid gestures (color-picker drags, spinner holds) use **batching**: the
//! document is captured when the outermost batch opens, and one command
//! covering the whole gesture is pushed when it closes.

use lte_core::{Document, Edit, EditError};

/// One undoable step.
#[derive(Debug, Clone)]
pub struct Command {
    pub before: Document,
    pub after: Document,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Document captured at the start of a batch.
    batch_snapshot: Option<Document>,
    /// Description of the last edit applied inside the batch.
    batch_label: Option<String>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(128)),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_label: None,
        }
    }

    /// Open a batch. Edits until the matching `end_batch` collapse into one
    /// undo step.
    pub fn begin_batch(&mut self, current: &Document) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(current.clone());
            self.batch_label = None;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes and the document
    /// differs from the snapshot, one command is pushed.
    pub fn end_batch(&mut self, current: &Document) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let label = self.batch_label.take();
        if let Some(before) = self.batch_snapshot.take()
            && before != *current
        {
            self.push(Command {
                before,
                after: current.clone(),
                description: label.unwrap_or_else(|| "edit".to_string()),
            });
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply `edit` to `current` and record it. Returns the edited document.
    ///
    /// An edit that leaves the document unchanged is not recorded.
    pub fn execute(&mut self, current: &Document, edit: &Edit) -> Result<Document, EditError> {
        let next = edit.apply(current)?;
        let description = edit.description();
        log::trace!("execute: {description}");

        if self.batch_depth > 0 {
            // The snapshot taken at begin_batch() covers the cumulative effect.
            self.batch_label = Some(description);
            return Ok(next);
        }
        if next != *current {
            self.push(Command {
                before: current.clone(),
                after: next.clone(),
                description,
            });
        }
        Ok(next)
    }

    fn push(&mut self, command: Command) {
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns the document to restore and its label.
    ///
    /// Refused while a batch is open: the batch baseline would go stale.
    pub fn undo(&mut self) -> Option<(Document, String)> {
        if self.in_batch() {
            log::debug!("undo ignored: batch open");
            return None;
        }
        let cmd = self.undo_stack.pop()?;
        let restored = (cmd.before.clone(), cmd.description.clone());
        self.redo_stack.push(cmd);
        Some(restored)
    }

    /// Redo the last undone command.
    pub fn redo(&mut self) -> Option<(Document, String)> {
        if self.in_batch() {
            log::debug!("redo ignored: batch open");
            return None;
        }
        let cmd = self.redo_stack.pop()?;
        let restored = (cmd.after.clone(), cmd.description.clone());
        self.undo_stack.push(cmd);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all history, including an open batch.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_label = None;
    }
}
