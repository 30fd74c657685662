//! Change log with undo and redo.
//!
//! Every mutation through the model's write path is recorded here before it
//! is applied. One user action (a single `set`, or a bulk operation such as
//! `copy_from`) is one step; undo and redo move whole steps.

use std::collections::VecDeque;

use rcforge_registry::Value;

use crate::path::AttrPath;

/// Default number of steps kept for undo.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// One attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Attribute that changed.
    pub path: AttrPath,
    /// Value before the change.
    pub old: Value,
    /// Value after the change.
    pub new: Value,
}

impl Change {
    /// The change that reverts this one.
    pub fn inverse(&self) -> Change {
        Change {
            path: self.path.clone(),
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

/// Undo and redo stacks of change steps.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    undo_stack: VecDeque<Vec<Change>>,
    redo_stack: VecDeque<Vec<Change>>,
    max_depth: usize,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ChangeLog {
    /// Create a log keeping at most `max_depth` undo steps.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record a step. Empty steps are ignored. Clears the redo tail.
    pub fn push(&mut self, step: Vec<Change>) {
        if step.is_empty() {
            return;
        }
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(step);
        self.redo_stack.clear();
    }

    /// Take the most recent step for undoing; it moves to the redo stack.
    ///
    /// Returns the changes to apply, already inverted and in reverse order.
    pub fn undo(&mut self) -> Option<Vec<Change>> {
        let step = self.undo_stack.pop_back()?;
        let inverse = step.iter().rev().map(Change::inverse).collect();
        self.redo_stack.push_back(step);
        Some(inverse)
    }

    /// Take the most recently undone step for reapplying.
    pub fn redo(&mut self) -> Option<Vec<Change>> {
        let step = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(step.clone());
        Some(step)
    }

    /// Whether there is a step to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is a step to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// All recorded changes, oldest first, excluding undone steps.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.undo_stack.iter().flatten()
    }

    /// Forget everything; used once changes are written out.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
