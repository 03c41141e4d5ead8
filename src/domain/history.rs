//! Linear undo/redo history of full state snapshots

use tracing::debug;

use super::state::EditorState;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Bounded snapshot history with a cursor on the active entry.
///
/// Entries after the cursor are the redo branch; recording a new snapshot
/// drops them. Identical consecutive snapshots are recorded once.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<EditorState>,
    cursor: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Empty history; `max_size` is clamped to at least 1.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_size: max_size.max(1),
        }
    }

    /// Drop all entries and start over from `initial`.
    pub fn reset(&mut self, initial: EditorState) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    /// Record `snapshot` after the cursor. Returns false if it equals the active entry.
    pub fn record(&mut self, snapshot: EditorState) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }
        if !self.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        debug!(len = self.entries.len(), cursor = self.cursor, "history recorded");
        true
    }

    pub fn current(&self) -> Option<&EditorState> {
        self.entries.get(self.cursor)
    }

    /// Step back one entry.
    pub fn undo(&mut self) -> Option<&EditorState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry.
    pub fn redo(&mut self) -> Option<&EditorState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
