//! Bounded linear undo/redo log of full page-sequence snapshots.
//!
//! Entries are serialized copies of the whole page sequence. The cursor
//! always points at the entry equal to the live state right after the most
//! recent commit, undo, or redo. Committing after an undo discards the redo
//! branch. Once the log grows past its capacity the oldest entry is dropped.

use std::collections::VecDeque;

use slidecast_project_model::{deserialize_pages, serialize_pages, Page, ProjectError};

/// An immutable serialized copy of the page sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    /// Capture a snapshot of the given pages.
    pub fn capture(pages: &[Page]) -> Result<Self, ProjectError> {
        serialize_pages(pages).map(Self)
    }

    /// Rebuild the page sequence this snapshot holds.
    pub fn restore(&self) -> Result<Vec<Page>, ProjectError> {
        deserialize_pages(&self.0)
    }

    /// The serialized form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Linear snapshot history with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: &[Page], capacity: usize) -> Result<Self, ProjectError> {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity.min(64) + 1);
        entries.push_back(Snapshot::capture(initial)?);
        Ok(Self {
            entries,
            index: 0,
            capacity,
        })
    }

    /// Record the live state after a mutation.
    pub fn commit(&mut self, pages: &[Page]) -> Result<(), ProjectError> {
        let snapshot = Snapshot::capture(pages)?;

        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.index -= 1;
        }

        tracing::debug!(
            index = self.index,
            len = self.entries.len(),
            "History commit"
        );
        Ok(())
    }

    /// Step back one entry and return its pages. `None` at the oldest entry.
    pub fn undo(&mut self) -> Result<Option<Vec<Page>>, ProjectError> {
        if !self.can_undo() {
            return Ok(None);
        }
        let pages = self.entries[self.index - 1].restore()?;
        self.index -= 1;
        tracing::debug!(index = self.index, "Undo");
        Ok(Some(pages))
    }

    /// Step forward one entry and return its pages. `None` at the newest entry.
    pub fn redo(&mut self) -> Result<Option<Vec<Page>>, ProjectError> {
        if !self.can_redo() {
            return Ok(None);
        }
        let pages = self.entries[self.index + 1].restore()?;
        self.index += 1;
        tracing::debug!(index = self.index, "Redo");
        Ok(Some(pages))
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The entry under the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    /// Drop every entry and start over from `pages`.
    pub fn reset(&mut self, pages: &[Page]) -> Result<(), ProjectError> {
        *self = Self::new(pages, self.capacity)?;
        Ok(())
    }
}
