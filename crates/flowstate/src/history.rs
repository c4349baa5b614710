//! Linear undo/redo history of committed gesture diffs.

use chrono::{DateTime, Utc};
use flowstate_json_patch::{apply_patch, Patch, PatchError};
use serde_json::Value;

use crate::gesture::Gesture;

/// The bidirectional change committed by one gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub forward: Patch,
    pub reverse: Patch,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub diff: Diff,
    pub gesture: Gesture,
}

/// Direction of one history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Undo,
    Redo,
}

/// Committed records and a cursor into them.
///
/// `current_index` is the last applied record, `-1` when none is applied,
/// and always within `[-1, len - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    records: Vec<HistoryRecord>,
    current_index: i64,
}

impl History {
    pub fn new() -> Self {
        Self { records: Vec::new(), current_index: -1 }
    }

    /// Rebuild from persisted records. The index is clamped into range.
    pub fn from_records(records: Vec<HistoryRecord>, current_index: i64) -> Self {
        let last = records.len() as i64 - 1;
        Self { records, current_index: current_index.clamp(-1, last) }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn current_index(&self) -> i64 {
        self.current_index
    }

    /// The records up to and including the cursor.
    pub fn applied(&self) -> &[HistoryRecord] {
        &self.records[..(self.current_index + 1) as usize]
    }

    pub fn can_undo(&self) -> bool {
        self.current_index >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index < self.records.len() as i64 - 1
    }

    /// Whether `target` is a valid jump destination.
    pub fn can_jump_to(&self, target: i64) -> bool {
        (-1..self.records.len() as i64).contains(&target) && target != self.current_index
    }

    /// Drop every record past the cursor, push `record` and point at it.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.truncate((self.current_index + 1) as usize);
        self.records.push(record);
        self.current_index = self.records.len() as i64 - 1;
    }

    /// Apply the current record's reverse patch to `doc` and step back.
    ///
    /// Returns the undone diff, or `None` when there is nothing to undo.
    /// `doc` is untouched if the patch fails to apply.
    pub fn undo(&mut self, doc: &mut Value) -> Result<Option<&Diff>, PatchError> {
        if !self.can_undo() {
            return Ok(None);
        }
        let idx = self.current_index as usize;
        *doc = apply_patch(doc, &self.records[idx].diff.reverse)?;
        self.current_index -= 1;
        Ok(Some(&self.records[idx].diff))
    }

    /// Apply the next record's forward patch to `doc` and step forward.
    pub fn redo(&mut self, doc: &mut Value) -> Result<Option<&Diff>, PatchError> {
        if !self.can_redo() {
            return Ok(None);
        }
        let idx = (self.current_index + 1) as usize;
        *doc = apply_patch(doc, &self.records[idx].diff.forward)?;
        self.current_index += 1;
        Ok(Some(&self.records[idx].diff))
    }

    /// Walk one diff at a time until the cursor reaches `target`, calling
    /// `on_step` after each step.
    ///
    /// Returns the number of steps taken; zero when `target` is out of range
    /// or already current.
    pub fn jump_to_index<F>(&mut self, target: i64, doc: &mut Value, mut on_step: F) -> Result<usize, PatchError>
    where
        F: FnMut(Step, &Diff),
    {
        if !self.can_jump_to(target) {
            return Ok(0);
        }
        let mut steps = 0;
        while self.current_index != target {
            if target < self.current_index {
                if let Some(diff) = self.undo(doc)? {
                    on_step(Step::Undo, diff);
                }
            } else if let Some(diff) = self.redo(doc)? {
                on_step(Step::Redo, diff);
            }
            steps += 1;
        }
        Ok(steps)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
