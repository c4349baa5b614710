//! Per-path change statistics.
//!
//! Every applied op leaves a provisional timestamp on the path it changed.
//! Committing a gesture promotes them to committed timestamps; undo pops
//! one per path it reverts.

use chrono::{DateTime, Utc};
use flowstate_json_patch::Op;
use flowstate_json_pointer::Path;
use indexmap::{IndexMap, IndexSet};

type Timestamps = Vec<DateTime<Utc>>;

fn affected_paths(patch: &[Op]) -> IndexSet<Path> {
    patch.iter().map(Op::changed_path).collect()
}

/// One row of the frequency view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFrequency {
    pub path: Path,
    pub committed: usize,
    pub provisional: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PathStats {
    committed: IndexMap<Path, Timestamps>,
    provisional: IndexMap<Path, Timestamps>,
    frequencies: Vec<PathFrequency>,
}

impl PathStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ops of an incremental patch applied within the open gesture.
    pub fn record_provisional(&mut self, patch: &[Op], now: DateTime<Utc>) {
        if patch.is_empty() {
            return;
        }
        for op in patch {
            self.provisional.entry(op.changed_path()).or_default().push(now);
        }
        self.update_frequencies();
    }

    /// Move every provisional timestamp into the committed bucket, keeping
    /// the time each op was applied.
    pub fn commit(&mut self) {
        if self.provisional.is_empty() {
            return;
        }
        for (path, ts) in self.provisional.drain(..) {
            self.committed.entry(path).or_default().extend(ts);
        }
        self.update_frequencies();
    }

    /// Drop provisional stats of a gesture that was discarded.
    pub fn discard_provisional(&mut self) {
        if self.provisional.is_empty() {
            return;
        }
        self.provisional.clear();
        self.update_frequencies();
    }

    /// Pop the newest committed timestamp of each path an undone diff's
    /// forward patch touched.
    pub fn on_undo(&mut self, forward: &[Op]) {
        for path in affected_paths(forward) {
            if let Some(ts) = self.committed.get_mut(&path) {
                ts.pop();
                if ts.is_empty() {
                    self.committed.shift_remove(&path);
                }
            }
        }
        self.update_frequencies();
    }

    /// Re-record a redone diff at its commit time, one timestamp per
    /// affected path.
    pub fn on_redo(&mut self, forward: &[Op], timestamp: DateTime<Utc>) {
        for path in affected_paths(forward) {
            self.committed.entry(path).or_default().push(timestamp);
        }
        self.update_frequencies();
    }

    pub fn committed_count(&self, path: &Path) -> usize {
        self.committed.get(path).map_or(0, Vec::len)
    }

    pub fn provisional_count(&self, path: &Path) -> usize {
        self.provisional.get(path).map_or(0, Vec::len)
    }

    pub fn committed_timestamps(&self, path: &Path) -> &[DateTime<Utc>] {
        self.committed.get(path).map_or(&[], Vec::as_slice)
    }

    /// The derived frequency view, kept current after every mutation.
    pub fn frequencies(&self) -> &[PathFrequency] {
        &self.frequencies
    }

    /// Recompute the frequency view: committed paths first in first-change
    /// order, then paths only touched provisionally.
    pub fn update_frequencies(&mut self) -> &[PathFrequency] {
        let mut rows: Vec<PathFrequency> = self
            .committed
            .iter()
            .map(|(path, ts)| PathFrequency {
                path: path.clone(),
                committed: ts.len(),
                provisional: self.provisional_count(path),
            })
            .collect();
        rows.extend(
            self.provisional
                .iter()
                .filter(|(path, _)| !self.committed.contains_key(*path))
                .map(|(path, ts)| PathFrequency { path: path.clone(), committed: 0, provisional: ts.len() }),
        );
        self.frequencies = rows;
        &self.frequencies
    }
}
