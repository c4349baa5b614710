//! Gesture accumulation: batching applied actions into one undoable unit.

use chrono::{DateTime, TimeDelta, Utc};
use flowstate_json_patch::diff;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::action::Action;
use crate::history::{Diff, HistoryRecord};
use crate::merge::compress;

/// A finalized, compressed run of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub actions: Vec<Action>,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Open,
}

/// A gesture taken out of the accumulator for finalizing.
#[derive(Debug, Clone)]
pub struct OpenGesture {
    pub actions: Vec<Action>,
    pub start: Value,
    pub opened_at: DateTime<Utc>,
}

impl OpenGesture {
    /// Turn the gesture into a history record against the document `end`.
    ///
    /// Returns `None` when the net change is empty.
    ///
    /// # Panics
    ///
    /// When the net change is non-empty but the actions compress to nothing.
    /// The merge rules guarantee this cannot happen, so the state is corrupt.
    pub fn finalize(self, end: &Value, now: DateTime<Utc>) -> Option<HistoryRecord> {
        let forward = diff(&self.start, end);
        if forward.is_empty() {
            debug!(actions = self.actions.len(), "gesture has no net change, discarded");
            return None;
        }
        let raw = self.actions.len();
        let actions = compress(self.actions);
        if actions.is_empty() {
            error!(raw, ops = forward.len(), "non-empty gesture compressed to no actions");
            panic!("merge contract violated: {raw} actions with a non-empty net patch compressed to nothing");
        }
        let reverse = diff(end, &self.start);
        Some(HistoryRecord {
            diff: Diff { forward, reverse, timestamp: now },
            gesture: Gesture { actions, committed_at: now },
        })
    }
}

// ── Accumulator ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GestureAccumulator {
    open: Option<OpenGesture>,
    debounce: TimeDelta,
}

impl GestureAccumulator {
    pub fn new(debounce: TimeDelta) -> Self {
        Self { open: None, debounce }
    }

    pub fn state(&self) -> GestureState {
        if self.open.is_some() {
            GestureState::Open
        } else {
            GestureState::Idle
        }
    }

    pub fn debounce(&self) -> TimeDelta {
        self.debounce
    }

    /// Record an applied action. `before` is the document prior to the
    /// action and becomes the gesture-start snapshot when this opens one.
    pub fn push(&mut self, action: Action, before: &Value, now: DateTime<Utc>) {
        self.open
            .get_or_insert_with(|| OpenGesture { actions: Vec::new(), start: before.clone(), opened_at: now })
            .actions
            .push(action);
    }

    pub fn actions(&self) -> &[Action] {
        self.open.as_ref().map_or(&[], |g| g.actions.as_slice())
    }

    /// True when an open gesture's start snapshot differs from `current`.
    pub fn has_uncommitted_changes(&self, current: &Value) -> bool {
        self.open.as_ref().is_some_and(|g| &g.start != current)
    }

    /// Time left before the debounce window closes, measured from the first
    /// action of the open gesture. `None` when idle.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        let opened_at = self.open.as_ref()?.opened_at;
        let remaining = self.debounce - (now - opened_at);
        Some(remaining.max(TimeDelta::zero()))
    }

    /// The debounce window has elapsed and no interaction holds it open.
    pub fn is_due(&self, now: DateTime<Utc>, interacting: bool) -> bool {
        !interacting && self.time_remaining(now).is_some_and(|r| r <= TimeDelta::zero())
    }

    pub fn take(&mut self) -> Option<OpenGesture> {
        self.open.take()
    }

    pub fn clear(&mut self) {
        self.open = None;
    }
}
