//! The owning state instance and its tick loop.

use std::path::{Path as FsPath, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use flowstate_json_patch::{diff, Op};
use flowstate_json_pointer::Path;
use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::StoreConfig;
use crate::document::{self, empty_document};
use crate::error::{ConfigError, ProjectError, StoreError};
use crate::gesture::{Gesture, GestureAccumulator, GestureState};
use crate::history::{History, HistoryRecord, Step};
use crate::listener::ChangeListener;
use crate::project::{self, ProjectFormat};
use crate::queue::{ActionQueue, ActionSender};
use crate::reducer;
use crate::stats::{PathFrequency, PathStats};

/// Outcome of one [`Store::drain_and_apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Actions that passed their allowed-check and ran.
    pub applied: usize,
    /// Actions refused by their allowed-check.
    pub rejected: usize,
    /// Allowed actions whose project IO or history step failed.
    pub failed: usize,
    /// At least one gesture was committed to history.
    pub committed: bool,
    /// Paths changed during the tick, in first-change order.
    pub changed_paths: Vec<Path>,
}

/// Owns the document, its history and the action queue.
///
/// # Example
///
/// ```
/// use flowstate::{Action, Store, StoreConfig};
/// use serde_json::json;
///
/// let mut store = Store::with_config(StoreConfig::default().with_gesture_debounce_ms(0)).unwrap();
/// store.enqueue(Action::SetValue { path: "/audio/volume".parse().unwrap(), value: json!(0.5) });
/// let report = store.drain_and_apply();
/// assert!(report.committed);
/// assert_eq!(store.document()["audio"]["volume"], json!(0.5));
/// assert_eq!(store.history().current_index(), 0);
/// ```
pub struct Store {
    document: Value,
    history_base: Value,
    gesture: GestureAccumulator,
    history: History,
    stats: PathStats,
    queue: ActionQueue,
    config: StoreConfig,
    interacting: bool,
    current_project_path: Option<PathBuf>,
    project_has_changes: bool,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Store {
    pub fn new() -> Self {
        Self::from_parts(StoreConfig::default(), TimeDelta::milliseconds(crate::config::DEFAULT_GESTURE_DEBOUNCE_MS as i64))
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the configuration does not validate.
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let debounce = config.gesture_debounce()?;
        Ok(Self::from_parts(config, debounce))
    }

    /// Build a store from a TOML configuration file.
    pub fn from_config_file(path: impl AsRef<FsPath>) -> Result<Self, StoreError> {
        let config = StoreConfig::from_toml_file(path)?;
        Ok(Self::with_config(config)?)
    }

    fn from_parts(config: StoreConfig, debounce: TimeDelta) -> Self {
        let document = empty_document();
        Self {
            history_base: document.clone(),
            document,
            gesture: GestureAccumulator::new(debounce),
            history: History::new(),
            stats: PathStats::new(),
            queue: ActionQueue::new(),
            config,
            interacting: false,
            current_project_path: None,
            project_has_changes: false,
            listeners: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        flowstate_json_pointer::get(&self.document, path)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn stats(&self) -> &PathStats {
        &self.stats
    }

    pub fn update_frequencies(&self) -> &[PathFrequency] {
        self.stats.frequencies()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    /// Actions of the open gesture, uncompressed.
    pub fn gesture_actions(&self) -> &[Action] {
        self.gesture.actions()
    }

    pub fn current_project_path(&self) -> Option<&FsPath> {
        self.current_project_path.as_deref()
    }

    pub fn project_has_changes(&self) -> bool {
        self.project_has_changes
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// While set, the debounce window never closes the open gesture.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    pub fn gesture_time_remaining(&self) -> Option<TimeDelta> {
        self.gesture_time_remaining_at(Utc::now())
    }

    pub fn gesture_time_remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.gesture.time_remaining(now)
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    // ── Queue ─────────────────────────────────────────────────────────────

    pub fn enqueue(&self, action: Action) {
        self.queue.push(action);
    }

    /// A producer handle usable from other threads.
    pub fn sender(&self) -> ActionSender {
        self.queue.sender()
    }

    pub fn drain_and_apply(&mut self) -> TickReport {
        self.drain_and_apply_at(Utc::now())
    }

    /// Run one tick: apply every queued action, then close the open gesture
    /// if its debounce window has elapsed.
    pub fn drain_and_apply_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut tick = Tick::default();
        for action in self.queue.drain() {
            self.process(action, now, &mut tick);
        }
        if self.gesture.is_due(now, self.interacting) && self.finalize_gesture_at(now) {
            tick.committed = true;
        }
        let report = tick.into_report();
        if !report.changed_paths.is_empty() {
            for listener in &mut self.listeners {
                listener.on_change(&report.changed_paths, &self.document);
            }
        }
        report
    }

    // ── Action routing ────────────────────────────────────────────────────

    /// Whether `action` may run against the current state.
    pub fn is_allowed(&self, action: &Action) -> bool {
        match action {
            Action::Undo => self.history.can_undo() || self.gesture.has_uncommitted_changes(&self.document),
            Action::Redo => self.history.can_redo(),
            Action::SetHistoryIndex { index } => {
                self.history.can_jump_to(*index) || self.gesture.has_uncommitted_changes(&self.document)
            }
            Action::OpenProject { path } => path.exists(),
            Action::OpenDefaultProject => self.config.default_project_path.exists(),
            Action::SaveCurrentProject => self.current_project_path.is_some() && self.project_has_changes,
            Action::OpenFileDialog { .. } => !document::is_file_dialog_visible(&self.document),
            Action::CloseFileDialog => document::is_file_dialog_visible(&self.document),
            _ => true,
        }
    }

    fn process(&mut self, action: Action, now: DateTime<Utc>, tick: &mut Tick) {
        if !self.is_allowed(&action) {
            debug!(action = action.name(), "action rejected");
            tick.rejected += 1;
            return;
        }
        let kind = action.kind();
        if kind.is_reducible() {
            self.apply_reducible(action, now, tick);
            return;
        }

        if self.finalize_gesture_at(now) {
            tick.committed = true;
        }
        // Committing moves the cursor, which changes redo and jump targets
        if !self.is_allowed(&action) {
            debug!(action = action.name(), "action rejected after finalizing gesture");
            tick.rejected += 1;
            return;
        }
        match self.apply_bypass(&action, tick) {
            Ok(()) => tick.applied += 1,
            Err(err) => {
                warn!(action = action.name(), %err, "action failed");
                tick.failed += 1;
            }
        }
    }

    fn apply_reducible(&mut self, action: Action, now: DateTime<Utc>, tick: &mut Tick) {
        let kind = action.kind();
        let next = reducer::update(&self.document, &action);
        let patch = diff(&self.document, &next);
        if patch.is_empty() {
            debug!(action = action.name(), "action changed nothing");
        } else {
            self.project_has_changes = true;
        }
        self.stats.record_provisional(&patch, now);
        tick.record(&patch);
        self.gesture.push(action, &self.document, now);
        self.document = next;
        tick.applied += 1;

        if kind.is_immediate() && self.finalize_gesture_at(now) {
            tick.committed = true;
        }
    }

    fn apply_bypass(&mut self, action: &Action, tick: &mut Tick) -> Result<(), StoreError> {
        match action {
            Action::Undo => self.undo(tick),
            Action::Redo => self.redo(tick),
            Action::SetHistoryIndex { index } => self.jump(*index, tick),
            Action::OpenProject { path } => self.open_project(path).map(|()| tick.touch_root()),
            Action::OpenEmptyProject => self.open_empty_project().map(|()| tick.touch_root()),
            Action::OpenDefaultProject => {
                let path = self.config.default_project_path.clone();
                self.open_project(&path).map(|()| tick.touch_root())
            }
            Action::SaveProject { path } => self.save_project(path),
            Action::SaveCurrentProject => match self.current_project_path.clone() {
                Some(path) => self.save_project(&path),
                None => Ok(()),
            },
            Action::SaveDefaultProject => {
                let path = self.config.default_project_path.clone();
                self.save_project(&path)
            }
            other => {
                debug_assert!(other.kind().is_reducible(), "unrouted store action {other:?}");
                Ok(())
            }
        }
    }

    // ── Gestures ──────────────────────────────────────────────────────────

    pub fn finalize_gesture(&mut self) -> bool {
        self.finalize_gesture_at(Utc::now())
    }

    /// Close the open gesture and commit its net change.
    ///
    /// Returns `true` when a history record was written.
    ///
    /// # Panics
    ///
    /// When a gesture with a net change compresses to no actions.
    pub fn finalize_gesture_at(&mut self, now: DateTime<Utc>) -> bool {
        let Some(open) = self.gesture.take() else {
            return false;
        };
        match open.finalize(&self.document, now) {
            Some(record) => {
                self.stats.commit();
                info!(
                    actions = record.gesture.actions.len(),
                    ops = record.diff.forward.len(),
                    index = self.history.current_index() + 1,
                    "gesture committed"
                );
                self.history.append(record);
                true
            }
            None => {
                self.stats.discard_provisional();
                false
            }
        }
    }

    // ── History navigation ────────────────────────────────────────────────

    fn undo(&mut self, tick: &mut Tick) -> Result<(), StoreError> {
        if let Some(diff) = self.history.undo(&mut self.document)? {
            self.stats.on_undo(&diff.forward);
            tick.record(&diff.reverse);
            self.project_has_changes = true;
        }
        Ok(())
    }

    fn redo(&mut self, tick: &mut Tick) -> Result<(), StoreError> {
        if let Some(diff) = self.history.redo(&mut self.document)? {
            self.stats.on_redo(&diff.forward, diff.timestamp);
            tick.record(&diff.forward);
            self.project_has_changes = true;
        }
        Ok(())
    }

    fn jump(&mut self, target: i64, tick: &mut Tick) -> Result<(), StoreError> {
        let stats = &mut self.stats;
        let steps = self.history.jump_to_index(target, &mut self.document, |step, diff| match step {
            Step::Undo => {
                stats.on_undo(&diff.forward);
                tick.record(&diff.reverse);
            }
            Step::Redo => {
                stats.on_redo(&diff.forward, diff.timestamp);
                tick.record(&diff.forward);
            }
        })?;
        if steps > 0 {
            self.project_has_changes = true;
        }
        Ok(())
    }

    // ── Projects ──────────────────────────────────────────────────────────

    /// Load a project file, replacing document, history and stats.
    ///
    /// All-or-nothing: on error the store is unchanged.
    pub fn open_project(&mut self, path: &FsPath) -> Result<(), StoreError> {
        let format = ProjectFormat::from_path(path)?;
        let loaded = match format {
            ProjectFormat::State => {
                let document = project::read_json(path)?;
                Loaded { base: document.clone(), document, history: History::new(), stats: PathStats::new() }
            }
            ProjectFormat::Diffs => {
                let file = project::history_from_json(&project::read_json(path)?)?;
                let mut stats = PathStats::new();
                for record in file.history.applied() {
                    stats.on_redo(&record.diff.forward, record.diff.timestamp);
                }
                Loaded { base: file.base, document: file.document, history: file.history, stats }
            }
            ProjectFormat::Actions => {
                let gestures = project::action_log_from_json(&project::read_json(path)?)?;
                let mut scratch = Self::from_parts(self.config.clone(), self.gesture.debounce());
                scratch.replay(gestures)?;
                Loaded {
                    base: scratch.history_base,
                    document: scratch.document,
                    history: scratch.history,
                    stats: scratch.stats,
                }
            }
        };
        self.install(loaded, Some(path.to_path_buf()));
        info!(path = %path.display(), records = self.history.len(), "project opened");
        Ok(())
    }

    /// Reset to the empty project: the configured empty-project state file
    /// if present, otherwise the built-in empty document.
    pub fn open_empty_project(&mut self) -> Result<(), StoreError> {
        let document = match self.config.empty_project_path.as_deref() {
            Some(path) if path.exists() => project::read_json(path)?,
            _ => empty_document(),
        };
        let loaded = Loaded { base: document.clone(), document, history: History::new(), stats: PathStats::new() };
        self.install(loaded, None);
        info!("empty project opened");
        Ok(())
    }

    /// Write the project in the format named by the file extension.
    ///
    /// The open gesture is committed first.
    pub fn save_project(&mut self, path: &FsPath) -> Result<(), StoreError> {
        let format = ProjectFormat::from_path(path)?;
        self.finalize_gesture();
        let value = match format {
            ProjectFormat::State => self.document.clone(),
            ProjectFormat::Diffs => project::history_to_json(&self.history, &self.history_base),
            ProjectFormat::Actions => project::action_log_to_json(&self.action_log()?)?,
        };
        project::write_json(path, &value)?;
        self.current_project_path = Some(path.to_path_buf());
        self.project_has_changes = false;
        info!(path = %path.display(), format = format.extension(), "project saved");
        Ok(())
    }

    /// The committed gestures, plus a trailing history jump when the cursor
    /// is not at the newest record.
    ///
    /// # Errors
    ///
    /// [`ProjectError::Format`] when the history does not start from the
    /// empty document, which an action log cannot express.
    pub fn action_log(&self) -> Result<Vec<Gesture>, ProjectError> {
        if self.history_base != empty_document() {
            return Err(ProjectError::Format(
                "history does not start from the empty document; save as .fss or .fsd".into(),
            ));
        }
        let mut gestures: Vec<Gesture> = self.history.records().iter().map(|r| r.gesture.clone()).collect();
        if self.history.can_redo() {
            let committed_at = self.history.records().last().map_or_else(Utc::now, |r| r.gesture.committed_at);
            gestures.push(Gesture {
                actions: vec![Action::SetHistoryIndex { index: self.history.current_index() }],
                committed_at,
            });
        }
        Ok(gestures)
    }

    /// Feed each gesture through the queue at its commit time and finalize
    /// it, rebuilding history as if it were produced live.
    fn replay(&mut self, gestures: Vec<Gesture>) -> Result<(), ProjectError> {
        for (i, gesture) in gestures.into_iter().enumerate() {
            let reducible = gesture.actions.iter().filter(|a| a.kind().is_reducible()).count();
            let before = self.history.len();
            for action in gesture.actions {
                self.enqueue(action);
            }
            let report = self.drain_and_apply_at(gesture.committed_at);
            if report.rejected > 0 || report.failed > 0 {
                return Err(ProjectError::Format(format!("gesture {i} did not replay cleanly")));
            }
            self.finalize_gesture_at(gesture.committed_at);
            if reducible > 0 && self.history.len() != before + 1 {
                return Err(ProjectError::Format(format!("gesture {i} did not produce one history record")));
            }
        }
        Ok(())
    }

    fn install(&mut self, loaded: Loaded, path: Option<PathBuf>) {
        self.document = loaded.document;
        self.history_base = loaded.base;
        self.history = loaded.history;
        self.stats = loaded.stats;
        self.gesture.clear();
        self.current_project_path = path;
        self.project_has_changes = false;
    }

    /// Every record the history holds.
    pub fn records(&self) -> &[HistoryRecord] {
        self.history.records()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("history_len", &self.history.len())
            .field("current_index", &self.history.current_index())
            .field("gesture", &self.gesture.state())
            .field("current_project_path", &self.current_project_path)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

struct Loaded {
    base: Value,
    document: Value,
    history: History,
    stats: PathStats,
}

/// Per-tick accumulator behind [`TickReport`].
#[derive(Default)]
struct Tick {
    applied: usize,
    rejected: usize,
    failed: usize,
    committed: bool,
    changed: IndexSet<Path>,
}

impl Tick {
    fn record(&mut self, patch: &[Op]) {
        self.changed.extend(patch.iter().map(Op::changed_path));
    }

    fn touch_root(&mut self) {
        self.changed.insert(Path::root());
    }

    fn into_report(self) -> TickReport {
        TickReport {
            applied: self.applied,
            rejected: self.rejected,
            failed: self.failed,
            committed: self.committed,
            changed_paths: self.changed.into_iter().collect(),
        }
    }
}
