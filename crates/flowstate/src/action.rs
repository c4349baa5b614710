//! The action vocabulary.
//!
//! An [`Action`] is an immutable intent to change the document or to drive
//! the store (undo, redo, project IO). Every action has a fieldless
//! [`ActionKind`] carrying the static metadata: display name, keyboard
//! shortcut and the flags the store consults when routing it.

use std::collections::HashMap;
use std::path::PathBuf;

use flowstate_json_patch::Patch;
use flowstate_json_pointer::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An intent to change application state.
///
/// Serialized with a `"type"` tag for the action-log project format:
///
/// ```
/// use flowstate::Action;
/// use serde_json::json;
///
/// let action = Action::SetValue { path: "/audio/volume".parse().unwrap(), value: json!(0.5) };
/// let encoded = serde_json::to_value(&action).unwrap();
/// assert_eq!(encoded, json!({"type": "set_value", "path": "/audio/volume", "value": 0.5}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Undo,
    Redo,
    SetHistoryIndex { index: i64 },
    OpenProject { path: PathBuf },
    OpenEmptyProject,
    OpenDefaultProject,
    SaveProject { path: PathBuf },
    SaveCurrentProject,
    SaveDefaultProject,
    SetValue { path: Path, value: Value },
    SetValues { values: Vec<(Path, Value)> },
    ToggleValue { path: Path },
    ApplyPatch {
        #[serde(with = "patch_json")]
        patch: Patch,
    },
    OpenFileDialog { config: Value },
    CloseFileDialog,
    SetColorPreset { preset: u32 },
    ToggleMetricsWindow,
    ToggleDebugOverlay,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Undo => ActionKind::Undo,
            Action::Redo => ActionKind::Redo,
            Action::SetHistoryIndex { .. } => ActionKind::SetHistoryIndex,
            Action::OpenProject { .. } => ActionKind::OpenProject,
            Action::OpenEmptyProject => ActionKind::OpenEmptyProject,
            Action::OpenDefaultProject => ActionKind::OpenDefaultProject,
            Action::SaveProject { .. } => ActionKind::SaveProject,
            Action::SaveCurrentProject => ActionKind::SaveCurrentProject,
            Action::SaveDefaultProject => ActionKind::SaveDefaultProject,
            Action::SetValue { .. } => ActionKind::SetValue,
            Action::SetValues { .. } => ActionKind::SetValues,
            Action::ToggleValue { .. } => ActionKind::ToggleValue,
            Action::ApplyPatch { .. } => ActionKind::ApplyPatch,
            Action::OpenFileDialog { .. } => ActionKind::OpenFileDialog,
            Action::CloseFileDialog => ActionKind::CloseFileDialog,
            Action::SetColorPreset { .. } => ActionKind::SetColorPreset,
            Action::ToggleMetricsWindow => ActionKind::ToggleMetricsWindow,
            Action::ToggleDebugOverlay => ActionKind::ToggleDebugOverlay,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

// ── ActionKind ────────────────────────────────────────────────────────────

/// Fieldless mirror of [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Undo,
    Redo,
    SetHistoryIndex,
    OpenProject,
    OpenEmptyProject,
    OpenDefaultProject,
    SaveProject,
    SaveCurrentProject,
    SaveDefaultProject,
    SetValue,
    SetValues,
    ToggleValue,
    ApplyPatch,
    OpenFileDialog,
    CloseFileDialog,
    SetColorPreset,
    ToggleMetricsWindow,
    ToggleDebugOverlay,
}

impl ActionKind {
    pub const ALL: [ActionKind; 18] = [
        ActionKind::Undo,
        ActionKind::Redo,
        ActionKind::SetHistoryIndex,
        ActionKind::OpenProject,
        ActionKind::OpenEmptyProject,
        ActionKind::OpenDefaultProject,
        ActionKind::SaveProject,
        ActionKind::SaveCurrentProject,
        ActionKind::SaveDefaultProject,
        ActionKind::SetValue,
        ActionKind::SetValues,
        ActionKind::ToggleValue,
        ActionKind::ApplyPatch,
        ActionKind::OpenFileDialog,
        ActionKind::CloseFileDialog,
        ActionKind::SetColorPreset,
        ActionKind::ToggleMetricsWindow,
        ActionKind::ToggleDebugOverlay,
    ];

    /// Human-readable name, as shown in menus.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Undo => "Undo",
            ActionKind::Redo => "Redo",
            ActionKind::SetHistoryIndex => "Set history index",
            ActionKind::OpenProject => "Open project",
            ActionKind::OpenEmptyProject => "Open empty project",
            ActionKind::OpenDefaultProject => "Open default project",
            ActionKind::SaveProject => "Save project",
            ActionKind::SaveCurrentProject => "Save current project",
            ActionKind::SaveDefaultProject => "Save default project",
            ActionKind::SetValue => "Set value",
            ActionKind::SetValues => "Set values",
            ActionKind::ToggleValue => "Toggle value",
            ActionKind::ApplyPatch => "Apply patch",
            ActionKind::OpenFileDialog => "Open file dialog",
            ActionKind::CloseFileDialog => "Close file dialog",
            ActionKind::SetColorPreset => "Set color preset",
            ActionKind::ToggleMetricsWindow => "Toggle metrics window",
            ActionKind::ToggleDebugOverlay => "Toggle debug overlay",
        }
    }

    /// Default keyboard shortcut, if the action has one.
    pub fn shortcut(self) -> Option<&'static str> {
        match self {
            ActionKind::Undo => Some("cmd+z"),
            ActionKind::Redo => Some("shift+cmd+z"),
            ActionKind::OpenEmptyProject => Some("cmd+n"),
            ActionKind::OpenDefaultProject => Some("shift+cmd+o"),
            ActionKind::SaveCurrentProject => Some("cmd+s"),
            ActionKind::SaveDefaultProject => Some("shift+cmd+s"),
            ActionKind::ToggleMetricsWindow => Some("cmd+m"),
            ActionKind::ToggleDebugOverlay => Some("cmd+d"),
            _ => None,
        }
    }

    /// False for actions the store handles itself instead of the reducer.
    pub fn is_reducible(self) -> bool {
        !matches!(
            self,
            ActionKind::Undo
                | ActionKind::Redo
                | ActionKind::SetHistoryIndex
                | ActionKind::OpenProject
                | ActionKind::OpenEmptyProject
                | ActionKind::OpenDefaultProject
                | ActionKind::SaveProject
                | ActionKind::SaveCurrentProject
                | ActionKind::SaveDefaultProject
        )
    }

    /// Actions that close their gesture as soon as they are applied.
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            ActionKind::ToggleValue | ActionKind::ToggleMetricsWindow | ActionKind::ToggleDebugOverlay
        )
    }
}

// ── Registry ──────────────────────────────────────────────────────────────

/// Lookup from shortcut and display name to [`ActionKind`].
///
/// # Example
///
/// ```
/// use flowstate::{ActionKind, ActionRegistry};
///
/// let registry = ActionRegistry::new();
/// assert_eq!(registry.by_shortcut("cmd+z"), Some(ActionKind::Undo));
/// assert_eq!(registry.by_name("Set value"), Some(ActionKind::SetValue));
/// ```
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    by_shortcut: HashMap<&'static str, ActionKind>,
    by_name: HashMap<&'static str, ActionKind>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        let mut by_shortcut = HashMap::new();
        let mut by_name = HashMap::new();
        for kind in ActionKind::ALL {
            by_name.insert(kind.name(), kind);
            if let Some(shortcut) = kind.shortcut() {
                by_shortcut.insert(shortcut, kind);
            }
        }
        Self { by_shortcut, by_name }
    }

    pub fn by_shortcut(&self, shortcut: &str) -> Option<ActionKind> {
        self.by_shortcut.get(shortcut).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<ActionKind> {
        self.by_name.get(name).copied()
    }

    /// All registered shortcuts with their kinds, in [`ActionKind::ALL`] order.
    pub fn shortcuts(&self) -> Vec<(&'static str, ActionKind)> {
        ActionKind::ALL
            .iter()
            .filter_map(|&kind| kind.shortcut().map(|s| (s, kind)))
            .collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Patch serde ───────────────────────────────────────────────────────────

mod patch_json {
    use flowstate_json_patch::{from_json_patch, to_json_patch, Patch};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(patch: &Patch, serializer: S) -> Result<S::Ok, S::Error> {
        to_json_patch(patch).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Patch, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_json_patch(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_json_patch::Op;
    use serde_json::json;

    #[test]
    fn every_kind_has_unique_name() {
        let registry = ActionRegistry::new();
        for kind in ActionKind::ALL {
            assert_eq!(registry.by_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn shortcuts_are_unique() {
        let registry = ActionRegistry::new();
        let shortcuts = registry.shortcuts();
        assert_eq!(shortcuts.len(), ActionKind::ALL.iter().filter(|k| k.shortcut().is_some()).count());
        for (shortcut, kind) in shortcuts {
            assert_eq!(registry.by_shortcut(shortcut), Some(kind));
        }
        assert_eq!(registry.by_shortcut("cmd+q"), None);
    }

    #[test]
    fn bypass_kinds_are_not_reducible() {
        let bypass: Vec<_> = ActionKind::ALL.iter().filter(|k| !k.is_reducible()).collect();
        assert_eq!(bypass.len(), 9);
        assert!(ActionKind::SetValue.is_reducible());
        assert!(!ActionKind::SaveDefaultProject.is_reducible());
    }

    #[test]
    fn toggles_are_immediate() {
        assert!(ActionKind::ToggleValue.is_immediate());
        assert!(ActionKind::ToggleDebugOverlay.is_immediate());
        assert!(!ActionKind::SetValue.is_immediate());
    }

    #[test]
    fn serde_tagged_form() {
        let action = Action::SetValues {
            values: vec![("/a".parse().unwrap(), json!(1)), ("/b".parse().unwrap(), json!(true))],
        };
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(encoded, json!({"type": "set_values", "values": [["/a", 1], ["/b", true]]}));
        let decoded: Action = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, action);

        let undo: Action = serde_json::from_value(json!({"type": "undo"})).unwrap();
        assert_eq!(undo, Action::Undo);
    }

    #[test]
    fn apply_patch_serializes_as_rfc6902() {
        let action = Action::ApplyPatch {
            patch: vec![Op::Remove { path: "/windows/metrics".parse().unwrap() }],
        };
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(
            encoded,
            json!({"type": "apply_patch", "patch": [{"op": "remove", "path": "/windows/metrics"}]})
        );
        let decoded: Action = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, action);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_value::<Action>(json!({"type": "explode"})).is_err());
    }
}
