//! Project files.
//!
//! Three formats, chosen by extension:
//!
//! | Extension | Content |
//! |---|---|
//! | `.fss` | the document |
//! | `.fsd` | `{"diffs": [{forward, reverse, timestamp}], "current_index": i}` |
//! | `.fsa` | `[{"actions": [...], "committed_at": ts}]` |
//!
//! Patches are written in their RFC 6902 JSON form. A diff file whose
//! history does not start from the empty document also carries a `"base"`
//! member holding the document the first diff applies to.

use std::fs;
use std::path::Path as FsPath;

use chrono::{DateTime, Utc};
use flowstate_json_patch::{apply_patch, from_json_patch, to_json_patch};
use serde_json::{json, Map, Value};

use crate::document::empty_document;
use crate::error::ProjectError;
use crate::gesture::Gesture;
use crate::history::{Diff, History, HistoryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    State,
    Diffs,
    Actions,
}

impl ProjectFormat {
    pub const ALL: [ProjectFormat; 3] = [ProjectFormat::State, ProjectFormat::Diffs, ProjectFormat::Actions];

    pub fn extension(self) -> &'static str {
        match self {
            ProjectFormat::State => "fss",
            ProjectFormat::Diffs => "fsd",
            ProjectFormat::Actions => "fsa",
        }
    }

    /// Pick the format from a file's extension.
    pub fn from_path(path: &FsPath) -> Result<Self, ProjectError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == ext)
            .ok_or_else(|| ProjectError::UnknownExtension(path.to_path_buf()))
    }
}

// ── File IO ───────────────────────────────────────────────────────────────

pub fn read_json(path: &FsPath) -> Result<Value, ProjectError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json(path: &FsPath, value: &Value) -> Result<(), ProjectError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

// ── Diffs ─────────────────────────────────────────────────────────────────

pub fn diff_to_json(diff: &Diff) -> Value {
    json!({
        "forward": to_json_patch(&diff.forward),
        "reverse": to_json_patch(&diff.reverse),
        "timestamp": diff.timestamp.to_rfc3339(),
    })
}

pub fn diff_from_json(v: &Value) -> Result<Diff, ProjectError> {
    let obj = v
        .as_object()
        .ok_or_else(|| ProjectError::Format("diff must be an object".into()))?;
    let member = |key: &str| obj.get(key).ok_or_else(|| ProjectError::Format(format!("diff is missing '{key}'")));
    let timestamp = member("timestamp")?
        .as_str()
        .ok_or_else(|| ProjectError::Format("timestamp must be a string".into()))?;
    Ok(Diff {
        forward: from_json_patch(member("forward")?)?,
        reverse: from_json_patch(member("reverse")?)?,
        timestamp: parse_timestamp(timestamp)?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ProjectError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ProjectError::Format(format!("bad timestamp {s:?}: {e}")))
}

/// Serialize a history (and its base document, when not the empty one).
pub fn history_to_json(history: &History, base: &Value) -> Value {
    let mut out = Map::new();
    out.insert(
        "diffs".into(),
        Value::Array(history.records().iter().map(|r| diff_to_json(&r.diff)).collect()),
    );
    out.insert("current_index".into(), json!(history.current_index()));
    if *base != empty_document() {
        out.insert("base".into(), base.clone());
    }
    Value::Object(out)
}

/// A history loaded from a diff file, with the document it leads to.
#[derive(Debug, Clone)]
pub struct LoadedHistory {
    pub base: Value,
    pub history: History,
    pub document: Value,
}

/// Parse a diff file and rebuild the document at its cursor.
///
/// Every forward patch is applied in order, then every reverse patch back
/// to the base, so a history that loads can be fully undone and redone.
///
/// # Errors
///
/// [`ProjectError::Format`] for a malformed file, an out-of-range cursor or
/// reverse patches that do not lead back to the base,
/// [`ProjectError::Patch`] when a stored patch does not apply.
pub fn history_from_json(v: &Value) -> Result<LoadedHistory, ProjectError> {
    let obj = v
        .as_object()
        .ok_or_else(|| ProjectError::Format("diff file must be an object".into()))?;
    let diffs = obj
        .get("diffs")
        .and_then(Value::as_array)
        .ok_or_else(|| ProjectError::Format("'diffs' must be an array".into()))?;
    let current_index = obj
        .get("current_index")
        .and_then(Value::as_i64)
        .ok_or_else(|| ProjectError::Format("'current_index' must be an integer".into()))?;
    if current_index < -1 || current_index >= diffs.len() as i64 {
        return Err(ProjectError::Format(format!(
            "current_index {current_index} out of range for {} diffs",
            diffs.len()
        )));
    }
    let base = obj.get("base").cloned().unwrap_or_else(empty_document);

    let records = diffs
        .iter()
        .map(|d| -> Result<HistoryRecord, ProjectError> {
            let diff = diff_from_json(d)?;
            let gesture = Gesture { actions: Vec::new(), committed_at: diff.timestamp };
            Ok(HistoryRecord { diff, gesture })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut scratch = base.clone();
    let mut document = base.clone();
    for (i, record) in records.iter().enumerate() {
        scratch = apply_patch(&scratch, &record.diff.forward)?;
        if i as i64 == current_index {
            document = scratch.clone();
        }
    }
    for record in records.iter().rev() {
        scratch = apply_patch(&scratch, &record.diff.reverse)?;
    }
    if scratch != base {
        return Err(ProjectError::Format("reverse patches do not lead back to the base document".into()));
    }
    Ok(LoadedHistory { base, history: History::from_records(records, current_index), document })
}

// ── Action log ────────────────────────────────────────────────────────────

/// Parse an action log.
pub fn action_log_from_json(v: &Value) -> Result<Vec<Gesture>, ProjectError> {
    if !v.is_array() {
        return Err(ProjectError::Format("action log must be an array".into()));
    }
    Ok(serde_json::from_value(v.clone())?)
}

pub fn action_log_to_json(gestures: &[Gesture]) -> Result<Value, ProjectError> {
    Ok(serde_json::to_value(gestures)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use flowstate_json_patch::diff;

    fn t(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn record(from: &Value, to: &Value, ms: i64) -> HistoryRecord {
        HistoryRecord {
            diff: Diff { forward: diff(from, to), reverse: diff(to, from), timestamp: t(ms) },
            gesture: Gesture { actions: Vec::new(), committed_at: t(ms) },
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ProjectFormat::from_path(FsPath::new("a/b.fss")).unwrap(), ProjectFormat::State);
        assert_eq!(ProjectFormat::from_path(FsPath::new("b.fsd")).unwrap(), ProjectFormat::Diffs);
        assert_eq!(ProjectFormat::from_path(FsPath::new("b.fsa")).unwrap(), ProjectFormat::Actions);
        assert!(matches!(
            ProjectFormat::from_path(FsPath::new("b.json")),
            Err(ProjectError::UnknownExtension(_))
        ));
        assert!(ProjectFormat::from_path(FsPath::new("noext")).is_err());
    }

    #[test]
    fn diff_json_shape() {
        let d = record(&json!({"a": 1}), &json!({"a": 2}), 0).diff;
        let v = diff_to_json(&d);
        assert_eq!(v["forward"], json!([{"op": "replace", "path": "/a", "value": 2}]));
        assert_eq!(v["reverse"], json!([{"op": "replace", "path": "/a", "value": 1}]));
        assert_eq!(diff_from_json(&v).unwrap(), d);
    }

    #[test]
    fn history_replays_to_cursor() {
        let base = empty_document();
        let mut one = base.clone();
        one["audio"]["volume"] = json!(0.5);
        let mut two = one.clone();
        two["audio"]["muted"] = json!(true);

        let mut history = History::new();
        history.append(record(&base, &one, 1));
        history.append(record(&one, &two, 2));
        let mut doc = two.clone();
        history.undo(&mut doc).unwrap();

        let encoded = history_to_json(&history, &base);
        assert!(encoded.get("base").is_none());
        let loaded = history_from_json(&encoded).unwrap();
        assert_eq!(loaded.document, one);
        assert_eq!(loaded.history.current_index(), 0);
        assert_eq!(loaded.history.len(), 2);
    }

    #[test]
    fn history_keeps_foreign_base() {
        let base = json!({"custom": true});
        let mut history = History::new();
        history.append(record(&base, &json!({"custom": false}), 1));
        let encoded = history_to_json(&history, &base);
        assert_eq!(encoded["base"], base);
        assert_eq!(history_from_json(&encoded).unwrap().document, json!({"custom": false}));
    }

    #[test]
    fn history_rejects_bad_files() {
        assert!(history_from_json(&json!([])).is_err());
        assert!(history_from_json(&json!({"diffs": [], "current_index": 0})).is_err());
        assert!(history_from_json(&json!({"diffs": [], "current_index": -2})).is_err());
        let stale = json!({
            "diffs": [{"forward": [{"op": "remove", "path": "/nope"}], "reverse": [], "timestamp": "2024-01-01T00:00:00Z"}],
            "current_index": 0
        });
        assert!(matches!(history_from_json(&stale), Err(ProjectError::Patch(_))));
    }

    #[test]
    fn history_checks_records_past_the_cursor() {
        let stale_redo = json!({
            "diffs": [{"forward": [{"op": "remove", "path": "/no/such"}], "reverse": [], "timestamp": "2024-01-01T00:00:00Z"}],
            "current_index": -1
        });
        assert!(matches!(history_from_json(&stale_redo), Err(ProjectError::Patch(_))));

        let base = empty_document();
        let mut one = base.clone();
        one["audio"]["volume"] = json!(0.5);
        let mut history = History::new();
        history.append(record(&base, &one, 1));
        let mut encoded = history_to_json(&history, &base);
        encoded["diffs"][0]["reverse"] = json!([{"op": "replace", "path": "/audio/volume", "value": 0.9}]);
        assert!(matches!(history_from_json(&encoded), Err(ProjectError::Format(_))));
        encoded["diffs"][0]["reverse"] = json!([{"op": "remove", "path": "/no/such"}]);
        assert!(matches!(history_from_json(&encoded), Err(ProjectError::Patch(_))));
    }

    #[test]
    fn action_log_round_trip() {
        let gestures = vec![Gesture { actions: vec![Action::ToggleDebugOverlay], committed_at: t(5) }];
        let v = action_log_to_json(&gestures).unwrap();
        assert_eq!(v[0]["actions"], json!([{"type": "toggle_debug_overlay"}]));
        assert_eq!(action_log_from_json(&v).unwrap(), gestures);
        assert!(action_log_from_json(&json!({})).is_err());
    }
}
