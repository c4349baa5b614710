//! Pairwise action merging and gesture compression.

use crate::action::Action;

/// Outcome of merging two adjacent actions `a` then `b`.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeResult {
    /// `b` undoes `a`; neither survives.
    Cancelled,
    /// One action with the combined effect.
    Merged(Action),
    Unmergeable,
}

/// Merge `a` followed by `b`.
pub fn merge(a: &Action, b: &Action) -> MergeResult {
    match (a, b) {
        (Action::SetValue { path: pa, .. }, Action::SetValue { path: pb, .. }) if pa == pb => {
            MergeResult::Merged(b.clone())
        }
        (Action::ToggleValue { path: pa }, Action::ToggleValue { path: pb }) if pa == pb => MergeResult::Cancelled,
        (Action::OpenFileDialog { .. }, Action::OpenFileDialog { .. }) => MergeResult::Merged(b.clone()),
        (Action::OpenFileDialog { .. }, Action::CloseFileDialog) => MergeResult::Cancelled,
        (Action::SetColorPreset { .. }, Action::SetColorPreset { .. }) => MergeResult::Merged(b.clone()),
        (Action::ToggleMetricsWindow, Action::ToggleMetricsWindow)
        | (Action::ToggleDebugOverlay, Action::ToggleDebugOverlay) => MergeResult::Cancelled,
        _ => MergeResult::Unmergeable,
    }
}

/// Collapse adjacent mergeable actions in a single left-to-right pass.
///
/// Only neighbours are considered: `[set(a), set(b), set(a)]` stays as is.
///
/// # Example
///
/// ```
/// use flowstate::{compress, Action};
/// use serde_json::json;
///
/// let path: flowstate::Path = "/audio/volume".parse().unwrap();
/// let set = |v: f64| Action::SetValue { path: path.clone(), value: json!(v) };
/// assert_eq!(compress(vec![set(0.2), set(0.4), set(0.6)]), vec![set(0.6)]);
/// ```
pub fn compress(actions: Vec<Action>) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len());
    let mut active: Option<Action> = None;
    for action in actions {
        active = match active.take() {
            None => Some(action),
            Some(prev) => match merge(&prev, &action) {
                MergeResult::Cancelled => None,
                MergeResult::Merged(merged) => Some(merged),
                MergeResult::Unmergeable => {
                    out.push(prev);
                    Some(action)
                }
            },
        };
    }
    out.extend(active);
    out
}
