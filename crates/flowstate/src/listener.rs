//! Change notification.

use flowstate_json_pointer::Path;
use serde_json::Value;

/// Receives the paths changed by a tick together with the resulting document.
pub trait ChangeListener {
    fn on_change(&mut self, changed: &[Path], doc: &Value);
}

impl<F> ChangeListener for F
where
    F: FnMut(&[Path], &Value),
{
    fn on_change(&mut self, changed: &[Path], doc: &Value) {
        self(changed, doc)
    }
}

/// Forwards only changes that touch the subtree at `root`.
///
/// A change touches the subtree when it lies inside it or replaces one of
/// its ancestors.
///
/// # Example
///
/// ```
/// use flowstate::{ChangeListener, Path, PathWatcher};
/// use serde_json::json;
///
/// let mut hits = 0;
/// let mut watcher = PathWatcher::new("/audio".parse().unwrap(), |_: &[Path], _: &serde_json::Value| hits += 1);
/// watcher.on_change(&["/style/color_preset".parse().unwrap()], &json!({}));
/// watcher.on_change(&["/audio/volume".parse().unwrap()], &json!({}));
/// drop(watcher);
/// assert_eq!(hits, 1);
/// ```
pub struct PathWatcher<F> {
    root: Path,
    callback: F,
}

impl<F> PathWatcher<F>
where
    F: FnMut(&[Path], &Value),
{
    pub fn new(root: Path, callback: F) -> Self {
        Self { root, callback }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn touches(&self, path: &Path) -> bool {
        self.root.contains(path) || path.is_ancestor_of(&self.root)
    }
}

impl<F> ChangeListener for PathWatcher<F>
where
    F: FnMut(&[Path], &Value),
{
    fn on_change(&mut self, changed: &[Path], doc: &Value) {
        let relevant: Vec<Path> = changed.iter().filter(|p| self.touches(p)).cloned().collect();
        if !relevant.is_empty() {
            (self.callback)(&relevant, doc);
        }
    }
}
