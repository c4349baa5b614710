//! Transactional state management for an interactive application.
//!
//! Callers enqueue [`Action`]s; once per tick the [`Store`] applies them to a
//! single JSON document, batches applied actions into gestures and commits
//! each gesture's net change to a linear undo/redo history of bidirectional
//! patches. Projects persist as a document snapshot, a diff history or an
//! action log that is replayed on load.
//!
//! # Example
//!
//! ```
//! use flowstate::{Action, Store, StoreConfig};
//! use serde_json::json;
//!
//! let mut store = Store::with_config(StoreConfig::default().with_gesture_debounce_ms(0)).unwrap();
//! store.enqueue(Action::ToggleMetricsWindow);
//! store.drain_and_apply();
//! assert_eq!(store.document()["windows"]["metrics"], json!(true));
//!
//! store.enqueue(Action::Undo);
//! store.drain_and_apply();
//! assert_eq!(store.document()["windows"]["metrics"], json!(false));
//! ```

pub mod action;
pub mod config;
pub mod document;
pub mod error;
pub mod gesture;
pub mod history;
pub mod listener;
pub mod merge;
pub mod project;
pub mod queue;
pub mod reducer;
pub mod stats;
pub mod store;

pub use action::{Action, ActionKind, ActionRegistry};
pub use config::StoreConfig;
pub use error::{ConfigError, ProjectError, QueueClosed, StoreError};
pub use gesture::{Gesture, GestureAccumulator, GestureState};
pub use history::{Diff, History, HistoryRecord};
pub use listener::{ChangeListener, PathWatcher};
pub use merge::{compress, merge, MergeResult};
pub use project::ProjectFormat;
pub use queue::ActionSender;
pub use stats::{PathFrequency, PathStats};
pub use store::{Store, TickReport};

pub use flowstate_json_patch::{Op, Patch};
pub use flowstate_json_pointer::Path;
