//! The inbound action queue.
//!
//! Any thread may hold an [`ActionSender`]; only the store's owning thread
//! drains the queue, once per tick.

use crossbeam::channel::{self, Receiver, Sender};

use crate::action::Action;
use crate::error::QueueClosed;

/// Cloneable producer handle for the store's queue.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: Sender<Action>,
}

impl ActionSender {
    /// # Errors
    ///
    /// [`QueueClosed`] once the store has been dropped.
    pub fn send(&self, action: Action) -> Result<(), QueueClosed> {
        self.tx.send(action).map_err(|_| QueueClosed)
    }
}

#[derive(Debug)]
pub struct ActionQueue {
    tx: Sender<Action>,
    rx: Receiver<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> ActionSender {
        ActionSender { tx: self.tx.clone() }
    }

    /// Queue an action from the owning thread.
    pub fn push(&self, action: Action) {
        // `rx` lives as long as `self`, so this cannot fail
        let _ = self.tx.send(action);
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take every action queued at call time, in FIFO order. Actions sent
    /// while draining wait for the next call.
    pub fn drain(&self) -> Vec<Action> {
        let pending = self.rx.len();
        self.rx.try_iter().take(pending).collect()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}
