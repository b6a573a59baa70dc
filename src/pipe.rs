// src/pipe.rs

//! Single-slot mailbox for piped input.
//!
//! A pipeline orchestrator `put`s the stdout of one command into the slot,
//! and the dispatcher `take`s it exactly once when the next command is
//! dispatched. Taking clears the slot under the same lock, so one request
//! can never observe input meant for another.

use std::sync::{Arc, Mutex};

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PipeSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl PipeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is pending with `input`.
    pub fn put(&self, input: impl Into<String>) {
        let input = input.into();
        debug!(bytes = input.len(), "pipe slot filled");
        *self.lock() = Some(input);
    }

    /// Consume the pending input, leaving the slot empty.
    pub fn take(&self) -> Option<String> {
        self.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a valid Option; keep using it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
