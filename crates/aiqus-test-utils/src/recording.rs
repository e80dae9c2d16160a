// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`ChatHandler`] that records every callback for later assertions.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use aiqus_chat::ChatEvent;
use aiqus_core::{AiqusError, ChatHandler, Fragment, SessionRecord};

/// Records callbacks in arrival order.
///
/// Clones share the same log, so a test can keep one clone while the other
/// is moved into a spawned request.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    events: Arc<Mutex<Vec<ChatEvent>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the recorded events.
    pub fn inspect<R>(&self, f: impl FnOnce(&[ChatEvent]) -> R) -> R {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        f(&events)
    }

    /// Callback names in order: `"fragment"`, `"finish"`, or `"error"`.
    pub fn sequence(&self) -> Vec<&'static str> {
        self.inspect(|events| {
            events
                .iter()
                .map(|e| match e {
                    ChatEvent::Fragment(_) => "fragment",
                    ChatEvent::Finished(_) => "finish",
                    ChatEvent::Error(_) => "error",
                })
                .collect()
        })
    }

    pub fn fragments(&self) -> Vec<Fragment> {
        self.inspect(|events| {
            events
                .iter()
                .filter_map(|e| match e {
                    ChatEvent::Fragment(f) => Some(f.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    pub fn fragment_texts(&self) -> Vec<String> {
        self.fragments().into_iter().map(|f| f.text).collect()
    }

    pub fn finished(&self) -> Vec<SessionRecord> {
        self.inspect(|events| {
            events
                .iter()
                .filter_map(|e| match e {
                    ChatEvent::Finished(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    /// Display strings of the reported errors.
    pub fn errors(&self) -> Vec<String> {
        self.inspect(|events| {
            events
                .iter()
                .filter_map(|e| match e {
                    ChatEvent::Error(err) => Some(err.to_string()),
                    _ => None,
                })
                .collect()
        })
    }

    /// True if any reported error matches `predicate`.
    pub fn has_error(&self, predicate: impl Fn(&AiqusError) -> bool) -> bool {
        self.inspect(|events| {
            events
                .iter()
                .any(|e| matches!(e, ChatEvent::Error(err) if predicate(err)))
        })
    }

    /// Polls until at least `count` fragments arrived or `timeout` elapsed.
    /// Returns whether the count was reached.
    pub async fn wait_for_fragments(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.fragments().len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn push(&self, event: ChatEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ChatHandler for RecordingHandler {
    fn on_fragment(&mut self, fragment: Fragment) {
        self.push(ChatEvent::Fragment(fragment));
    }

    fn on_finish(&mut self, session: SessionRecord) {
        self.push(ChatEvent::Finished(session));
    }

    fn on_error(&mut self, error: AiqusError) {
        self.push(ChatEvent::Error(error));
    }
}
