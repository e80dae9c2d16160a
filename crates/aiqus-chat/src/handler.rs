// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made [`ChatHandler`] adapters.

use aiqus_core::{AiqusError, ChatHandler, Fragment, SessionRecord};
use tokio::sync::mpsc;
use tracing::trace;

/// A callback turned into a value, as delivered by [`ChannelHandler`].
#[derive(Debug)]
pub enum ChatEvent {
    Fragment(Fragment),
    Finished(SessionRecord),
    Error(AiqusError),
}

/// Forwards every callback as a [`ChatEvent`] over an unbounded channel.
///
/// The channel closes when the request task drops the handler, so a receiver
/// loop ends on its own once the request is over.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            trace!("chat event receiver dropped");
        }
    }
}

impl ChatHandler for ChannelHandler {
    fn on_fragment(&mut self, fragment: Fragment) {
        self.send(ChatEvent::Fragment(fragment));
    }

    fn on_finish(&mut self, session: SessionRecord) {
        self.send(ChatEvent::Finished(session));
    }

    fn on_error(&mut self, error: AiqusError) {
        self.send(ChatEvent::Error(error));
    }
}

/// Builds a handler from three closures.
pub struct FnHandler<F, D, E> {
    on_fragment: F,
    on_finish: D,
    on_error: E,
}

impl<F, D, E> FnHandler<F, D, E>
where
    F: FnMut(Fragment) + Send + 'static,
    D: FnMut(SessionRecord) + Send + 'static,
    E: FnMut(AiqusError) + Send + 'static,
{
    pub fn new(on_fragment: F, on_finish: D, on_error: E) -> Self {
        Self {
            on_fragment,
            on_finish,
            on_error,
        }
    }
}

impl<F, D, E> ChatHandler for FnHandler<F, D, E>
where
    F: FnMut(Fragment) + Send + 'static,
    D: FnMut(SessionRecord) + Send + 'static,
    E: FnMut(AiqusError) + Send + 'static,
{
    fn on_fragment(&mut self, fragment: Fragment) {
        (self.on_fragment)(fragment);
    }

    fn on_finish(&mut self, session: SessionRecord) {
        (self.on_finish)(session);
    }

    fn on_error(&mut self, error: AiqusError) {
        (self.on_error)(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn fragment(text: &str) -> Fragment {
        Fragment {
            text: text.into(),
            message_id: "msg-1".into(),
        }
    }

    #[tokio::test]
    async fn channel_handler_forwards_in_order() {
        let (mut handler, mut rx) = ChannelHandler::new();
        handler.on_fragment(fragment("a"));
        handler.on_error(AiqusError::Internal("boom".into()));
        drop(handler);

        assert!(matches!(rx.recv().await, Some(ChatEvent::Fragment(f)) if f.text == "a"));
        assert!(matches!(rx.recv().await, Some(ChatEvent::Error(_))));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn channel_handler_tolerates_dropped_receiver() {
        let (mut handler, rx) = ChannelHandler::new();
        drop(rx);
        handler.on_fragment(fragment("lost"));
    }

    #[test]
    fn fn_handler_invokes_closures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (seen.clone(), seen.clone(), seen.clone());
        let mut handler = FnHandler::new(
            move |f: Fragment| a.lock().unwrap().push(format!("fragment:{}", f.text)),
            move |s: SessionRecord| b.lock().unwrap().push(format!("finish:{}", s.answer)),
            move |e: AiqusError| c.lock().unwrap().push(format!("error:{e}")),
        );

        handler.on_fragment(fragment("x"));
        let mut session = SessionRecord::new("q", Default::default(), "m", vec![], None);
        session.answer = "x".into();
        handler.on_finish(session);

        assert_eq!(*seen.lock().unwrap(), vec!["fragment:x", "finish:x"]);
    }
}
