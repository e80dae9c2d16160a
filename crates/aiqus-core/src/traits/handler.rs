// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callback surface of a streamed chat request.

use crate::error::AiqusError;
use crate::types::{Fragment, SessionRecord};

/// Receives the observable events of one streamed chat request.
///
/// Firing rules:
/// - `on_fragment` fires once per non-empty text fragment, in arrival order,
///   and never after cancellation was requested.
/// - `on_finish` fires at most once, with the finalized record.
/// - `on_error` fires for configuration and transport failures only. When a
///   transport failure happens after some text arrived, `on_error` is followed
///   by `on_finish` carrying the partial answer.
pub trait ChatHandler: Send + 'static {
    fn on_fragment(&mut self, fragment: Fragment);

    fn on_finish(&mut self, session: SessionRecord);

    fn on_error(&mut self, error: AiqusError);
}

impl<H: ChatHandler + ?Sized> ChatHandler for Box<H> {
    fn on_fragment(&mut self, fragment: Fragment) {
        (**self).on_fragment(fragment);
    }

    fn on_finish(&mut self, session: SessionRecord) {
        (**self).on_finish(session);
    }

    fn on_error(&mut self, error: AiqusError) {
        (**self).on_error(error);
    }
}
