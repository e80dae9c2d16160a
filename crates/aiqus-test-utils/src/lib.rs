// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for aiqus integration tests.
//!
//! # Components
//!
//! - [`MockHistory`] - in-memory history store, optionally failing
//! - [`RecordingHandler`] - captures callbacks in arrival order
//! - [`sse_body`] / [`sse_chunk`] - canned completion stream bodies
//! - [`RawStreamServer`] - broken or stalled streams wiremock cannot fake
//! - [`TestHarness`] - wiremock endpoint plus a ready `ChatService`

pub mod harness;
pub mod mock_history;
pub mod recording;
pub mod sse;

pub use harness::{TEST_API_KEY, TestHarness, TestHarnessBuilder};
pub use mock_history::MockHistory;
pub use recording::RecordingHandler;
pub use sse::{RawStreamServer, StreamEnding, sse_body, sse_chunk};
