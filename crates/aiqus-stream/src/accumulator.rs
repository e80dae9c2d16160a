// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running answer for one exchange.

use aiqus_core::Fragment;

/// Appends fragments to the full answer and forwards each one, tagged with
/// the owning message id.
///
/// The answer only ever grows; fragments are neither reordered nor merged.
#[derive(Debug)]
pub struct AnswerAccumulator {
    message_id: String,
    answer: String,
    fragments: usize,
}

impl AnswerAccumulator {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            answer: String::new(),
            fragments: 0,
        }
    }

    /// Appends `text` and hands the fragment (not the running total) to `forward`.
    pub fn append(&mut self, text: String, forward: impl FnOnce(Fragment)) {
        self.answer.push_str(&text);
        self.fragments += 1;
        forward(Fragment {
            text,
            message_id: self.message_id.clone(),
        });
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// The answer accumulated so far.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }

    /// Number of fragments appended so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Consumes the accumulator, returning the final answer.
    pub fn into_answer(self) -> String {
        self.answer
    }
}
