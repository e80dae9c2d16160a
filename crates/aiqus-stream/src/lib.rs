// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streamed completion decoding for the aiqus chat client.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! - [`FrameDecoder`] / [`LineStream`]: raw byte chunks to text lines
//! - [`DeltaParser`]: `data: ` records to answer fragments
//! - [`AnswerAccumulator`]: fragments to the full answer

pub mod accumulator;
pub mod decoder;
pub mod delta;

pub use accumulator::AnswerAccumulator;
pub use decoder::{FrameDecoder, LineStream};
pub use delta::{DATA_PREFIX, DONE_SENTINEL, Delta, DeltaParser, parse_line};

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes in, answer out, with chunk boundaries inside a record and inside
    /// a multi-byte character.
    #[test]
    fn stages_compose_into_an_answer() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Grüß\"}}]}\n\n",
            "data: garbage\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" dich\"}}]}\n\n",
            "data: [DONE]\n",
        )
        .as_bytes();

        let mut decoder = FrameDecoder::new();
        let mut parser = DeltaParser::new();
        let mut acc = AnswerAccumulator::new("msg-x");
        let mut fragments = Vec::new();

        let mut lines = Vec::new();
        for chunk in body.chunks(7) {
            lines.extend(decoder.push(chunk));
        }
        lines.extend(decoder.finish());

        for line in &lines {
            if let Some(text) = parser.feed(line) {
                acc.append(text, |f| fragments.push(f.text));
            }
        }

        assert_eq!(fragments, vec!["Grüß", " dich"]);
        assert_eq!(acc.answer(), "Grüß dich");
        assert!(parser.saw_done());
        assert_eq!(parser.malformed(), 1);
    }
}
