// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line framing for a chunked response body.
//!
//! Network reads hand over byte chunks whose boundaries have nothing to do
//! with line boundaries, and a chunk may even end halfway through a UTF-8
//! sequence. [`FrameDecoder`] keeps both kinds of leftovers between pushes so
//! the emitted lines are the same however the body was chunked.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;

/// Incremental UTF-8 line decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of a UTF-8 sequence that is not complete yet.
    pending: Vec<u8>,
    /// Decoded text after the last newline seen.
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every line it completed, in order.
    ///
    /// Lines are returned without their `\n` (and without a `\r` before it).
    /// Empty lines are returned as empty strings.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let scanned = self.buffer.len();
        self.decode(chunk);

        // Text before `scanned` holds no newline, so only new text is searched.
        let Some(last) = self.buffer[scanned..].rfind('\n') else {
            return Vec::new();
        };
        let tail = self.buffer.split_off(scanned + last + 1);
        let complete = std::mem::replace(&mut self.buffer, tail);

        let mut lines: Vec<String> = complete
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
            .collect();
        // `complete` ends with a newline, leaving one empty piece after it.
        lines.pop();
        lines
    }

    /// Flushes the decoder at end of stream.
    ///
    /// Returns the unterminated trailing line, if any text is left over. An
    /// incomplete UTF-8 sequence at the very end decodes to U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.buffer.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        if self.buffer.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.buffer);
        strip_carriage_return(&mut line);
        Some(line)
    }

    /// Returns true if no partial line or partial character is buffered.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.buffer.is_empty()
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        while consumed < self.pending.len() {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    consumed = self.pending.len();
                }
                Err(err) => {
                    let valid_end = consumed + err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    consumed = valid_end;
                    match err.error_len() {
                        // Invalid sequence: replace it and keep going.
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                        // Truncated sequence: wait for the next chunk.
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }
}

fn strip_carriage_return(line: &mut String) {
    if line.ends_with('\r') {
        line.pop();
    }
}

pin_project! {
    /// Lazily turns a stream of byte chunks into a stream of text lines.
    ///
    /// Errors from the inner stream are passed through unchanged. When the
    /// inner stream ends, the unterminated trailing line (if any) is yielded
    /// before the line stream itself ends.
    pub struct LineStream<S> {
        #[pin]
        inner: S,
        decoder: FrameDecoder,
        ready: VecDeque<String>,
        finished: bool,
    }
}

impl<S> LineStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }
}

impl<S, B, E> Stream for LineStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(line) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.ready.extend(this.decoder.push(chunk.as_ref())),
                Some(Err(err)) => return Poll::Ready(Some(Err(err))),
                None => {
                    *this.finished = true;
                    this.ready.extend(this.decoder.finish());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use proptest::prelude::*;

    fn decode_chunks(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = FrameDecoder::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(decoder.push(chunk));
        }
        lines.extend(decoder.finish());
        lines
    }

    #[test]
    fn splits_complete_lines_and_keeps_tail() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(b"data: a\ndata: b\ndata: "), vec!["data: a", "data: b"]);
        assert!(!decoder.is_idle());
        assert_eq!(decoder.push(b"c\n"), vec!["data: c"]);
        assert!(decoder.is_idle());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn emits_unterminated_tail_on_finish() {
        assert_eq!(decode_chunks(&[b"one\ntw", b"o"]), vec!["one", "two"]);
    }

    #[test]
    fn keeps_empty_lines() {
        assert_eq!(decode_chunks(&[b"a\n\nb\n"]), vec!["a", "", "b"]);
    }

    #[test]
    fn strips_crlf_split_across_chunks() {
        assert_eq!(decode_chunks(&[b"a\r", b"\nb\r\n"]), vec!["a", "b"]);
    }

    #[test]
    fn reassembles_multibyte_character_split_across_chunks() {
        let bytes = "data: 你好\n".as_bytes();
        // '你' is three bytes starting at offset 6; cut inside it.
        let (first, second) = bytes.split_at(7);
        assert_eq!(decode_chunks(&[first, second]), vec!["data: 你好"]);
    }

    #[test]
    fn reassembles_character_split_into_single_bytes() {
        let bytes = "é🙂\n".as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(decode_chunks(&chunks), vec!["é🙂"]);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode_chunks(&[b"a\xffb\n"]), vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn truncated_character_at_end_of_stream_is_replaced() {
        let bytes = "你".as_bytes();
        assert_eq!(decode_chunks(&[&bytes[..2]]), vec!["\u{FFFD}"]);
    }

    #[test]
    fn many_lines_in_one_chunk_decode_quickly() {
        let body = "data: x\n".repeat(200_000);
        let started = std::time::Instant::now();
        let lines = FrameDecoder::new().push(body.as_bytes());
        assert_eq!(lines.len(), 200_000);
        assert!(lines.iter().all(|l| l == "data: x"));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn long_line_across_many_chunks_decodes_quickly() {
        let chunk = [b'a'; 1024];
        let mut decoder = FrameDecoder::new();
        let started = std::time::Instant::now();
        for _ in 0..8 * 1024 {
            assert!(decoder.push(&chunk).is_empty());
        }
        let lines = decoder.push(b"\n");
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 8 * 1024 * 1024);
        assert!(decoder.is_idle());
    }

    #[tokio::test]
    async fn line_stream_yields_lines_lazily() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: 1\nda".to_vec()),
            Ok(b"ta: 2\n".to_vec()),
            Ok(b"data: 3".to_vec()),
        ];
        let lines: Vec<String> = LineStream::new(futures::stream::iter(chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: 1", "data: 2", "data: 3"]);
    }

    #[tokio::test]
    async fn line_stream_passes_errors_through() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: 1\n".to_vec()),
            Err(std::io::Error::other("connection reset")),
        ];
        let mut lines = LineStream::new(futures::stream::iter(chunks));
        assert_eq!(lines.next().await.unwrap().unwrap(), "data: 1");
        assert!(lines.next().await.unwrap().is_err());
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_lines(
            lines in prop::collection::vec("[^\r\n]{0,12}", 1..8),
            trailing_newline in any::<bool>(),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
        ) {
            let mut text = lines.join("\n");
            if trailing_newline {
                text.push('\n');
            }
            let bytes = text.as_bytes();

            let whole = decode_chunks(&[bytes]);

            let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
            offsets.sort_unstable();
            offsets.dedup();
            let mut chunks = Vec::new();
            let mut start = 0;
            for offset in offsets {
                chunks.push(&bytes[start..offset]);
                start = offset;
            }
            chunks.push(&bytes[start..]);

            prop_assert_eq!(decode_chunks(&chunks), whole);
        }
    }
}
