//! Incremental SSE line decoder.

use bytes::BytesMut;
use serde_json::Value;

use crate::domain::ProtocolEvent;

/// Prefix of an SSE data line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates an OpenAI stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Decodes SSE `data:` lines from byte chunks of arbitrary size.
///
/// The buffer holds raw bytes, not text, so a multi-byte character split
/// across chunks is reassembled before decoding. Only the unterminated tail
/// of the last line is kept between calls to [`push`](Self::push).
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    /// Bytes of `buf` already known to contain no newline.
    scanned: usize,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` has been decoded. Further input is ignored.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append a chunk and return every event completed by it.
    ///
    /// Decoding stops at `[DONE]`: the sentinel is the last event returned
    /// and anything buffered after it is dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buf.extend_from_slice(chunk);

        while let Some(line_end) = find_newline(&self.buf, self.scanned) {
            let line = self.buf.split_to(line_end);
            self.scanned = 0;
            let Some(event) = decode_line(&line) else {
                continue;
            };

            let done = event == ProtocolEvent::Done;
            events.push(event);
            if done {
                self.finished = true;
                self.buf.clear();
                return events;
            }
        }

        self.scanned = self.buf.len();
        events
    }

    /// End of input. Discards an unterminated trailing line and returns its
    /// length in bytes.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        self.scanned = 0;
        dropped
    }
}

/// Decode one complete line (newline included).
///
/// Blank lines and non-`data:` fields yield nothing.
fn decode_line(line: &[u8]) -> Option<ProtocolEvent> {
    let text = String::from_utf8_lossy(line);
    let data = text.trim().strip_prefix(DATA_PREFIX)?.trim();

    if data == DONE_SENTINEL {
        return Some(ProtocolEvent::Done);
    }

    Some(match serde_json::from_str::<Value>(data) {
        Ok(payload) => ProtocolEvent::Chunk(payload),
        Err(_) => ProtocolEvent::parse_error(data),
    })
}

/// Find the next newline at or after `from`, returning the position after it.
fn find_newline(buf: &BytesMut, from: usize) -> Option<usize> {
    buf[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|pos| from + pos + 1)
}
