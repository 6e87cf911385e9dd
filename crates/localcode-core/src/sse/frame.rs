//! Outbound SSE frame encoding.
//!
//! Every frame is a single `data: <payload>\n\n` block.

use bytes::Bytes;
use serde_json::{Value, json};

/// Terminal frame of every outbound stream.
pub const DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

/// Encode a JSON payload as one SSE frame.
pub fn data_frame(payload: &Value) -> Bytes {
    Bytes::from(format!("data: {payload}\n\n"))
}

/// Encode `{"error": {"message": ...}}` as one SSE frame.
pub fn error_frame(message: &str) -> Bytes {
    data_frame(&json!({"error": {"message": message}}))
}

/// The `data: [DONE]` frame.
pub const fn done_frame() -> Bytes {
    Bytes::from_static(DONE_FRAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_frame_is_compact_json() {
        let frame = data_frame(&json!({"choices": [{"delta": {"content": "Hi"}}]}));
        assert_eq!(&frame[..], b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n");
    }

    #[test]
    fn test_error_frame_escapes_message() {
        let frame = error_frame("Failed to parse JSON: \"oops\"");
        assert_eq!(
            &frame[..],
            b"data: {\"error\":{\"message\":\"Failed to parse JSON: \\\"oops\\\"\"}}\n\n"
        );
    }

    #[test]
    fn test_done_frame() {
        assert_eq!(&done_frame()[..], b"data: [DONE]\n\n");
    }
}
