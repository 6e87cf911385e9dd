//! Adapter from an upstream byte stream to a lazy event stream.

use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use super::SseDecoder;
use crate::domain::ProtocolEvent;

/// State threaded through the `unfold` stream.
struct DecodeState<E> {
    stream: BoxStream<'static, Result<Bytes, E>>,
    decoder: SseDecoder,
    pending: VecDeque<ProtocolEvent>,
    exhausted: bool,
}

/// Decode an SSE byte stream into [`ProtocolEvent`]s, one at a time.
///
/// Ends after `Done`, after the first transport error (yielded as `Err`), or
/// when the byte stream is exhausted. Bytes are only pulled from upstream
/// when the consumer asks for the next event.
pub fn decode_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<ProtocolEvent, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = DecodeState {
        stream: byte_stream.boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(event), st));
            }

            if st.exhausted || st.decoder.is_finished() {
                return None;
            }

            // Need more data from upstream.
            match st.stream.next().await {
                Some(Ok(chunk)) => {
                    st.pending.extend(st.decoder.push(&chunk));
                }
                Some(Err(e)) => {
                    st.exhausted = true;
                    return Some((Err(e), st));
                }
                None => {
                    let dropped = st.decoder.finish();
                    if dropped > 0 {
                        debug!("Discarding {dropped} bytes of unterminated SSE data at end of stream");
                    }
                    st.exhausted = true;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;

    fn byte_stream(
        chunks: Vec<Result<&'static [u8], &'static str>>,
    ) -> impl Stream<Item = Result<Bytes, &'static str>> + Send + 'static {
        stream::iter(chunks.into_iter().map(|c| c.map(Bytes::from_static)))
    }

    #[tokio::test]
    async fn test_decodes_across_chunk_boundaries() {
        let events: Vec<_> = decode_stream(byte_stream(vec![
            Ok(b"data: {\"a\"".as_slice()),
            Ok(b":1}\n\ndata: [DO".as_slice()),
            Ok(b"NE]\n\n".as_slice()),
        ]))
        .collect()
        .await;

        assert_eq!(
            events,
            vec![Ok(ProtocolEvent::Chunk(json!({"a": 1}))), Ok(ProtocolEvent::Done)]
        );
    }

    #[tokio::test]
    async fn test_stops_pulling_after_done() {
        let events: Vec<_> = decode_stream(byte_stream(vec![
            Ok(b"data: [DONE]\n\n".as_slice()),
            Err("must not be polled"),
        ]))
        .collect()
        .await;

        assert_eq!(events, vec![Ok(ProtocolEvent::Done)]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let events: Vec<_> = decode_stream(byte_stream(vec![
            Ok(b"data: {\"a\":1}\n\n".as_slice()),
            Err("connection reset"),
            Ok(b"data: {\"b\":2}\n\n".as_slice()),
        ]))
        .collect()
        .await;

        assert_eq!(
            events,
            vec![Ok(ProtocolEvent::Chunk(json!({"a": 1}))), Err("connection reset")]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_without_done() {
        let events: Vec<_> = decode_stream(byte_stream(vec![Ok(
            b"data: {\"a\":1}\n\ndata: {\"partial\"".as_slice(),
        )]))
        .collect()
        .await;

        assert_eq!(events, vec![Ok(ProtocolEvent::Chunk(json!({"a": 1})))]);
    }
}
