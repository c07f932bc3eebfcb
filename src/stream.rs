//! Server-sent event stream decoding.
//!
//! Streaming endpoints answer with an SSE-framed body. [`EventStream`] owns
//! the response bytes, reassembles lines across chunk boundaries, and hands
//! them to an [`EventProcessor`] that knows the field layout of its event
//! shape (chat events are `event:` + `data:` pairs, workflow events add a
//! leading `id:` line). The decoder itself never inspects event payloads.
//!
//! `recv()` returns `Ok(None)` once the body is drained, which is distinct
//! from both a decoded event and an error. Reading past a terminal `done`
//! event simply drains to end-of-stream rather than failing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;

use crate::client::extract_log_id;
use crate::error::{Error, ErrorBody, Result};

/// Decodes complete events out of the line stream.
///
/// `process` is called with the first non-blank line of a potential event and
/// may pull the remaining field lines from `lines`. It returns the decoded
/// event plus a terminal flag, or `None` to skip an unrecognized line.
#[async_trait]
pub trait EventProcessor: Send {
    /// Decoded event type.
    type Event: Send;

    /// Consume one event's worth of lines.
    async fn process(
        &mut self,
        line: &str,
        lines: &mut LineReader,
    ) -> Result<Option<(Self::Event, bool)>>;
}

/// Buffered line reader over a chunked byte stream.
///
/// Lines may arrive split across chunks; terminators are `\n` with an
/// optional preceding `\r`.
pub struct LineReader {
    stream: Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>,
    buffer: String,
    eof: bool,
}

impl LineReader {
    pub(crate) fn new(stream: impl Stream<Item = Result<Bytes>> + Send + 'static) -> Self {
        Self {
            stream: Box::pin(stream),
            buffer: String::new(),
            eof: false,
        }
    }

    /// Next complete line without its terminator, or `None` at end of stream.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffer.find('\n') {
                let rest = self.buffer.split_off(pos + 1);
                let mut line = std::mem::replace(&mut self.buffer, rest);
                line.truncate(line.len() - 1);
                if line.ends_with('\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(line));
            }
            if self.eof {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                // Final line without a terminator.
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
            match self.stream.next().await {
                Some(Ok(bytes)) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Some(Err(err)) => return Err(err),
                None => self.eof = true,
            }
        }
    }
}

/// Typed event stream over an open streaming response.
///
/// The underlying byte source is released by [`close`](EventStream::close)
/// (idempotent) or on drop.
pub struct EventStream<P: EventProcessor> {
    lines: Option<LineReader>,
    processor: P,
    finished: bool,
    log_id: Option<String>,
}

impl<P: EventProcessor> std::fmt::Debug for EventStream<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("finished", &self.finished)
            .field("log_id", &self.log_id)
            .finish_non_exhaustive()
    }
}

impl<P: EventProcessor> EventStream<P> {
    pub(crate) fn new(lines: LineReader, processor: P, log_id: Option<String>) -> Self {
        Self {
            lines: Some(lines),
            processor,
            finished: false,
            log_id,
        }
    }

    /// Build a decoder from a streaming HTTP response.
    ///
    /// If the server rejected the streaming request with a plain JSON body
    /// instead of an event stream, that body is decoded into an [`Error::Api`]
    /// here, before any line parsing.
    pub(crate) async fn from_response(response: reqwest::Response, processor: P) -> Result<Self> {
        let log_id = extract_log_id(&response);

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if content_type.contains("application/json") {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => err.into_error(log_id),
                Err(_) => Error::Stream(format!("unexpected JSON response: {body}")),
            });
        }

        let bytes = response
            .bytes_stream()
            .map_err(|e| Error::Stream(e.to_string()));
        Ok(Self::new(LineReader::new(bytes), processor, log_id))
    }

    /// Receive the next event.
    ///
    /// Returns `Ok(None)` at end of stream and after [`close`](EventStream::close).
    /// Transport failures, malformed framing, and server-signaled stream
    /// errors all surface as `Err`.
    pub async fn recv(&mut self) -> Result<Option<P::Event>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        loop {
            let line = match lines.next_line().await? {
                Some(line) => line,
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some((event, done)) = self.processor.process(&line, lines).await? {
                self.finished = done;
                return Ok(Some(event));
            }
        }
    }

    /// Whether a terminal event or end-of-stream has been observed.
    /// Informational; `recv()` after a terminal event reads a clean
    /// end-of-stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Log id reported in the response headers, if any.
    pub fn log_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }

    /// Release the underlying byte source. Safe to call more than once and
    /// after errors; subsequent `recv()` calls return `Ok(None)`.
    pub fn close(&mut self) {
        self.lines = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Processor that echoes each non-blank line; "done" is terminal.
    struct LineEcho;

    #[async_trait]
    impl EventProcessor for LineEcho {
        type Event = String;

        async fn process(
            &mut self,
            line: &str,
            _lines: &mut LineReader,
        ) -> Result<Option<(String, bool)>> {
            Ok(Some((line.to_string(), line == "done")))
        }
    }

    fn reader_from(chunks: Vec<Result<Bytes>>) -> LineReader {
        LineReader::new(futures::stream::iter(chunks))
    }

    fn stream_from(body: &str) -> EventStream<LineEcho> {
        let reader = reader_from(vec![Ok(Bytes::from(body.to_string()))]);
        EventStream::new(reader, LineEcho, Some("test_log_id".to_string()))
    }

    #[tokio::test]
    async fn test_recv_yields_events_then_end_of_stream() {
        let mut stream = stream_from("first\n\nsecond\ndone\n");

        assert_eq!(stream.recv().await.unwrap().unwrap(), "first");
        assert!(!stream.is_finished());
        assert_eq!(stream.recv().await.unwrap().unwrap(), "second");
        assert_eq!(stream.recv().await.unwrap().unwrap(), "done");
        assert!(stream.is_finished());

        // Reading past the terminal event drains to end-of-stream.
        assert!(stream.recv().await.unwrap().is_none());
        assert_eq!(stream.log_id(), Some("test_log_id"));
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks_and_crlf() {
        let mut reader = reader_from(vec![
            Ok(Bytes::from_static(b"hel")),
            Ok(Bytes::from_static(b"lo\r\nwor")),
            Ok(Bytes::from_static(b"ld")),
        ]);

        assert_eq!(reader.next_line().await.unwrap().unwrap(), "hello");
        // Trailing data without a terminator still comes through.
        assert_eq!(reader.next_line().await.unwrap().unwrap(), "world");
        assert!(reader.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let mut stream = EventStream::new(
            reader_from(vec![
                Ok(Bytes::from_static(b"first\n")),
                Err(Error::Stream("connection reset".to_string())),
            ]),
            LineEcho,
            None,
        );

        assert_eq!(stream.recv().await.unwrap().unwrap(), "first");
        assert!(matches!(
            stream.recv().await,
            Err(Error::Stream(msg)) if msg == "connection reset"
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut stream = stream_from("first\ndone\n");
        stream.close();
        stream.close();
        assert!(stream.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let mut stream = stream_from("\n\n\nonly\n\n");
        assert_eq!(stream.recv().await.unwrap().unwrap(), "only");
        assert!(stream.recv().await.unwrap().is_none());
    }
}
