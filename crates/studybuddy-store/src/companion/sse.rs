//! Minimal `text/event-stream` decoding.
//!
//! Only `data:` fields matter to the feeds; `event:`, `id:` and `retry:` are
//! read past, comment lines (leading `:`) are ignored. An event is dispatched
//! on a blank line; a trailing event without one is dropped at end of stream.

use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;

/// Incremental decoder fed with arbitrary byte chunks
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning the data of every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (&*line, ""),
            };
            if field == "data" {
                self.data.push(value.to_string());
            }
        }
        events
    }
}

/// Turn a byte stream into a stream of event payloads
pub fn events<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let state = (Box::pin(bytes), SseDecoder::new(), VecDeque::<String>::new(), false);
    stream::unfold(state, |(mut bytes, mut decoder, mut pending, mut done)| async move {
        loop {
            if let Some(event) = pending.pop_front() {
                return Some((Ok(event), (bytes, decoder, pending, done)));
            }
            if done {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => pending.extend(decoder.push(chunk.as_ref())),
                Some(Err(e)) => {
                    done = true;
                    return Some((Err(e), (bytes, decoder, pending, done)));
                }
                None => done = true,
            }
        }
    })
}
