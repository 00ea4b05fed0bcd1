//! Incremental decoder for `text/event-stream` bodies.

use std::pin::Pin;

use futures::{Stream, StreamExt};

enum Line {
    Data(String),
    Done,
    Skip,
}

fn parse_line(raw: &[u8]) -> Line {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);

    match line.strip_prefix("data:") {
        Some(data) => {
            let data = data.strip_prefix(' ').unwrap_or(data);
            if data == "[DONE]" {
                Line::Done
            } else {
                Line::Data(data.to_string())
            }
        }
        // comments, `event:`/`id:` fields and blank separators
        None => Line::Skip,
    }
}

struct State<S> {
    bytes: Pin<Box<S>>,
    buffer: Vec<u8>,
    done: bool,
}

/// Turns a body byte stream into the payloads of its `data:` lines.
///
/// Chunks may split lines anywhere, including inside multi-byte characters.
/// The stream ends at `data: [DONE]` or when the body ends.
pub fn data_events<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Send,
{
    let state = State {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line = state.buffer.drain(..=pos).collect::<Vec<_>>();
                match parse_line(&line) {
                    Line::Data(data) => return Some((Ok(data), state)),
                    Line::Done => {
                        state.done = true;
                        return None;
                    }
                    Line::Skip => continue,
                }
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    let rest = std::mem::take(&mut state.buffer);
                    return match parse_line(&rest) {
                        Line::Data(data) => Some((Ok(data), state)),
                        Line::Done | Line::Skip => None,
                    };
                }
            }
        }
    })
}
