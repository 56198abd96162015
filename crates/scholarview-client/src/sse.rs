//! Server-sent-event framing over an async byte reader

use futures_util::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::ClientError;
use crate::wire::StreamEvent;

/// Line-oriented SSE frame decoder.
///
/// `data:` lines accumulate until a blank line dispatches them as one
/// payload. Comments (`:`) and the `event`, `id`, `retry` fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    data: String,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line without its terminator. Returns a payload when an event completes.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            if !self.has_data {
                return None;
            }
            self.has_data = false;
            return Some(std::mem::take(&mut self.data));
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            if self.has_data {
                self.data.push('\n');
            }
            self.data.push_str(value);
            self.has_data = true;
        }
        None
    }
}

/// Decode a reader into a stream of [`StreamEvent`]s.
///
/// The stream ends at EOF; an event left unterminated at EOF is discarded.
/// Read failures are yielded once as [`ClientError::Stream`] and end the stream.
pub fn event_stream<R>(reader: R) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let state = (reader.lines(), SseDecoder::new(), false);
    futures_util::stream::unfold(state, |(mut lines, mut decoder, failed)| async move {
        if failed {
            return None;
        }
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(payload) = decoder.push_line(&line) {
                        return Some((StreamEvent::parse(&payload), (lines, decoder, false)));
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    let err = ClientError::Stream(format!("stream connection failed: {e}"));
                    return Some((Err(err), (lines, decoder, true)));
                }
            }
        }
    })
}
