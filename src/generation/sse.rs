//! Incremental decoder for `text/event-stream` bodies
//!
//! Raw network chunks are buffered as bytes until a blank line closes an
//! event, so multi-byte characters split across chunks are reassembled
//! before decoding. Carriage returns are dropped, which makes `\r\n`
//! framing equivalent to `\n`.
//!
//! SSE field processing:
//!
//! - `data:` -- collected; multiple lines are joined with `\n`.
//! - `:` comments, `id:`, `event:` and `retry:` -- ignored.
//! - Events without data are discarded.

use bytes::BytesMut;

/// Buffers SSE bytes and yields complete `data:` payloads
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning payloads of the events it completes
    ///
    /// # Examples
    ///
    /// ```
    /// use educador_ia::generation::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.push(b"data: par").is_empty());
    /// assert_eq!(decoder.push(b"tial\n\n"), vec!["partial".to_string()]);
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));

        let mut payloads = Vec::new();

        // Events are separated by blank lines (`\n\n`).
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block = self.buffer.split_to(pos + 2);
            let text = String::from_utf8_lossy(&block[..pos]);
            if let Some(data) = event_data(&text) {
                payloads.push(data);
            }
        }

        payloads
    }

    /// Flush a trailing event that was not closed by a blank line
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let block = std::mem::take(&mut self.buffer);
        event_data(&String::from_utf8_lossy(&block))
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn event_data(block: &str) -> Option<String> {
    let data_lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: {\"a\":1}\n\n");
        assert_eq!(payloads, vec![r#"{"a":1}"#.to_string()]);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_two_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: first\n\ndata: second\n\n");
        assert_eq!(payloads, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert!(decoder.push(b"lo\n").is_empty());
        assert_eq!(decoder.push(b"\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn test_crlf_framing() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(payloads, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let bytes = "data: ação\n\n".as_bytes();
        // Split inside the two-byte 'ç'
        let split = "data: a".len() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), vec!["ação".to_string()]);
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: line1\ndata: line2\n\n");
        assert_eq!(payloads, vec!["line1\nline2".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b": keep-alive\n\nid: 7\nevent: message\nretry: 10\ndata: x\n\n");
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_empty_data_discarded() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data:\n\n").is_empty());
    }
}
