// src/client/stream.rs

/// Incremental decoder for the relay's server-sent-event style byte stream.
///
/// Chunks arrive at arbitrary boundaries, so raw bytes are buffered until a
/// newline completes a line; UTF-8 decoding happens per complete line, never
/// mid-chunk, so a multi-byte character split across chunks survives intact.
/// Lines carry `data: ` payloads: either the `[DONE]` sentinel or an
/// OpenAI-shaped completion delta. Anything that does not parse is dropped
/// without disturbing the stream; partial lines at chunk boundaries are
/// expected.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw chunk and returns the content deltas it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(newline_pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=newline_pos).collect();
            let Ok(line) = std::str::from_utf8(&line) else {
                continue;
            };
            let line = line.trim();

            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };
            if payload == "[DONE]" {
                continue;
            }
            let Ok(event) = serde_json::from_str::<serde_json::Value>(payload) else {
                continue;
            };
            if let Some(content) = event["choices"][0]["delta"]["content"].as_str() {
                if !content.is_empty() {
                    deltas.push(content.to_string());
                }
            }
        }
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(chunks: &[&str]) -> String {
        let mut decoder = SseDecoder::new();
        let mut out = String::new();
        for chunk in chunks {
            for delta in decoder.feed(chunk.as_bytes()) {
                out.push_str(&delta);
            }
        }
        out
    }

    #[test]
    fn accumulates_deltas_and_ignores_done() {
        let content = feed_all(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n",
            "data: [DONE]\n",
        ]);
        assert_eq!(content, "Hello world");
    }

    #[test]
    fn invalid_json_line_is_skipped() {
        let content = feed_all(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
            "data: {\"choices\":[{\"del\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n",
        ]);
        assert_eq!(content, "Hello world");
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let content = feed_all(&[
            "data: {\"choices\":[{\"delta\"",
            ":{\"content\":\"Hello\"}}]}\ndata: [DONE]\n",
        ]);
        assert_eq!(content, "Hello");
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let content = feed_all(&[
            "\n: keepalive\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
        ]);
        assert_eq!(content, "ok");
    }

    #[test]
    fn multibyte_character_split_across_chunks_survives() {
        let payload = "data: {\"choices\":[{\"delta\":{\"content\":\"café\"}}]}\n";
        let bytes = payload.as_bytes();
        // Split between the two bytes of the 'é'.
        let split = payload.find('é').unwrap() + 1;

        let mut decoder = SseDecoder::new();
        let mut content = String::new();
        for chunk in [&bytes[..split], &bytes[split..]] {
            for delta in decoder.feed(chunk) {
                content.push_str(&delta);
            }
        }
        assert_eq!(content, "café");
    }

    #[test]
    fn delta_without_content_yields_nothing() {
        let content = feed_all(&["data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n"]);
        assert_eq!(content, "");
    }
}
