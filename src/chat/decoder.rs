//! Line framing for a chunked response body.
//!
//! Chunks arrive with arbitrary boundaries: a single line can span
//! several chunks and a chunk can end in the middle of a multi-byte
//! UTF-8 character. Bytes are buffered until a `\n` is seen so that
//! only complete lines are ever decoded as text.

#[derive(Default, Debug)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Append a chunk and return every line it completed, in order.
    /// The trailing partial line stays buffered for the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            lines.push(decode_line(&self.buffer[start..end]));
            start = end + 1;
        }
        self.buffer.drain(..start);

        lines
    }

    /// Flush whatever is left once the stream has ended. Returns
    /// `None` when the stream ended on a line boundary.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
