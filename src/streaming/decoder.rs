//! Newline-delimited record reassembly
//!
//! Upstream chunk boundaries fall anywhere, including inside a record or
//! inside a multi-byte UTF-8 sequence. The decoder buffers raw bytes and
//! only cuts at newline positions, so a code point split across two chunks
//! stays intact inside the retained tail until its record completes.

/// Buffer that turns arbitrary byte chunks into complete records.
///
/// After every [`feed`](FrameDecoder::feed) the internal buffer holds only
/// the incomplete tail following the last record separator.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes after the last complete record boundary
    tail: Vec<u8>,
}

impl FrameDecoder {
    /// Create a new empty decoder
    pub fn new() -> Self {
        Self { tail: Vec::new() }
    }

    /// Feed bytes into the decoder and return any complete records.
    ///
    /// Records are newline-terminated; the separator is stripped. Blank
    /// records are dropped. Incomplete trailing data is retained for the
    /// next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.tail.extend_from_slice(bytes);

        let mut records = Vec::new();
        while let Some(pos) = self.tail.iter().position(|&b| b == b'\n') {
            let rest = self.tail.split_off(pos + 1);
            self.tail.pop(); // the newline itself
            let line = std::mem::replace(&mut self.tail, rest);

            let record = String::from_utf8_lossy(&line);
            let record = record.trim();
            if !record.is_empty() {
                records.push(record.to_string());
            }
        }

        records
    }

    /// Consume the decoder at end of stream.
    ///
    /// Upstream may omit the final separator, so a non-blank tail is handed
    /// back as one last record. Whether it parses is the caller's problem;
    /// a truncated tail on abrupt closure is expected.
    pub fn flush(self) -> Option<String> {
        let tail = String::from_utf8_lossy(&self.tail);
        let tail = tail.trim();
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }

    /// Check whether any undelivered bytes remain in the buffer.
    pub fn has_incomplete(&self) -> bool {
        !self.tail.is_empty()
    }
}
