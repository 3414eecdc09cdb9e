//! CRLF line framing.
//!
//! Transport reads arrive with arbitrary boundaries. [`LineFramer`] buffers
//! bytes until a `\r\n` is seen and only then hands out the line, so a split
//! in the middle of a tag, a multi-byte character, or the terminator itself is
//! invisible to the parser.

const CRLF: &[u8] = b"\r\n";

/// Accumulates raw bytes and yields complete IRC lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line completed by it, in arrival order,
    /// with the terminator stripped. The unterminated tail stays buffered.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        // A terminator may straddle the previous chunk's last byte.
        let mut scan_from = self.buf.len().saturating_sub(1);
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut line_start = 0;
        while let Some(pos) = find_crlf(&self.buf[scan_from..]) {
            let end = scan_from + pos;
            lines.push(String::from_utf8_lossy(&self.buf[line_start..end]).into_owned());
            line_start = end + CRLF.len();
            scan_from = line_start;
        }

        if line_start > 0 {
            self.buf.drain(..line_start);
        }
        lines
    }

    /// Bytes buffered without a terminator yet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn find_crlf(haystack: &[u8]) -> Option<usize> {
    haystack.windows(CRLF.len()).position(|w| w == CRLF)
}
