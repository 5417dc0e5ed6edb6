/// Split raw bytes on `\n`, dropping empty lines.
pub fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|&b| b == b'\n').filter(|line| !line.is_empty())
}

/// Largest unterminated line kept between polls.
pub const DEFAULT_MAX_PENDING: usize = 64 * 1024 * 1024;

/// Holds the unterminated tail of the data read so far.
///
/// A writer may be caught mid-line; those bytes stay here until the line
/// feed arrives in a later chunk. A tail longer than the limit is dropped,
/// and whatever remains of that line fails to parse and is skipped.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_pending: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_PENDING)
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending,
        }
    }

    /// Append `chunk` and return every complete line seen so far
    /// (up to and including the last `\n`). The remainder stays pending.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(chunk);
        let complete = match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(pos) => {
                let rest = self.pending.split_off(pos + 1);
                std::mem::replace(&mut self.pending, rest)
            }
            None => Vec::new(),
        };
        if self.pending.len() > self.max_pending {
            tracing::warn!(
                len = self.pending.len(),
                limit = self.max_pending,
                "unterminated line exceeds limit, dropping it"
            );
            self.pending = Vec::new();
        }
        complete
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_empty_lines() {
        let lines: Vec<&[u8]> = split_lines(b"a\n\nb\n\n").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn split_keeps_unterminated_last_line() {
        let lines: Vec<&[u8]> = split_lines(b"a\nb").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn push_holds_partial_line_until_newline() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"{\"type\":").is_empty());
        assert_eq!(buf.pending_len(), 8);

        let complete = buf.push(b"\"x\"}\n{\"ty");
        assert_eq!(complete, b"{\"type\":\"x\"}\n");
        assert_eq!(buf.pending_len(), 4);

        let complete = buf.push(b"pe\":\"y\"}\n");
        assert_eq!(complete, b"{\"type\":\"y\"}\n");
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn runaway_partial_line_is_dropped() {
        let mut buf = LineBuffer::with_limit(8);
        assert!(buf.push(b"0123456789").is_empty());
        assert_eq!(buf.pending_len(), 0);

        // Tail of the dropped line arrives with the next good one.
        let complete = buf.push(b"abc\n{\"a\":1}\n");
        assert_eq!(complete, b"abc\n{\"a\":1}\n");
        let lines: Vec<&[u8]> = split_lines(&complete).collect();
        assert_eq!(lines[1], b"{\"a\":1}");
    }

    #[test]
    fn complete_lines_are_kept_even_past_limit() {
        let mut buf = LineBuffer::with_limit(4);
        let complete = buf.push(b"a long complete line\npart");
        assert_eq!(complete, b"a long complete line\n");
        assert_eq!(buf.pending_len(), 4);
    }
}
