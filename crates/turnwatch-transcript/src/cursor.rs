use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Byte offset into a growing rollout file.
///
/// The offset only moves forward and never passes the file size observed
/// by the poll that advanced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailCursor {
    offset: u64,
}

impl TailCursor {
    pub fn new(offset: u64) -> Self {
        Self { offset }
    }

    /// Start at the current end of file so existing content is skipped.
    pub fn at_end(path: &Path) -> io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        Ok(Self::new(size))
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the bytes appended since the last poll.
    ///
    /// Returns `Ok(None)` when the file has not grown. A file that shrank
    /// below the offset (truncation or rotation) also yields `None`; the
    /// offset is left where it is.
    pub fn poll(&mut self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        let size = std::fs::metadata(path)?.len();
        if size <= self.offset {
            if size < self.offset {
                tracing::debug!(
                    path = %path.display(),
                    size,
                    offset = self.offset,
                    "file shrank below cursor, waiting for growth"
                );
            }
            return Ok(None);
        }

        let mut file = std::fs::File::open(path)?;
        file.seek(SeekFrom::Start(self.offset))?;

        let wanted = size - self.offset;
        let mut buf = Vec::with_capacity(wanted as usize);
        file.take(wanted).read_to_end(&mut buf)?;

        // Short read only if the file shrank between stat and read.
        self.offset += buf.len() as u64;
        if buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(buf))
    }
}
