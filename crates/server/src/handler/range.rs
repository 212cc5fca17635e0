//! `Range` header handling.
//!
//! Only the start offset of a `bytes=<start>-` range is honored. Whatever follows the dash is
//! ignored and the served window always runs to the end of the file. A start that cannot be
//! parsed, or that lies beyond the file, is taken as `0`.

use tracing::debug;

/// The window of a file served as partial content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Computes the window for a `Range` header value against a file of `file_length` bytes.
    ///
    /// Returns `None` for an empty file, which has no byte to start from.
    pub fn from_header(value: &str, file_length: u64) -> Option<Self> {
        if file_length == 0 {
            return None;
        }

        let start = match parse_start(value) {
            Some(start) if start < file_length => start,
            // served whole as 206 rather than refused, there is no 416 here
            Some(start) => {
                debug!(start, file_length, "range starts beyond the file, serving from 0");
                0
            }
            None => {
                debug!(range = value, "malformed range, serving from 0");
                0
            }
        };

        let end = start.saturating_add(file_length).min(file_length - 1);
        Some(Self { start, end })
    }

    /// Offset of the first byte served.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Offset of the last byte served, inclusive.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn chunk_size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// The `Content-Range` value describing this window.
    pub fn content_range(&self, file_length: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_length)
    }
}

fn parse_start(value: &str) -> Option<u64> {
    let value = value.trim();
    let ranges = value.strip_prefix("bytes=").unwrap_or(value);
    ranges.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_range() {
        let range = ByteRange::from_header("bytes=100-", 1000).unwrap();
        assert_eq!(range.start(), 100);
        assert_eq!(range.end(), 999);
        assert_eq!(range.chunk_size(), 900);
        assert_eq!(range.content_range(1000), "bytes 100-999/1000");
    }

    #[test]
    fn end_offset_is_ignored() {
        let range = ByteRange::from_header("bytes=100-199", 1000).unwrap();
        assert_eq!(range, ByteRange::from_header("bytes=100-", 1000).unwrap());
        assert_eq!(range.chunk_size(), 900);
    }

    #[test]
    fn malformed_start_serves_from_zero() {
        let zero = ByteRange::from_header("bytes=0-", 500).unwrap();
        assert_eq!(zero.start(), 0);
        assert_eq!(zero.chunk_size(), 500);

        for value in ["bytes=abc-", "bytes=-500", "items=1-2", "bytes=1.5-", "bytes=-", "garbage"] {
            assert_eq!(ByteRange::from_header(value, 500), Some(zero), "{value}");
        }
    }

    #[test]
    fn tolerates_whitespace_and_missing_unit() {
        assert_eq!(ByteRange::from_header("  bytes= 10 -  ", 100).unwrap().start(), 10);
        assert_eq!(ByteRange::from_header("10-", 100).unwrap().start(), 10);
    }

    #[test]
    fn start_beyond_file_serves_from_zero() {
        let range = ByteRange::from_header("bytes=100-", 100).unwrap();
        assert_eq!(range.start(), 0);
        assert_eq!(range.end(), 99);
        assert_eq!(range.chunk_size(), 100);

        let range = ByteRange::from_header("bytes=9999999-", 5_000_000).unwrap();
        assert_eq!(range.content_range(5_000_000), "bytes 0-4999999/5000000");
    }

    #[test]
    fn last_byte() {
        let range = ByteRange::from_header("bytes=99-", 100).unwrap();
        assert_eq!(range.chunk_size(), 1);
        assert_eq!(range.content_range(100), "bytes 99-99/100");
    }

    #[test]
    fn empty_file_has_no_range() {
        assert_eq!(ByteRange::from_header("bytes=0-", 0), None);
    }
}
