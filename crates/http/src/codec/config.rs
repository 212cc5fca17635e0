//! Limits shared by both directions of the codec.

use thiserror::Error;

/// Configuration of the request decoder, shared by the whole [`ServerCodec`](crate::codec::ServerCodec).
///
/// Defaults mirror the classic limits: `4096` bytes of initial line, `8192` bytes of headers and
/// body items of at most `8192` bytes, with header validation enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    max_initial_line_length: usize,
    max_header_size: usize,
    max_chunk_size: usize,
    validate_headers: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer")]
    ZeroLimit { name: &'static str },
}

impl CodecConfig {
    pub const DEFAULT_MAX_INITIAL_LINE_LENGTH: usize = 4096;
    pub const DEFAULT_MAX_HEADER_SIZE: usize = 8192;
    pub const DEFAULT_MAX_CHUNK_SIZE: usize = 8192;

    pub fn new(max_initial_line_length: usize, max_header_size: usize, max_chunk_size: usize) -> Self {
        Self { max_initial_line_length, max_header_size, max_chunk_size, validate_headers: true }
    }

    #[must_use]
    pub fn with_validate_headers(mut self, validate_headers: bool) -> Self {
        self.validate_headers = validate_headers;
        self
    }

    #[inline]
    pub fn max_initial_line_length(&self) -> usize {
        self.max_initial_line_length
    }

    #[inline]
    pub fn max_header_size(&self) -> usize {
        self.max_header_size
    }

    #[inline]
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    #[inline]
    pub fn validate_headers(&self) -> bool {
        self.validate_headers
    }

    /// Checks that every limit is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_initial_line_length", self.max_initial_line_length),
            ("max_header_size", self.max_header_size),
            ("max_chunk_size", self.max_chunk_size),
        ];

        match limits.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroLimit { name }),
            None => Ok(()),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_INITIAL_LINE_LENGTH, Self::DEFAULT_MAX_HEADER_SIZE, Self::DEFAULT_MAX_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_initial_line_length(), 4096);
        assert_eq!(config.max_header_size(), 8192);
        assert_eq!(config.max_chunk_size(), 8192);
        assert!(config.validate_headers());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_limits() {
        let config = CodecConfig::new(4096, 0, 8192);
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit { name: "max_header_size" }));

        let config = CodecConfig::new(4096, 8192, 0).with_validate_headers(false);
        assert!(!config.validate_headers());
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit { name: "max_chunk_size" }));
    }
}
