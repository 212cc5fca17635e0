//! HTTP header processing module for encoding and decoding headers
//!
//! - [`HeaderDecoder`]: Decodes request start line and headers from raw bytes
//!   - Builds the request through a message factory supplied at construction
//!   - Enforces the initial line and header block limits
//!   - Optionally validates header values
//!
//! - [`HeaderEncoder`]: Encodes response status line and headers to bytes
//!   - Always declares `Content-Length`

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::RequestLine;
pub use header_encoder::HeaderEncoder;
