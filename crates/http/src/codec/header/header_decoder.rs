//! HTTP header decoder implementation for parsing HTTP request headers
//!
//! This module turns raw bytes into a structured [`RequestHeader`]. The start line is tokenized
//! by `httparse` and handed to a message factory supplied at construction, so the decoder itself
//! does not decide how a request value is built.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum initial line length and header block size: taken from [`CodecConfig`]
//! - Only supports HTTP/1.0 and HTTP/1.1 (HTTP/2 and HTTP/3 currently not supported)
//! - `Transfer-Encoding: chunked` is refused, payloads are length-delimited or absent
//!
//! # Implementation Details
//!
//! The decoder works in multiple stages:
//!
//! 1. Check the initial line against its length limit, even before it is complete
//! 2. Parse raw bytes using `httparse`
//! 3. Build the request through the message factory
//! 4. Record header name/value byte ranges and attach them without copying
//! 5. Determine the payload size based on headers

use bytes::{Buf, Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::CodecConfig;
use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// The tokenized start line of a request, handed to the message factory.
#[derive(Debug, Clone, Copy)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: Version,
}

/// Decoder for HTTP request headers implementing the [`Decoder`] trait.
///
/// `C` builds the request value from the start line. The decoder attaches the parsed headers
/// afterwards.
///
/// With header validation enabled a malformed header line fails the request. Without it the
/// parser is lenient: malformed header lines are dropped and runs of spaces are accepted between
/// the parts of the request line.
pub struct HeaderDecoder<C> {
    config: CodecConfig,
    parser_config: httparse::ParserConfig,
    create_message: C,
}

impl<C> HeaderDecoder<C>
where
    C: Fn(RequestLine<'_>) -> Result<RequestHeader, ParseError>,
{
    pub fn new(config: CodecConfig, create_message: C) -> Self {
        let mut parser_config = httparse::ParserConfig::default();
        if !config.validate_headers() {
            parser_config.ignore_invalid_headers_in_requests(true).allow_multiple_spaces_in_request_line_delimiters(true);
        }
        Self { config, parser_config, create_message }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Enforces the initial line limit and returns the offset right after its line terminator.
    ///
    /// Returns `Ok(None)` while the line is still incomplete.
    fn check_initial_line(&self, src: &[u8]) -> Result<Option<usize>, ParseError> {
        let max_size = self.config.max_initial_line_length();
        match src.iter().position(|b| *b == b'\n') {
            Some(newline) => {
                let line_length = if newline > 0 && src[newline - 1] == b'\r' { newline - 1 } else { newline };
                ensure!(line_length <= max_size, ParseError::too_long_initial_line(max_size));
                Ok(Some(newline + 1))
            }
            None => {
                // a trailing CR may still become part of the line terminator
                let pending = src.strip_suffix(b"\r").unwrap_or(src).len();
                ensure!(pending <= max_size, ParseError::too_long_initial_line(max_size));
                Ok(None)
            }
        }
    }

    fn header_value(&self, header_bytes: &Bytes, index: &HeaderIndex) -> Result<HeaderValue, ParseError> {
        let value = header_bytes.slice(index.value.0..index.value.1);
        if self.config.validate_headers() {
            HeaderValue::from_maybe_shared(value).map_err(ParseError::invalid_header)
        } else {
            // SAFETY: httparse only accepts header values made of visible ASCII, obs-text, spaces
            // and tabs, which are all valid `HeaderValue` bytes
            Ok(unsafe { HeaderValue::from_maybe_shared_unchecked(value) })
        }
    }
}

impl<C> Decoder for HeaderDecoder<C>
where
    C: Fn(RequestLine<'_>) -> Result<RequestHeader, ParseError>,
{
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode HTTP headers from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((header, payload_size)))` if a complete header was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The initial line or the header block exceed their configured limits
    /// - The number of headers exceeds `MAX_HEADER_NUM`
    /// - The HTTP version is not supported
    /// - The message factory refuses the start line
    /// - Headers contain invalid characters (with header validation on)
    /// - The request uses chunked transfer-encoding
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // empty lines received before the request line are ignored (RFC 9112 section 2.2)
        let leading_empty_lines = src.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
        src.advance(leading_empty_lines);

        let Some(line_end) = self.check_initial_line(src)? else {
            return Ok(None);
        };

        let max_header_size = self.config.max_header_size();
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        // Parse request headers using httparse, return error if exceeds max headers or invalid format
        let parsed_result = self.parser_config.parse_request(&mut req, src.as_ref()).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(header_size = body_offset, "parsed request header");
                let header_size = body_offset - line_end;
                ensure!(header_size <= max_header_size, ParseError::too_large_header(header_size, max_header_size));

                // Currently HTTP/2 and HTTP/3 not supported
                let version = match req.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    v => return Err(ParseError::InvalidVersion(v)),
                };

                let line = RequestLine {
                    method: req.method.ok_or_else(|| ParseError::invalid_method("missing method"))?,
                    target: req.path.ok_or_else(|| ParseError::invalid_uri("missing request target"))?,
                    version,
                };
                let mut header = (self.create_message)(line)?;

                // Calculate and record byte range indices for each header
                let header_count = req.headers.len();
                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                HeaderIndex::record(src, req.headers, &mut header_index);

                // Split header portion from source buffer
                let header_bytes = src.split_to(body_offset).freeze();

                let headers = header.headers_mut();
                headers.reserve(header_count);
                for index in &header_index[..header_count] {
                    let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1]).map_err(ParseError::invalid_header)?;
                    let value = self.header_value(&header_bytes, index)?;
                    headers.append(name, value);
                }

                let payload_size = parse_payload(&header)?;
                Ok(Some((header, payload_size)))
            }
            // If parsing incomplete, ensure the header block received so far does not exceed limit
            Status::Partial => {
                let header_size = src.len() - line_end;
                ensure!(header_size <= max_header_size, ParseError::too_large_header(header_size, max_header_size));
                Ok(None)
            }
        }
    }
}

/// Stores the byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    /// Start and end byte positions of the header name
    pub(crate) name: (usize, usize),
    /// Start and end byte positions of the header value
    pub(crate) value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines the payload size from the request headers.
///
/// Any `Transfer-Encoding` naming `chunked` is refused; other transfer codings without a
/// length leave the request without a body.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The request is chunked
/// - Both Content-Length and Transfer-Encoding headers are present
/// - Content-Length value is invalid
fn parse_payload(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding
    let te_header = header.headers().get(TRANSFER_ENCODING);
    let cl_header = header.headers().get(CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_empty()),

        (Some(te_value), None) => {
            if is_chunked(te_value) {
                Err(ParseError::ChunkedNotSupported)
            } else {
                Ok(PayloadSize::new_empty())
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(ParseError::invalid_content_length)?.trim();

            // `u64::from_str` would also take a leading `+`
            ensure!(
                !cl_str.is_empty() && cl_str.bytes().all(|b| b.is_ascii_digit()),
                ParseError::invalid_content_length(format!("value {cl_str} is not a decimal length"))
            );
            let length = cl_str.parse::<u64>().map_err(|e| ParseError::invalid_content_length(format!("value {cl_str} is not u64: {e}")))?;

            Ok(PayloadSize::new_length(length))
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}

/// Checks if any coding in the Transfer-Encoding header is chunked.
fn is_chunked(header_value: &HeaderValue) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    header_value.as_bytes().split(|b| *b == b',').any(|coding| coding.trim_ascii().eq_ignore_ascii_case(CHUNKED))
}
