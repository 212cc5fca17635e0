//! HTTP request decoder module
//!
//! [`RequestDecoder`] is the [`HttpObjectDecoder`] wired with the request factories of this
//! crate. Chunked request bodies are refused: such a request is answered like any other
//! malformed one.
//!
//! # Example
//!
//! ```no_run
//! use sendfile_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::new();
//! // ... add request data to buffer ...
//! let result = decoder.decode(&mut buffer);
//! ```

use crate::codec::CodecConfig;
use crate::codec::header::RequestLine;
use crate::codec::object_decoder::HttpObjectDecoder;
use crate::protocol::{DecoderResult, Message, ParseError, PayloadSize, RequestHeader};
use bytes::BytesMut;
use http::{Method, Request, Uri, Version};
use tokio_util::codec::Decoder;

type CreateMessage = fn(RequestLine<'_>) -> Result<RequestHeader, ParseError>;
type CreateInvalidMessage = fn(ParseError) -> RequestHeader;

/// Path of the stand-in request built for input that could not be parsed.
pub const BAD_REQUEST_PATH: &str = "/bad-request";

/// A decoder for HTTP requests that handles both headers and payload
pub struct RequestDecoder {
    inner: HttpObjectDecoder<CreateMessage, CreateInvalidMessage>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` with the default limits
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { inner: HttpObjectDecoder::new(config, create_request as CreateMessage, create_invalid_request as CreateInvalidMessage) }
    }

    pub fn config(&self) -> &CodecConfig {
        self.inner.config()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_config(CodecConfig::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    #[inline]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.inner.decode(src)
    }
}

/// Builds a request from its start line, a method or target `http` refuses fails the message.
pub(crate) fn create_request(line: RequestLine<'_>) -> Result<RequestHeader, ParseError> {
    let method = Method::from_bytes(line.method.as_bytes()).map_err(ParseError::invalid_method)?;
    let uri = line.target.parse::<Uri>().map_err(ParseError::invalid_uri)?;

    let mut request = Request::new(());
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.version_mut() = line.version;
    Ok(request.into())
}

/// Builds the `GET /bad-request HTTP/1.0` stand-in carrying the parse failure.
fn create_invalid_request(cause: ParseError) -> RequestHeader {
    let mut request = Request::new(());
    *request.method_mut() = Method::GET;
    *request.uri_mut() = Uri::from_static(BAD_REQUEST_PATH);
    *request.version_mut() = Version::HTTP_10;
    RequestHeader::from(request).with_decoder_result(DecoderResult::failure(cause))
}
