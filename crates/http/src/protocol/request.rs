//! HTTP request header handling implementation.
//!
//! This module wraps the standard `http::Request` type together with the outcome of decoding it.
//! A request that could not be decoded still reaches the handler, carrying a
//! [`DecoderResult::Failure`], so the pipeline can answer with an error response instead of
//! dropping the connection in the middle of parsing.

use http::header::CONNECTION;
use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};
use triomphe::Arc;

use crate::protocol::ParseError;

/// Outcome of decoding a request message.
#[derive(Debug, Clone)]
pub enum DecoderResult {
    Success,
    Failure(Arc<ParseError>),
}

impl DecoderResult {
    pub fn failure(cause: ParseError) -> Self {
        DecoderResult::Failure(Arc::new(cause))
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, DecoderResult::Success)
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The parse error that produced this result, if decoding failed.
    pub fn cause(&self) -> Option<&ParseError> {
        match self {
            DecoderResult::Success => None,
            DecoderResult::Failure(cause) => Some(cause),
        }
    }
}

/// Represents an HTTP request header.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - The decode outcome of the message
/// - Keep-alive detection
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
    decoder_result: DecoderResult,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Replaces the decode outcome, used when decoding fails after the start line was accepted.
    #[must_use]
    pub fn with_decoder_result(mut self, decoder_result: DecoderResult) -> Self {
        self.decoder_result = decoder_result;
        self
    }

    pub fn decoder_result(&self) -> &DecoderResult {
        &self.decoder_result
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// Whether the client asked to reuse the connection for a following request.
    ///
    /// `Connection: close` always wins. Otherwise HTTP/1.1 defaults to keep-alive while
    /// older versions need an explicit `Connection: keep-alive`.
    pub fn is_keep_alive(&self) -> bool {
        if self.connection_contains("close") {
            return false;
        }

        match self.version() {
            Version::HTTP_11 => true,
            _ => self.connection_contains("keep-alive"),
        }
    }

    fn connection_contains(&self, token: &str) -> bool {
        self.headers()
            .get_all(CONNECTION)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .any(|item| item.trim().eq_ignore_ascii_case(token))
    }
}

/// Converts request parts into a successfully decoded RequestHeader.
impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()), decoder_result: DecoderResult::Success }
    }
}

/// Converts a bodyless request into a successfully decoded RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner, decoder_result: DecoderResult::Success }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn request(version: Version, connection: Option<&'static str>) -> RequestHeader {
        let mut builder = Request::builder().method(Method::GET).uri("/index.html").version(version);
        if let Some(value) = connection {
            builder = builder.header(CONNECTION, value);
        }
        RequestHeader::from(builder.body(()).unwrap())
    }

    #[test]
    fn keep_alive_follows_version_defaults() {
        assert!(request(Version::HTTP_11, None).is_keep_alive());
        assert!(!request(Version::HTTP_10, None).is_keep_alive());
    }

    #[test]
    fn keep_alive_honors_connection_header() {
        assert!(!request(Version::HTTP_11, Some("close")).is_keep_alive());
        assert!(!request(Version::HTTP_11, Some("Upgrade, Close")).is_keep_alive());
        assert!(request(Version::HTTP_10, Some("Keep-Alive")).is_keep_alive());
        assert!(request(Version::HTTP_11, Some("keep-alive")).is_keep_alive());
    }

    #[test]
    fn decoder_result_defaults_to_success() {
        let header = request(Version::HTTP_11, None);
        assert!(header.decoder_result().is_success());

        let header = header.with_decoder_result(DecoderResult::failure(ParseError::invalid_method("BREW")));
        assert!(header.decoder_result().is_failure());
        assert!(matches!(header.decoder_result().cause(), Some(ParseError::InvalidMethod { .. })));
    }

    #[test]
    fn exposes_headers() {
        let mut header = request(Version::HTTP_11, Some("keep-alive"));
        header.headers_mut().insert(http::header::RANGE, HeaderValue::from_static("bytes=10-"));

        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.uri().path(), "/index.html");
        assert_eq!(header.headers().get(http::header::RANGE), Some(&HeaderValue::from_static("bytes=10-")));
    }
}
