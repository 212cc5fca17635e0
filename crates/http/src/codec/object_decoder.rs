//! Generic HTTP message decoder.
//!
//! [`HttpObjectDecoder`] drives the header and payload decoders as a small state machine. It
//! does not know how a request value is built: the caller supplies two factories, one turning a
//! tokenized start line into a request and one producing a stand-in request when the input
//! cannot be parsed at all.
//!
//! A message that fails to parse is still delivered, built by the invalid-message factory, so
//! the caller can answer it. Everything received after it on the same connection is discarded.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::codec::CodecConfig;
use crate::codec::body::PayloadDecoder;
use crate::codec::header::{HeaderDecoder, RequestLine};
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

#[derive(Debug)]
enum State {
    ReadHeader,
    Payload(PayloadDecoder),
    BadMessage,
}

/// A request decoder parameterized by its message factories.
///
/// - `C` builds the request from the start line, see [`HeaderDecoder`]
/// - `I` builds the stand-in request from the parse failure
pub struct HttpObjectDecoder<C, I> {
    header_decoder: HeaderDecoder<C>,
    create_invalid_message: I,
    state: State,
}

impl<C, I> HttpObjectDecoder<C, I>
where
    C: Fn(RequestLine<'_>) -> Result<RequestHeader, ParseError>,
    I: Fn(ParseError) -> RequestHeader,
{
    pub fn new(config: CodecConfig, create_message: C, create_invalid_message: I) -> Self {
        Self { header_decoder: HeaderDecoder::new(config, create_message), create_invalid_message, state: State::ReadHeader }
    }

    pub fn config(&self) -> &CodecConfig {
        self.header_decoder.config()
    }

    /// Returns true once a malformed message was seen, the remaining input is then ignored.
    pub fn is_bad_message(&self) -> bool {
        matches!(self.state, State::BadMessage)
    }

    fn invalid_message(&mut self, cause: ParseError, src: &mut BytesMut) -> Message<(RequestHeader, PayloadSize)> {
        warn!(cause = %cause, discarded = src.len(), "malformed request, discarding the rest of the connection input");
        src.clear();
        self.state = State::BadMessage;
        Message::Header(((self.create_invalid_message)(cause), PayloadSize::Empty))
    }
}

impl<C, I> Decoder for HttpObjectDecoder<C, I>
where
    C: Fn(RequestLine<'_>) -> Result<RequestHeader, ParseError>,
    I: Fn(ParseError) -> RequestHeader,
{
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    /// Decodes the next header or payload item.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: a request head, possibly the invalid stand-in
    /// - `Ok(Some(Message::Payload(_)))`: a body item, `Eof` ends the current request
    /// - `Ok(None)`: more data is needed, or the input is being discarded
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.state {
            State::BadMessage => {
                src.clear();
                Ok(None)
            }

            State::Payload(payload_decoder) => {
                let message = match payload_decoder.decode(src)? {
                    Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                    Some(item @ PayloadItem::Eof) => {
                        self.state = State::ReadHeader;
                        Some(Message::Payload(item))
                    }
                    None => None,
                };
                Ok(message)
            }

            State::ReadHeader => match self.header_decoder.decode(src) {
                Ok(Some((header, payload_size))) => {
                    debug!(method = %header.method(), uri = %header.uri(), payload_size = ?payload_size, "decoded request header");
                    let max_chunk_size = self.header_decoder.config().max_chunk_size();
                    self.state = State::Payload(PayloadDecoder::from_size(payload_size, max_chunk_size));
                    Ok(Some(Message::Header((header, payload_size))))
                }
                Ok(None) => Ok(None),
                Err(cause) => Ok(Some(self.invalid_message(cause, src))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RequestDecoder;
    use http::{Method, Version};
    use indoc::indoc;

    fn expect_header(message: Option<Message<(RequestHeader, PayloadSize)>>) -> (RequestHeader, PayloadSize) {
        match message {
            Some(Message::Header(header)) => header,
            Some(Message::Payload(item)) => panic!("expected header, got payload {item:?}"),
            None => panic!("expected header, got nothing"),
        }
    }

    #[test]
    fn decodes_pipelined_requests() {
        let str = indoc! {r##"
        GET /a.txt HTTP/1.1
        Host: localhost

        GET /b.txt HTTP/1.1
        Host: localhost

        "##};

        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from(str);

        let (header, _) = expect_header(decoder.decode(&mut buf).unwrap());
        assert_eq!(header.uri().path(), "/a.txt");
        assert!(decoder.decode(&mut buf).unwrap().unwrap().into_payload_item().unwrap().is_eof());

        let (header, _) = expect_header(decoder.decode(&mut buf).unwrap());
        assert_eq!(header.uri().path(), "/b.txt");
        assert!(decoder.decode(&mut buf).unwrap().unwrap().into_payload_item().unwrap().is_eof());

        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn malformed_request_becomes_invalid_message() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("NOT A REQUEST\r\n\r\nGET /a.txt HTTP/1.1\r\n\r\n");

        let (header, payload_size) = expect_header(decoder.decode(&mut buf).unwrap());

        assert!(header.decoder_result().is_failure());
        assert!(header.decoder_result().cause().is_some());
        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.uri().path(), "/bad-request");
        assert_eq!(header.version(), Version::HTTP_10);
        assert!(!header.is_keep_alive());
        assert!(payload_size.is_empty());

        // nothing after a malformed message is decoded
        assert!(buf.is_empty());
        buf.extend_from_slice(b"GET /b.txt HTTP/1.1\r\n\r\n");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn chunked_request_becomes_invalid_message() {
        let str = indoc! {r##"
        POST /upload HTTP/1.1
        Transfer-Encoding: chunked

        5
        hello
        0

        "##};

        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from(str);

        let (header, _) = expect_header(decoder.decode(&mut buf).unwrap());
        assert!(matches!(header.decoder_result().cause(), Some(ParseError::ChunkedNotSupported)));
        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn limits_produce_invalid_message() {
        let mut decoder = RequestDecoder::with_config(CodecConfig::new(8, 8192, 8192));
        let mut buf = BytesMut::from("GET /longer-than-eight HTTP/1.1\r\n\r\n");

        let (header, _) = expect_header(decoder.decode(&mut buf).unwrap());
        assert!(matches!(header.decoder_result().cause(), Some(ParseError::TooLongInitialLine { max_size: 8 })));
    }

    #[test]
    fn splits_body_by_max_chunk_size() {
        let mut decoder = RequestDecoder::with_config(CodecConfig::new(4096, 8192, 4));
        let mut buf = BytesMut::from("POST /upload HTTP/1.1\r\nContent-Length: 10\r\n\r\n0123456789");

        let (_, payload_size) = expect_header(decoder.decode(&mut buf).unwrap());
        assert_eq!(payload_size, PayloadSize::Length(10));

        let mut chunks = vec![];
        loop {
            match decoder.decode(&mut buf).unwrap().and_then(Message::into_payload_item) {
                Some(PayloadItem::Chunk(bytes)) => chunks.push(bytes),
                Some(PayloadItem::Eof) => break,
                None => panic!("body should be complete"),
            }
        }

        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![4, 4, 2]);
        assert_eq!(chunks.concat(), b"0123456789");
    }

    #[test]
    fn waits_for_partial_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\nab");

        expect_header(decoder.decode(&mut buf).unwrap());
        assert!(decoder.decode(&mut buf).unwrap().unwrap().is_payload());
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"cd");
        assert!(decoder.decode(&mut buf).unwrap().is_some());
        assert!(decoder.decode(&mut buf).unwrap().unwrap().into_payload_item().unwrap().is_eof());
    }
}
