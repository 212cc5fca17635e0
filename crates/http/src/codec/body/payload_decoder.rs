//! Decoder implementation for HTTP message payloads.
//!
//! Handles the two body kinds a request may carry:
//! - Content-Length based payloads
//! - Messages with no body

use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Handle messages with no body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for a fixed-length payload emitted in items of at most
    /// `max_chunk_size` bytes.
    pub fn fix_length(size: u64, max_chunk_size: usize) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size, max_chunk_size)) }
    }

    pub fn from_size(payload_size: PayloadSize, max_chunk_size: usize) -> Self {
        match payload_size {
            PayloadSize::Length(size) => Self::fix_length(size, max_chunk_size),
            PayloadSize::Empty => Self::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Delegates to the length decoder, or returns EOF immediately for no-body messages
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}
