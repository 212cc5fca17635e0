use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a payload whose length was already declared in the response head.
///
/// Bytes may also reach the peer without passing through the encoder, as with a file-region
/// transfer; those are accounted through [`LengthEncoder::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    /// Records `n` bytes that were written to the peer out of band.
    pub fn advance(&mut self, n: u64) -> Result<(), SendError> {
        if n > self.length {
            return Err(SendError::invalid_body(format!("{n} bytes sent but only {} remained of content-length", self.length)));
        }
        self.length -= n;
        Ok(())
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }
                if self.length == 0 {
                    warn!("encode payload_item but no need to encode anymore");
                }
                self.advance(bytes.remaining() as u64)?;
                dst.put(bytes);
                Ok(())
            }
            PayloadItem::Eof if self.length == 0 => Ok(()),
            PayloadItem::Eof => Err(SendError::invalid_body(format!("response ended {} bytes short of content-length", self.length))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn writes_declared_bytes() {
        let mut encoder = LengthEncoder::new(5);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hel")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"lo")), &mut dst).unwrap();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();

        assert_eq!(&dst[..], b"hello");
    }

    #[test]
    fn rejects_overflow_and_short_body() {
        let mut dst = BytesMut::new();

        let mut encoder = LengthEncoder::new(2);
        assert!(encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"abc")), &mut dst).is_err());

        let mut encoder = LengthEncoder::new(2);
        assert!(encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).is_err());
    }

    #[test]
    fn accounts_out_of_band_bytes() {
        let mut encoder = LengthEncoder::new(10);
        encoder.advance(6).unwrap();
        assert!(encoder.advance(5).is_err());
        encoder.advance(4).unwrap();

        let mut dst = BytesMut::new();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        assert!(dst.is_empty());
    }
}
