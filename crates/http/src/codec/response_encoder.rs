use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadItem, PayloadSize, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio_util::codec::Encoder;
use tracing::error;

/// Encodes a response head followed by its length-delimited payload.
///
/// A response ends with [`PayloadItem::Eof`], which fails when fewer bytes than declared were
/// written. Bytes written to the transport directly, by a file-region transfer, are reported
/// with [`ResponseEncoder::advance`].
#[derive(Debug)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true between a response head and its terminal marker.
    pub fn is_in_response(&self) -> bool {
        self.payload_encoder.is_some()
    }

    /// Accounts `n` payload bytes of the current response written out of band.
    pub fn advance(&mut self, n: u64) -> Result<(), SendError> {
        match &mut self.payload_encoder {
            Some(payload_encoder) => payload_encoder.advance(n),
            None => {
                error!(bytes = n, "payload bytes sent without response header");
                Err(io::Error::from(ErrorKind::InvalidInput).into())
            }
        }
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl<D: Buf> Encoder<Message<(ResponseHead, PayloadSize), D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.payload_encoder = Some(PayloadEncoder::from_size(payload_size));
                self.header_encoder.encode((head, payload_size), dst)
            }

            Message::Payload(PayloadItem::Eof) => match self.payload_encoder.take() {
                Some(mut payload_encoder) => payload_encoder.encode(PayloadItem::<D>::Eof, dst),
                None => {
                    error!("expect response header but receive payload eof");
                    Err(io::Error::from(ErrorKind::InvalidInput).into())
                }
            },

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect response header but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                payload_encoder.encode(payload_item, dst)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Response, StatusCode};

    fn head(status: StatusCode) -> ResponseHead {
        Response::builder().status(status).body(()).unwrap()
    }

    #[test]
    fn encodes_full_response() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Message::<_, Bytes>::Header((head(StatusCode::NOT_FOUND), PayloadSize::Length(5))), &mut dst).unwrap();
        assert!(encoder.is_in_response());
        encoder.encode(Message::<(ResponseHead, PayloadSize)>::from(Bytes::from_static(b"oops\n")), &mut dst).unwrap();
        encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();
        assert!(!encoder.is_in_response());

        let encoded = String::from_utf8(dst.to_vec()).unwrap();
        assert!(encoded.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(encoded.contains("content-length: 5\r\n"));
        assert!(encoded.ends_with("\r\n\r\noops\n"));
    }

    #[test]
    fn eof_fails_when_body_is_short() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Message::<_, Bytes>::Header((head(StatusCode::OK), PayloadSize::Length(10))), &mut dst).unwrap();
        encoder.advance(4).unwrap();

        let result = encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));

        // the failed response is finished anyway, a new head may follow
        assert!(!encoder.is_in_response());
    }

    #[test]
    fn advance_completes_body() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(Message::<_, Bytes>::Header((head(StatusCode::PARTIAL_CONTENT), PayloadSize::Length(10))), &mut dst).unwrap();
        let head_len = dst.len();
        encoder.advance(10).unwrap();
        encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(dst.len(), head_len);
    }

    #[test]
    fn rejects_out_of_order_messages() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        assert!(encoder.advance(1).is_err());
        assert!(encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst).is_err());

        encoder.encode(Message::<_, Bytes>::Header((head(StatusCode::OK), PayloadSize::Length(1))), &mut dst).unwrap();
        assert!(encoder.encode(Message::<_, Bytes>::Header((head(StatusCode::OK), PayloadSize::Length(1))), &mut dst).is_err());
    }
}
