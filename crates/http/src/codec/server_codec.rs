//! The server side of an HTTP/1.1 connection as a single codec.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{CodecConfig, RequestDecoder, ResponseEncoder};
use crate::protocol::{Message, ParseError, PayloadSize, RequestHeader, ResponseMessage, SendError};

/// Decodes requests and encodes responses behind one [`Decoder`] + [`Encoder`], so that a
/// connection can be driven by a single `Framed` stream.
pub struct ServerCodec {
    decoder: RequestDecoder,
    encoder: ResponseEncoder,
}

impl ServerCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { decoder: RequestDecoder::with_config(config), encoder: ResponseEncoder::new() }
    }

    pub fn config(&self) -> &CodecConfig {
        self.decoder.config()
    }

    pub fn encoder(&self) -> &ResponseEncoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut ResponseEncoder {
        &mut self.encoder
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Decoder for ServerCodec {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    #[inline]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }
}

impl<D: Buf> Encoder<ResponseMessage<D>> for ServerCodec {
    type Error = SendError;

    #[inline]
    fn encode(&mut self, item: ResponseMessage<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode(item, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::{SinkExt, StreamExt};
    use http::{Response, StatusCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_util::codec::Framed;

    #[tokio::test]
    async fn framed_round_trip() {
        let (client, server) = tokio::io::duplex(1024);
        let mut framed = Framed::new(server, ServerCodec::default());
        let (mut client_read, mut client_write) = tokio::io::split(client);

        client_write.write_all(b"GET /hello.txt HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

        let Some(Ok(Message::Header((header, _)))) = framed.next().await else { panic!("expected request header") };
        assert_eq!(header.uri().path(), "/hello.txt");
        assert!(framed.next().await.unwrap().unwrap().is_payload());

        let head = Response::builder().status(StatusCode::OK).body(()).unwrap();
        framed.feed(ResponseMessage::<Bytes>::Header((head, PayloadSize::Length(2)))).await.unwrap();
        framed.feed(ResponseMessage::<Bytes>::from(Bytes::from_static(b"hi"))).await.unwrap();
        framed.send(ResponseMessage::<Bytes>::Payload(crate::protocol::PayloadItem::Eof)).await.unwrap();
        drop(framed);

        let mut received = String::new();
        client_read.read_to_string(&mut received).await.unwrap();
        assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(received.ends_with("\r\n\r\nhi"));
    }
}
