use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace};

use crate::codec::{CodecConfig, ServerCodec};
use crate::connection::{Channel, ConnectionChannel};
use crate::handler::Handler;
use crate::protocol::{HttpError, Message};
use crate::transfer::SendFile;

/// Initial capacity of the read and write buffers of a connection
const BUFFER_CAPACITY: usize = 8 * 1024;

/// An HTTP connection that reads requests one at a time and lets a handler answer each
///
/// `HttpConnection` handles the full lifecycle of an HTTP connection, including:
/// - Reading and decoding requests, malformed ones included
/// - Handing each request to the handler with a [`Channel`] for the response
/// - Discarding request bodies the handler has no use for
/// - Keeping the connection open until the handler closes it or the peer goes away
///
/// # Type Parameters
///
/// * `S`: The transport, it must be able to write file regions, see [`SendFile`]
pub struct HttpConnection<S> {
    framed: Framed<S, ServerCodec>,
    transfer_timeout: Option<Duration>,
}

impl<S> HttpConnection<S>
where
    S: AsyncRead + AsyncWrite + SendFile + Unpin + Send,
{
    pub fn new(io: S, config: CodecConfig) -> Self {
        Self { framed: Framed::with_capacity(io, ServerCodec::new(config), BUFFER_CAPACITY), transfer_timeout: None }
    }

    /// Fails file transfers that take longer than `transfer_timeout`.
    #[must_use]
    pub fn with_transfer_timeout(mut self, transfer_timeout: Option<Duration>) -> Self {
        self.transfer_timeout = transfer_timeout;
        self
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.framed.next().await {
                Some(Ok(Message::Header((header, payload_size)))) => {
                    debug!(method = %header.method(), uri = %header.uri(), payload_size = ?payload_size, "receive request");

                    let mut channel = ConnectionChannel::new(&mut self.framed, self.transfer_timeout);
                    if let Err(e) = handler.call(header, &mut channel).await {
                        error!(cause = %e, "handle request error, connection shutdown");
                        return Err(e);
                    }

                    if !channel.is_active() {
                        info!("connection closed by handler");
                        return Ok(());
                    }
                }

                Some(Ok(Message::Payload(item))) => {
                    trace!(eof = item.is_eof(), "discard request payload");
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next request");
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}

impl<S> std::fmt::Debug for HttpConnection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection").field("transfer_timeout", &self.transfer_timeout).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PayloadSize, RequestHeader};
    use crate::transfer::{CopyTransfer, FileRegion};
    use bytes::Bytes;
    use http::{Response, StatusCode};
    use indoc::indoc;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
    use tokio::task::JoinHandle;

    const FILE_CONTENT: &[u8] = b"0123456789abcdefghij";

    struct TestHandler {
        file: tempfile::NamedTempFile,
    }

    impl TestHandler {
        fn new() -> Self {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(FILE_CONTENT).unwrap();
            Self { file }
        }
    }

    impl Handler for TestHandler {
        async fn call<C: Channel + Send>(&self, request: RequestHeader, channel: &mut C) -> Result<(), HttpError> {
            if request.decoder_result().is_failure() {
                channel.write_full(Response::builder().status(StatusCode::BAD_REQUEST).body(Bytes::new()).unwrap()).await?;
                return Ok(channel.close().await?);
            }

            match request.uri().path() {
                "/file" => {
                    let head = Response::builder().status(StatusCode::PARTIAL_CONTENT).body(()).unwrap();
                    channel.write_head(head, PayloadSize::Length(10)).await?;
                    let region = FileRegion::new(self.file.reopen().unwrap(), 5, 10);
                    channel.transfer(region, &mut ()).await?;
                    channel.write_last().await?;
                }
                "/close" => {
                    channel.write_full(Response::new(Bytes::from_static(b"bye"))).await?;
                    channel.close().await?;
                }
                _ => {
                    channel.write_full(Response::new(Bytes::from_static(b"hello"))).await?;
                }
            }
            Ok(())
        }
    }

    fn serve(server: DuplexStream) -> JoinHandle<Result<(), HttpError>> {
        let connection = HttpConnection::new(CopyTransfer::new(server), CodecConfig::default());
        tokio::spawn(connection.process(Arc::new(TestHandler::new())))
    }

    async fn exchange(requests: &str, half_close: bool) -> (String, Result<(), HttpError>) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let task = serve(server);

        let (mut reader, mut writer) = tokio::io::split(client);
        writer.write_all(requests.as_bytes()).await.unwrap();
        if half_close {
            writer.shutdown().await.unwrap();
        }

        let mut received = String::new();
        reader.read_to_string(&mut received).await.unwrap();
        (received, task.await.unwrap())
    }

    #[tokio::test]
    async fn keeps_connection_alive_between_requests() {
        let requests = indoc! {r##"
        GET /a HTTP/1.1
        Host: localhost

        POST /b HTTP/1.1
        Content-Length: 4

        bodyGET /c HTTP/1.1

        "##};

        let (received, result) = exchange(requests, true).await;

        assert!(result.is_ok());
        assert_eq!(received.matches("HTTP/1.1 200 OK\r\n").count(), 3);
        assert_eq!(received.matches("\r\n\r\nhello").count(), 3);
    }

    #[tokio::test]
    async fn transfers_file_region() {
        let (received, result) = exchange("GET /file HTTP/1.1\r\n\r\n", true).await;

        assert!(result.is_ok());
        assert!(received.starts_with("HTTP/1.1 206 Partial Content\r\n"));
        assert!(received.contains("content-length: 10\r\n"));
        assert!(received.ends_with("\r\n\r\n56789abcde"));
    }

    #[tokio::test]
    async fn handler_close_ends_connection() {
        // the client never closes its side, the handler does
        let (received, result) = exchange("GET /close HTTP/1.1\r\n\r\nGET /a HTTP/1.1\r\n\r\n", false).await;

        assert!(result.is_ok());
        assert!(received.ends_with("\r\n\r\nbye"));
        assert!(!received.contains("hello"));
    }

    #[tokio::test]
    async fn malformed_request_is_answered_then_closed() {
        let (received, result) = exchange("BROKEN\r\n\r\nGET /a HTTP/1.1\r\n\r\n", false).await;

        assert!(result.is_ok());
        assert!(received.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(!received.contains("hello"));
    }
}
