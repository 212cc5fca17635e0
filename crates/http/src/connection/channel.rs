//! The outbound side of a connection as seen by a request handler.

use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use bytes::Bytes;
use futures::SinkExt;
use http::Response;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::ServerCodec;
use crate::protocol::{PayloadItem, PayloadSize, ResponseHead, ResponseMessage, SendError};
use crate::transfer::{FileRegion, SendFile, TransferListener, send_region};

/// Where a handler writes its response.
///
/// A response is a head, then either in-memory bytes or a file transfer, then the terminal
/// marker. Once a write fails the channel is inactive and every further write fails with
/// [`SendError::ConnectionClosed`].
#[trait_variant::make(Channel: Send)]
pub trait LocalChannel {
    /// False once the connection was closed or a write on it failed.
    fn is_active(&self) -> bool;

    /// True once a response head has been written for the current request.
    fn is_committed(&self) -> bool;

    /// Buffers the response head, `payload_size` becomes its `Content-Length`.
    async fn write_head(&mut self, head: ResponseHead, payload_size: PayloadSize) -> Result<(), SendError>;

    /// Flushes the head and writes the file region without copying it through the codec.
    ///
    /// `listener` sees the progress and exactly one completion, after the file was released.
    async fn transfer<L: TransferListener + Send>(&mut self, region: FileRegion, listener: &mut L) -> Result<u64, SendError>;

    /// Writes the zero-length terminal marker and flushes the response.
    async fn write_last(&mut self) -> Result<(), SendError>;

    /// Writes a complete response held in memory.
    async fn write_full(&mut self, response: Response<Bytes>) -> Result<(), SendError>;

    /// Flushes what is buffered and shuts down the write side.
    async fn close(&mut self) -> Result<(), SendError>;
}

/// [`Channel`] over a framed connection, valid for a single request.
pub struct ConnectionChannel<'a, S> {
    framed: &'a mut Framed<S, ServerCodec>,
    active: bool,
    committed: bool,
    transfer_timeout: Option<Duration>,
}

impl<'a, S> ConnectionChannel<'a, S>
where
    S: AsyncRead + AsyncWrite + SendFile + Unpin + Send,
{
    pub fn new(framed: &'a mut Framed<S, ServerCodec>, transfer_timeout: Option<Duration>) -> Self {
        Self { framed, active: true, committed: false, transfer_timeout }
    }

    fn ensure_active(&self) -> Result<(), SendError> {
        if self.active { Ok(()) } else { Err(SendError::ConnectionClosed) }
    }

    /// Any failure leaves the response framing unknown, so the connection is given up.
    fn track<T>(&mut self, result: Result<T, SendError>) -> Result<T, SendError> {
        if let Err(e) = &result {
            warn!(cause = %e, "write on connection failed, mark it inactive");
            self.active = false;
        }
        result
    }

    async fn flush(&mut self) -> Result<(), SendError> {
        SinkExt::<ResponseMessage>::flush(&mut *self.framed).await
    }

    async fn do_transfer<L: TransferListener + Send>(&mut self, mut region: FileRegion, listener: &mut L) -> Result<u64, SendError> {
        if let Err(e) = self.ensure_active() {
            region.release();
            listener.on_complete(Err(&e));
            return Err(e);
        }

        if let Err(e) = self.flush().await {
            region.release();
            listener.on_complete(Err(&e));
            return Err(e);
        }

        let sent = send_region(self.framed.get_mut(), region, listener, self.transfer_timeout).await?;
        self.framed.codec_mut().encoder_mut().advance(sent)?;
        Ok(sent)
    }

    async fn do_write_full(&mut self, response: Response<Bytes>) -> Result<(), SendError> {
        let (parts, body) = response.into_parts();
        let payload_size = PayloadSize::new_length(body.len() as u64);

        self.framed.feed(ResponseMessage::<Bytes>::Header((ResponseHead::from_parts(parts, ()), payload_size))).await?;
        if !body.is_empty() {
            self.framed.feed(ResponseMessage::<Bytes>::from(body)).await?;
        }
        self.framed.send(ResponseMessage::<Bytes>::Payload(PayloadItem::Eof)).await
    }
}

impl<S> fmt::Debug for ConnectionChannel<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionChannel")
            .field("active", &self.active)
            .field("committed", &self.committed)
            .field("transfer_timeout", &self.transfer_timeout)
            .finish_non_exhaustive()
    }
}

impl<S> Channel for ConnectionChannel<'_, S>
where
    S: AsyncRead + AsyncWrite + SendFile + Unpin + Send,
{
    fn is_active(&self) -> bool {
        self.active
    }

    fn is_committed(&self) -> bool {
        self.committed
    }

    async fn write_head(&mut self, head: ResponseHead, payload_size: PayloadSize) -> Result<(), SendError> {
        self.ensure_active()?;
        self.committed = true;
        let result = self.framed.feed(ResponseMessage::<Bytes>::Header((head, payload_size))).await;
        self.track(result)
    }

    async fn transfer<L: TransferListener + Send>(&mut self, region: FileRegion, listener: &mut L) -> Result<u64, SendError> {
        let result = self.do_transfer(region, listener).await;
        self.track(result)
    }

    async fn write_last(&mut self) -> Result<(), SendError> {
        self.ensure_active()?;
        let result = self.framed.send(ResponseMessage::<Bytes>::Payload(PayloadItem::Eof)).await;
        self.track(result)
    }

    async fn write_full(&mut self, response: Response<Bytes>) -> Result<(), SendError> {
        self.ensure_active()?;
        self.committed = true;
        let result = self.do_write_full(response).await;
        self.track(result)
    }

    async fn close(&mut self) -> Result<(), SendError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        debug!("closing connection");
        self.flush().await?;
        match self.framed.get_mut().shutdown().await {
            Ok(()) => Ok(()),
            // the peer may already be gone
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(SendError::io(e)),
        }
    }
}
