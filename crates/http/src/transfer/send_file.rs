//! Transports that can write a window of a file.

use std::fs::File;
use std::io;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Size of the intermediate buffer of the copying fallback.
const COPY_BUFFER_SIZE: usize = 16 * 1024;

/// A transport that writes bytes of a file at `offset` directly.
pub trait SendFile {
    /// Attempts to write up to `count` bytes of `file` starting at `offset`.
    ///
    /// Returns the number of bytes written, `0` when the file has no bytes left at `offset`.
    fn poll_send_file(self: Pin<&mut Self>, cx: &mut Context<'_>, file: &File, offset: u64, count: usize) -> Poll<io::Result<usize>>;
}

impl<T: SendFile + Unpin + ?Sized> SendFile for &mut T {
    fn poll_send_file(self: Pin<&mut Self>, cx: &mut Context<'_>, file: &File, offset: u64, count: usize) -> Poll<io::Result<usize>> {
        Pin::new(&mut **self.get_mut()).poll_send_file(cx, file, offset, count)
    }
}

#[cfg(target_os = "linux")]
impl SendFile for tokio::net::TcpStream {
    fn poll_send_file(self: Pin<&mut Self>, cx: &mut Context<'_>, file: &File, offset: u64, count: usize) -> Poll<io::Result<usize>> {
        use tokio::io::Interest;

        let stream = self.get_mut();
        let start = i64::try_from(offset).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        loop {
            std::task::ready!(stream.poll_write_ready(cx))?;

            let mut off = start;
            let sent = stream.try_io(Interest::WRITABLE, || {
                nix::sys::sendfile::sendfile64(&*stream, file, Some(&mut off), count).map_err(io::Error::from)
            });

            match sent {
                Ok(n) => return Poll::Ready(Ok(n)),
                // readiness was cleared by `try_io`, poll it again
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
impl SendFile for tokio::net::TcpStream {
    fn poll_send_file(self: Pin<&mut Self>, cx: &mut Context<'_>, file: &File, offset: u64, count: usize) -> Poll<io::Result<usize>> {
        poll_copy_region(self, cx, file, offset, count)
    }
}

/// Reads the next part of the window and writes it to `writer`.
///
/// A pending write reads the same bytes again on the next poll.
#[cfg(unix)]
fn poll_copy_region<W: AsyncWrite + ?Sized>(
    writer: Pin<&mut W>,
    cx: &mut Context<'_>,
    file: &File,
    offset: u64,
    count: usize,
) -> Poll<io::Result<usize>> {
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let len = count.min(COPY_BUFFER_SIZE);
    let read = file.read_at(&mut buf[..len], offset)?;
    if read == 0 {
        return Poll::Ready(Ok(0));
    }
    writer.poll_write(cx, &buf[..read])
}

pin_project! {
    /// Gives any `AsyncWrite` the [`SendFile`] capability by copying through a buffer.
    ///
    /// Reads and writes are delegated to the wrapped stream unchanged.
    #[derive(Debug)]
    pub struct CopyTransfer<S> {
        #[pin]
        inner: S,
    }
}

impl<S> CopyTransfer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[cfg(unix)]
impl<S: AsyncWrite> SendFile for CopyTransfer<S> {
    fn poll_send_file(self: Pin<&mut Self>, cx: &mut Context<'_>, file: &File, offset: u64, count: usize) -> Poll<io::Result<usize>> {
        poll_copy_region(self.project().inner, cx, file, offset, count)
    }
}

impl<S: AsyncRead> AsyncRead for CopyTransfer<S> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_read(cx, buf)
    }
}

impl<S: AsyncWrite> AsyncWrite for CopyTransfer<S> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }

    fn poll_write_vectored(self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &[io::IoSlice<'_>]) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }
}
