use std::future::poll_fn;
use std::io;
use std::io::ErrorKind;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::protocol::SendError;
use crate::transfer::{FileRegion, SendFile, TransferListener};

/// Writes the whole `region` to `io`.
///
/// Progress is reported after every write. When the transfer ends, successfully or not, the
/// region is released first and then `listener` receives the single completion event. With a
/// `timeout`, a transfer still running after that long fails with [`SendError::TransferTimeout`].
pub async fn send_region<S, L>(io: &mut S, mut region: FileRegion, listener: &mut L, timeout: Option<Duration>) -> Result<u64, SendError>
where
    S: SendFile + Unpin + ?Sized,
    L: TransferListener + ?Sized,
{
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, drive(io, &mut region, listener)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?limit, sent = region.transferred(), total = region.count(), "file transfer timed out");
                Err(SendError::TransferTimeout { timeout: limit })
            }
        },
        None => drive(io, &mut region, listener).await,
    };

    region.release();

    match &result {
        Ok(sent) => {
            debug!(sent, "file transfer complete");
            listener.on_complete(Ok(*sent));
        }
        Err(e) => {
            debug!(cause = %e, sent = region.transferred(), "file transfer failed");
            listener.on_complete(Err(e));
        }
    }
    result
}

async fn drive<S, L>(io: &mut S, region: &mut FileRegion, listener: &mut L) -> Result<u64, SendError>
where
    S: SendFile + Unpin + ?Sized,
    L: TransferListener + ?Sized,
{
    let total = region.count();
    while region.remaining() > 0 {
        let Some(file) = region.file() else {
            return Err(io::Error::new(ErrorKind::InvalidInput, "file region is already released").into());
        };

        let offset = region.position() + region.transferred();
        let count = usize::try_from(region.remaining()).unwrap_or(usize::MAX);
        let sent = poll_fn(|cx| Pin::new(&mut *io).poll_send_file(cx, file, offset, count)).await?;
        if sent == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "file ended before the region was sent").into());
        }

        region.advance(sent as u64);
        trace!(sent = region.transferred(), total, "file transfer progress");
        listener.on_progress(region.transferred(), Some(total));
    }
    Ok(region.transferred())
}
