//! Zero-copy file transfer.
//!
//! A response body served from a file never passes through the codec buffers. Instead the
//! connection flushes the response head and then hands a [`FileRegion`] to the transport:
//!
//! - [`FileRegion`]: an open file plus the byte window to send, releasing the file exactly once
//! - [`SendFile`]: transports able to write a file window, `sendfile(2)` for TCP on Linux
//! - [`CopyTransfer`]: adapts any `AsyncWrite` with a read-then-write copy
//! - [`send_region`]: drives a region to completion, reporting to a [`TransferListener`]

mod file_region;
mod listener;
mod send_file;
mod send_region;

pub use file_region::FileRegion;
pub use listener::TransferListener;
pub use send_file::CopyTransfer;
pub use send_file::SendFile;
pub use send_region::send_region;
