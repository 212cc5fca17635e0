//! HTTP connection handling module
//!
//! - [`HttpConnection`]: drives one connection
//!   - Decodes requests one at a time through [`ServerCodec`](crate::codec::ServerCodec)
//!   - Hands each request to a [`Handler`](crate::handler::Handler)
//!   - Ends when the handler closes the [`Channel`] or the peer goes away
//!
//! - [`Channel`]: what a handler writes its response to
//!   - Response heads and in-memory bodies go through the codec
//!   - File bodies are written as a [`FileRegion`](crate::transfer::FileRegion), bypassing it

mod channel;
mod http_connection;

pub use channel::Channel;
pub use channel::ConnectionChannel;
pub use channel::LocalChannel;
pub use http_connection::HttpConnection;
