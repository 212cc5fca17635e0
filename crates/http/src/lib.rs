//! A non-chunked HTTP/1.1 server codec with zero-copy file transfer
//!
//! This crate provides the connection plumbing of a static file server built on top of tokio:
//! requests are decoded one at a time, and a handler answers each of them by writing a response
//! head followed by either a short in-memory body or a window of a file. File windows are
//! written straight from the page cache to the socket with `sendfile(2)` where available.
//!
//! # Features
//!
//! - HTTP/1.1 and HTTP/1.0 requests, keep-alive connections
//! - Length-delimited bodies only: chunked transfer-encoding is refused on requests and never
//!   produced on responses
//! - Malformed requests are delivered as an invalid stand-in request, so they can be answered
//! - Zero-copy parsing of header values and zero-copy file bodies
//! - Explicit, exactly-once release of the files being transferred
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::Response;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use sendfile_http::codec::CodecConfig;
//! use sendfile_http::connection::{Channel, HttpConnection};
//! use sendfile_http::handler::Handler;
//! use sendfile_http::protocol::{HttpError, RequestHeader};
//!
//! struct HelloWorld;
//!
//! impl Handler for HelloWorld {
//!     async fn call<C: Channel + Send>(&self, request: RequestHeader, channel: &mut C) -> Result<(), HttpError> {
//!         info!(path = request.uri().path(), "receive request");
//!         channel.write_full(Response::new(Bytes::from_static(b"Hello World!\r\n"))).await?;
//!         if !request.is_keep_alive() {
//!             channel.close().await?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(HelloWorld);
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let connection = HttpConnection::new(tcp_stream, CodecConfig::default());
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: Protocol types and errors
//! - [`codec`]: Request decoding and response encoding
//! - [`transfer`]: File regions and the transports able to send them
//! - [`connection`]: The per-connection loop and the [`connection::Channel`] handlers write to
//! - [`handler`]: The [`handler::Handler`] trait
//!
//! # Limitations
//!
//! - HTTP/1.1 only (currently HTTP/2 or HTTP/3 is not supported)
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Maximum number of headers: 64
//!
//! # Safety
//!
//! Header values are attached without a second validation pass when header validation is
//! turned off, relying on what `httparse` already checked. Turning it off also makes the parser
//! drop malformed header lines instead of failing the request.

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod transfer;

mod utils;
pub(crate) use utils::ensure;
