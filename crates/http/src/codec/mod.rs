//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module provides functionality for streaming HTTP message processing,
//! including request decoding and response encoding. It uses a state machine
//! pattern to handle both headers and payload data efficiently.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`HttpObjectDecoder`]: Generic decoder, building requests through supplied factories
//!   - [`RequestDecoder`]: The object decoder with this crate's request factories
//!   - Header parsing via the `header` module, payload decoding via the `body` module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes outgoing HTTP responses
//!
//! - [`ServerCodec`]: Both directions behind one codec, configured by [`CodecConfig`]
//!
//! # Example
//!
//! ```no_run
//! use sendfile_http::codec::{CodecConfig, ServerCodec};
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//!
//! # async fn run(stream: TcpStream) {
//! let framed = Framed::new(stream, ServerCodec::new(CodecConfig::default()));
//! # }
//! ```
//!
//! # Features
//!
//! - Streaming processing of HTTP messages
//! - Content-Length based payload handling, chunked transfer encoding is refused
//! - Malformed requests surface as an invalid stand-in request instead of an error
//! - Efficient header parsing and encoding

mod body;
mod config;
mod header;
mod object_decoder;
mod request_decoder;
mod response_encoder;
mod server_codec;

pub use config::CodecConfig;
pub use config::ConfigError;
pub use header::RequestLine;
pub use object_decoder::HttpObjectDecoder;
pub use request_decoder::BAD_REQUEST_PATH;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
pub use server_codec::ServerCodec;
