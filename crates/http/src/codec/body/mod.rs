//! HTTP body handling module for processing request and response payloads
//!
//! Payloads are length-delimited only: a message either declares a `Content-Length` or has no
//! body at all. Chunked transfer-encoding is not supported in either direction.
//!
//! ## Decoders
//! - [`LengthDecoder`]: Processes fixed-length payloads, emitting items of bounded size
//! - [`PayloadDecoder`]: Selects between a fixed-length payload and no payload
//!
//! ## Encoders
//! - [`LengthEncoder`]: Handles fixed-length payload encoding and out-of-band accounting
//! - [`PayloadEncoder`]: Selects between a fixed-length payload and no payload

mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
