//! HTTP response header handling implementation.
//!
//! It uses the standard `http::Response` type with an empty body placeholder
//! to represent response headers before the actual response body is attached.

use bytes::Bytes;
use http::Response;

use crate::protocol::{Message, PayloadSize};

/// Type alias for HTTP response headers.
///
/// This type represents the header portion of an HTTP response, using
/// `http::Response<()>` with an empty body placeholder.
pub type ResponseHead = Response<()>;

/// A response message as accepted by the outbound half of the codec.
pub type ResponseMessage<D = Bytes> = Message<(ResponseHead, PayloadSize), D>;
