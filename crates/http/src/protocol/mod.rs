//! Core HTTP protocol abstractions.
//!
//! This module provides the building blocks shared by the codec and the connection driver.
//!
//! - **Message Handling** ([`message`]): Core message types and payload processing
//!   - [`Message`]: Represents either headers or payload chunks
//!   - [`PayloadItem`]: Handles individual payload chunks and the terminal EOF marker
//!   - [`PayloadSize`]: Length-delimited payload size (there is no chunked framing)
//!
//! - **Request Processing** ([`request`]): Request header handling
//!   - [`RequestHeader`]: Wraps HTTP request headers together with a [`DecoderResult`]
//!
//! - **Response Processing** ([`response`]): Response header handling
//!   - [`ResponseHead`]: Type alias for response headers before body attachment
//!
//! - **Error Handling** ([`error`]): Comprehensive error types
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::DecoderResult;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;
pub use response::ResponseMessage;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
