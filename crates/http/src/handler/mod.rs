//! Request handler contract.

use crate::connection::Channel;
use crate::protocol::{HttpError, RequestHeader};

/// Answers one request by writing to the [`Channel`].
///
/// The request may carry a failed [`DecoderResult`](crate::protocol::DecoderResult), a handler
/// is expected to answer those too. Closing the channel ends the connection once `call` returns.
#[trait_variant::make(Handler: Send)]
pub trait LocalHandler {
    async fn call<C: Channel + Send>(&self, request: RequestHeader, channel: &mut C) -> Result<(), HttpError>;
}
