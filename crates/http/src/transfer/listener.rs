use crate::protocol::SendError;

/// Observes a file transfer.
///
/// `on_progress` may be called any number of times, `on_complete` is called exactly once, after
/// the file has been released.
pub trait TransferListener {
    /// `progress` bytes of `total` have been written so far.
    fn on_progress(&mut self, _progress: u64, _total: Option<u64>) {}

    /// The transfer ended, with the number of bytes written or the failure.
    fn on_complete(&mut self, _result: Result<u64, &SendError>) {}
}

impl TransferListener for () {}
