use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::header::{ACCEPT_RANGES, CONNECTION, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use http::{HeaderValue, Response, StatusCode};
use sendfile_http::connection::Channel;
use sendfile_http::handler::Handler;
use sendfile_http::protocol::{HttpError, PayloadSize, RequestHeader, SendError};
use sendfile_http::transfer::{FileRegion, TransferListener};
use tracing::{debug, error, info, trace, warn};

use crate::ServeError;
use crate::handler::{ByteRange, FileSystem, LocalFileSystem, content_type, is_hidden, sanitize_path};

const TEXT_PLAIN_UTF_8: HeaderValue = HeaderValue::from_static("text/plain; charset=UTF-8");
const BYTES: HeaderValue = HeaderValue::from_static("bytes");
const KEEP_ALIVE: HeaderValue = HeaderValue::from_static("keep-alive");

/// Serves the files below a root directory.
///
/// Successful responses are `200 OK`, or `206 Partial Content` for a `Range` request, and
/// honor keep-alive. Every error response is a short text body after which the connection is
/// closed.
#[derive(Debug)]
pub struct StaticFileHandler<F = LocalFileSystem> {
    root: PathBuf,
    fs: F,
}

impl StaticFileHandler<LocalFileSystem> {
    /// `root` is used as given, it is expected to be absolute.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_system(root, LocalFileSystem)
    }
}

impl<F: FileSystem> StaticFileHandler<F> {
    pub fn with_file_system(root: impl Into<PathBuf>, fs: F) -> Self {
        Self { root: root.into(), fs }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn serve<C: Channel + Send>(&self, request: &RequestHeader, channel: &mut C) -> Result<(), ServeError> {
        if let Some(cause) = request.decoder_result().cause() {
            return Err(ServeError::decode_failure(cause));
        }

        let path = sanitize_path(&self.root, request.uri())?;

        let metadata = match self.fs.metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), cause = %e, "file does not exist");
                return Err(ServeError::NotFound);
            }
        };

        if is_hidden(&path) {
            return Err(ServeError::NotFound);
        }

        if !metadata.is_file() {
            return Err(ServeError::NotARegularFile);
        }

        let file = match self.fs.open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ServeError::NotFound),
            Err(e) => return Err(e.into()),
        };
        // the length of what was opened, the path may have changed since the lookup
        let file_length = file.metadata()?.len();

        let keep_alive = request.is_keep_alive();
        let range = request
            .headers()
            .get(RANGE)
            .filter(|value| !value.is_empty())
            .and_then(|value| ByteRange::from_header(value.to_str().unwrap_or_default(), file_length));

        let mut builder = Response::builder().header(CONTENT_TYPE, content_type(&path)).header(ACCEPT_RANGES, BYTES);
        if keep_alive {
            builder = builder.header(CONNECTION, KEEP_ALIVE);
        }

        let (builder, position, count) = match range {
            Some(range) => {
                let builder = builder.status(StatusCode::PARTIAL_CONTENT).header(CONTENT_RANGE, range.content_range(file_length));
                (builder, range.start(), range.chunk_size())
            }
            None => (builder.status(StatusCode::OK), 0, file_length),
        };
        let head = builder.body(())?;

        debug!(path = %path.display(), status = %head.status(), position, count, keep_alive, "serving file");

        channel.write_head(head, PayloadSize::new_length(count)).await?;
        let mut listener = TransferLog::new(&path);
        channel.transfer(FileRegion::new(file, position, count), &mut listener).await?;
        channel.write_last().await?;

        if !keep_alive {
            channel.close().await?;
        }
        Ok(())
    }

    /// Answers a failed request with its status and closes the connection.
    ///
    /// Nothing is written once the response head has gone out, or when the connection is gone.
    async fn exception_caught<C: Channel + Send>(&self, error: ServeError, channel: &mut C) -> Result<(), HttpError> {
        let status = error.status();
        if status.is_server_error() {
            error!(cause = %error, "failed to serve request");
        } else {
            info!(status = %status, cause = %error, "refused request");
        }

        if !channel.is_active() {
            debug!("connection already closed, response discarded");
            return Ok(());
        }

        if channel.is_committed() {
            warn!("response already started, closing connection");
            channel.close().await?;
            return Ok(());
        }

        channel.write_full(error_response(status)).await?;
        channel.close().await?;
        Ok(())
    }
}

impl<F: FileSystem + Send + Sync> Handler for StaticFileHandler<F> {
    async fn call<C: Channel + Send>(&self, request: RequestHeader, channel: &mut C) -> Result<(), HttpError> {
        match self.serve(&request, channel).await {
            Ok(()) => Ok(()),
            Err(e) => self.exception_caught(e, channel).await,
        }
    }
}

fn error_response(status: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(format!("Failure: {status}\r\n")));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, TEXT_PLAIN_UTF_8);
    response
}

/// Logs the progress of a file transfer.
struct TransferLog<'a> {
    path: &'a Path,
}

impl<'a> TransferLog<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path }
    }
}

impl TransferListener for TransferLog<'_> {
    fn on_progress(&mut self, progress: u64, total: Option<u64>) {
        match total {
            Some(total) => trace!(path = %self.path.display(), progress, total, "transfer progress"),
            None => trace!(path = %self.path.display(), progress, "transfer progress"),
        }
    }

    fn on_complete(&mut self, result: Result<u64, &SendError>) {
        match result {
            Ok(sent) => debug!(path = %self.path.display(), sent, "transfer complete"),
            Err(e) => warn!(path = %self.path.display(), cause = %e, "transfer failed"),
        }
    }
}
