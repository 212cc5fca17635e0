use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use http::StatusCode;
use sendfile_http::protocol::SendError;
use thiserror::Error;

/// Why a request could not be served, each kind maps to one status code.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("request could not be decoded: {reason}")]
    DecodeFailure { reason: String },

    #[error("request path rejected: {reason}")]
    PathRejected { reason: String },

    #[error("file not found")]
    NotFound,

    #[error("not a regular file")]
    NotARegularFile,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("response error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("invalid response: {source}")]
    Response {
        #[from]
        source: http::Error,
    },
}

impl ServeError {
    pub fn decode_failure<S: ToString>(str: S) -> Self {
        Self::DecodeFailure { reason: str.to_string() }
    }

    pub fn path_rejected<S: ToString>(str: S) -> Self {
        Self::PathRejected { reason: str.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::DecodeFailure { .. } => StatusCode::BAD_REQUEST,
            ServeError::PathRejected { .. } | ServeError::NotARegularFile => StatusCode::FORBIDDEN,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::Io { .. } | ServeError::Send { .. } | ServeError::Response { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("serving root must be set")]
    MissingRoot,

    #[error("serving root {} is not accessible: {source}", .path.display())]
    InaccessibleRoot { path: PathBuf, source: io::Error },

    #[error("serving root {} is not a directory", .path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("invalid codec config: {source}")]
    Codec {
        #[from]
        source: sendfile_http::codec::ConfigError,
    },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("can't bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}
