//! A static file server with byte-range support
//!
//! Files below a serving root are sent with zero-copy transfers over keep-alive HTTP/1.1
//! connections driven by [`sendfile_http`]. A `Range: bytes=<start>-` request is answered with
//! the file from `start` to its end as `206 Partial Content`.
//!
//! # Example
//!
//! ```no_run
//! use sendfile_server::{Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder().address("127.0.0.1:8080".parse()?).root("/srv/www").build()?;
//! Server::new(config).start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Responses
//!
//! | Request                                   | Status |
//! |-------------------------------------------|--------|
//! | regular file                              | 200    |
//! | regular file with a `Range` header        | 206    |
//! | malformed request                         | 400    |
//! | path escaping the root, directory         | 403    |
//! | missing or hidden file                    | 404    |
//! | anything failing before the response head | 500    |
//!
//! Every error response closes the connection.

mod config;
mod error;
pub mod handler;
mod server;

pub use config::ServerConfig;
pub use config::ServerConfigBuilder;
pub use error::ConfigError;
pub use error::ServeError;
pub use error::ServerError;
pub use server::Server;
