use std::future::Future;
use std::sync::Arc;

use sendfile_http::connection::HttpConnection;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::handler::StaticFileHandler;
use crate::{ServerConfig, ServerError};

/// Accepts connections and serves files on each of them.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    handler: Arc<StaticFileHandler>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let handler = Arc::new(StaticFileHandler::new(config.root()));
        Self { config, handler }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until the process ends.
    pub async fn start(self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Binds the configured address and serves until `signal` resolves.
    pub async fn start_with_shutdown<F: Future<Output = ()>>(self, signal: F) -> Result<(), ServerError> {
        let address = self.config.address();
        let tcp_listener = match TcpListener::bind(address).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, %address, "bind server error");
                return Err(ServerError::Bind { address, source: e });
            }
        };

        self.serve(tcp_listener, signal).await;
        Ok(())
    }

    /// Serves connections accepted from `tcp_listener` until `signal` resolves.
    ///
    /// Connections already accepted keep running after that.
    pub async fn serve<F: Future<Output = ()>>(self, tcp_listener: TcpListener, signal: F) {
        match tcp_listener.local_addr() {
            Ok(address) => info!(%address, root = %self.config.root().display(), "start listening"),
            Err(e) => warn!(cause = %e, "listening on an unknown address"),
        }

        tokio::pin!(signal);
        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                biased;
                () = &mut signal => {
                    info!("receive shutdown signal, stop accepting");
                    return;
                }
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let handler = Arc::clone(&self.handler);
            let codec_config = *self.config.codec_config();
            let transfer_timeout = self.config.transfer_timeout();

            tokio::spawn(async move {
                debug!(%remote_addr, "accept connection");
                let connection = HttpConnection::new(tcp_stream, codec_config).with_transfer_timeout(transfer_timeout);
                match connection.process(handler).await {
                    Ok(()) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}
