//! sendfile-server: serve a directory over HTTP/1.1.
//!
//! ```text
//! sendfile-server --root /srv/www --address 0.0.0.0:8080 --transfer-timeout 300
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sendfile_http::codec::CodecConfig;
use sendfile_server::{ConfigError, Server, ServerConfig};
use tracing::{Level, error, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sendfile-server", version, about = "Serve a directory over HTTP/1.1 with zero-copy transfers")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value_t = ServerConfig::DEFAULT_ADDRESS)]
    address: SocketAddr,

    /// Directory to serve files from.
    #[arg(long)]
    root: PathBuf,

    /// Longest accepted request line, in bytes.
    #[arg(long, default_value_t = CodecConfig::DEFAULT_MAX_INITIAL_LINE_LENGTH)]
    max_initial_line_length: usize,

    /// Largest accepted header block, in bytes.
    #[arg(long, default_value_t = CodecConfig::DEFAULT_MAX_HEADER_SIZE)]
    max_header_size: usize,

    /// Largest request body item, in bytes.
    #[arg(long, default_value_t = CodecConfig::DEFAULT_MAX_CHUNK_SIZE)]
    max_chunk_size: usize,

    /// Accept header values without checking them.
    #[arg(long)]
    no_validate_headers: bool,

    /// Abort file transfers running longer than this many seconds.
    #[arg(long)]
    transfer_timeout: Option<u64>,

    /// Most verbose level logged.
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let codec_config = CodecConfig::new(self.max_initial_line_length, self.max_header_size, self.max_chunk_size)
            .with_validate_headers(!self.no_validate_headers);

        ServerConfig::builder()
            .address(self.address)
            .root(self.root)
            .codec_config(codec_config)
            .transfer_timeout(self.transfer_timeout.map(Duration::from_secs))
            .build()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(cause = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(cause = %e, "can't listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    };

    match Server::new(config).start_with_shutdown(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "sendfile-server",
            "--root",
            root,
            "--address",
            "0.0.0.0:9000",
            "--max-chunk-size",
            "1024",
            "--no-validate-headers",
            "--transfer-timeout",
            "60",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, Level::DEBUG);

        let config = cli.into_config().unwrap();
        assert_eq!(config.address(), "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.codec_config().max_chunk_size(), 1024);
        assert!(!config.codec_config().validate_headers());
        assert_eq!(config.transfer_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn root_is_required() {
        assert!(Cli::try_parse_from(["sendfile-server"]).is_err());
    }
}
