use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use sendfile_http::codec::CodecConfig;

use crate::ConfigError;

/// Everything the server needs to know before it starts, fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    address: SocketAddr,
    root: PathBuf,
    codec: CodecConfig,
    transfer_timeout: Option<Duration>,
}

impl ServerConfig {
    pub const DEFAULT_ADDRESS: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// The canonical serving root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn codec_config(&self) -> &CodecConfig {
        &self.codec
    }

    pub fn transfer_timeout(&self) -> Option<Duration> {
        self.transfer_timeout
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    address: SocketAddr,
    root: Option<PathBuf>,
    codec: CodecConfig,
    transfer_timeout: Option<Duration>,
}

impl ServerConfigBuilder {
    fn new() -> Self {
        Self { address: ServerConfig::DEFAULT_ADDRESS, root: None, codec: CodecConfig::default(), transfer_timeout: None }
    }

    #[must_use]
    pub fn address(mut self, address: SocketAddr) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn codec_config(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn transfer_timeout(mut self, transfer_timeout: Option<Duration>) -> Self {
        self.transfer_timeout = transfer_timeout;
        self
    }

    /// Checks the limits and resolves the serving root, which must be an existing directory.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let root = self.root.ok_or(ConfigError::MissingRoot)?;
        self.codec.validate()?;

        let root = match std::fs::canonicalize(&root) {
            Ok(canonical) => canonical,
            Err(source) => return Err(ConfigError::InaccessibleRoot { path: root, source }),
        };
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory { path: root });
        }

        Ok(ServerConfig { address: self.address, root, codec: self.codec, transfer_timeout: self.transfer_timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_canonical_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();

        let config = ServerConfig::builder()
            .root(dir.path().join("site").join("..").join("site"))
            .transfer_timeout(Some(Duration::from_secs(30)))
            .build()
            .unwrap();

        assert_eq!(config.root(), std::fs::canonicalize(dir.path().join("site")).unwrap());
        assert_eq!(config.address(), ServerConfig::DEFAULT_ADDRESS);
        assert_eq!(config.codec_config(), &CodecConfig::default());
        assert_eq!(config.transfer_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn requires_root() {
        assert!(matches!(ServerConfig::builder().build(), Err(ConfigError::MissingRoot)));
    }

    #[test]
    fn rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServerConfig::builder().root(dir.path().join("missing")).build();
        assert!(matches!(result, Err(ConfigError::InaccessibleRoot { .. })));
    }

    #[test]
    fn rejects_file_root() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = ServerConfig::builder().root(file.path()).build();
        assert!(matches!(result, Err(ConfigError::RootNotDirectory { .. })));
    }

    #[test]
    fn rejects_zero_limits() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServerConfig::builder().root(dir.path()).codec_config(CodecConfig::new(0, 8192, 8192)).build();
        assert!(matches!(result, Err(ConfigError::Codec { .. })));
    }
}
