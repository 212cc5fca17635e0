//! The filesystem as seen by the file handler.

use std::fs::{File, Metadata};
use std::future::Future;
use std::io;
use std::path::Path;

/// Lookups the file handler needs, so that they can be observed or replaced in tests.
pub trait FileSystem {
    /// Metadata of `path`, following symlinks. An error means the path does not exist.
    fn metadata(&self, path: &Path) -> impl Future<Output = io::Result<Metadata>> + Send;

    /// Opens `path` read-only.
    fn open(&self, path: &Path) -> impl Future<Output = io::Result<File>> + Send;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    async fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::metadata(path).await
    }

    async fn open(&self, path: &Path) -> io::Result<File> {
        Ok(tokio::fs::File::open(path).await?.into_std().await)
    }
}

/// A file is hidden when its name starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hidden_files() {
        assert!(is_hidden(Path::new("/srv/www/.env")));
        assert!(is_hidden(Path::new(".git")));
        assert!(!is_hidden(Path::new("/srv/www/index.html")));
        assert!(!is_hidden(Path::new("/srv/www/a.b")));
        assert!(!is_hidden(Path::new("/")));
    }

    #[tokio::test]
    async fn local_file_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::File::create(&path).unwrap().write_all(b"hello").unwrap();

        let fs = LocalFileSystem;
        assert_eq!(fs.metadata(&path).await.unwrap().len(), 5);
        assert!(fs.metadata(dir.path()).await.unwrap().is_dir());
        assert!(fs.metadata(&dir.path().join("missing")).await.is_err());

        let file = fs.open(&path).await.unwrap();
        assert_eq!(file.metadata().unwrap().len(), 5);
        assert_eq!(fs.open(&dir.path().join("missing")).await.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
