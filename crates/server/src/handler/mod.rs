//! Serving files from a directory.
//!
//! - [`StaticFileHandler`]: answers each request with a file, a window of it, or an error status
//! - [`sanitize_path`]: maps a request URI to a path under the serving root
//! - [`ByteRange`]: the window served for a `Range` request
//! - [`FileSystem`]: the filesystem lookups, [`LocalFileSystem`] by default
//! - [`content_type`]: the `Content-Type` of a file

mod content_type;
mod fs;
mod range;
mod sanitize;
mod static_file_handler;

pub use content_type::content_type;
pub use fs::FileSystem;
pub use fs::LocalFileSystem;
pub use fs::is_hidden;
pub use range::ByteRange;
pub use sanitize::sanitize_path;
pub use static_file_handler::StaticFileHandler;
