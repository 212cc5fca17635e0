//! Turning a request URI into a path under the serving root.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use http::Uri;
use percent_encoding::percent_decode_str;

use crate::ServeError;

/// Characters never accepted in a decoded path.
const INSECURE_CHARS: [char; 4] = ['<', '>', '&', '"'];

/// Resolves the path of `uri` under `root`.
///
/// Only the path component is used, the query string is ignored. The decoded path must start
/// with `/` and may not contain a dot next to a separator, start or end with a dot, or contain
/// any of `<`, `>`, `&` and `"`.
pub fn sanitize_path(root: &Path, uri: &Uri) -> Result<PathBuf, ServeError> {
    let decoded = decode_path(uri.path())?;

    if decoded.is_empty() || !decoded.starts_with('/') {
        return Err(ServeError::path_rejected(format!("{decoded:?} is not an absolute path")));
    }

    if decoded.contains("/.") || decoded.contains("./") || decoded.starts_with('.') || decoded.ends_with('.') {
        return Err(ServeError::path_rejected(format!("{decoded:?} contains a dot segment")));
    }

    if decoded.contains(INSECURE_CHARS) {
        return Err(ServeError::path_rejected(format!("{decoded:?} contains an insecure character")));
    }

    Ok(root.join(decoded.trim_start_matches('/')))
}

/// Percent-decodes `path`, every `%` must start a two digit hex escape and the result must be
/// UTF-8.
///
/// This is path decoding, not form decoding: a `+` stays a `+` and is never read as a space, so
/// `/a+b.txt` names `a+b.txt` and a file called `a b.txt` is only reached through `/a%20b.txt`.
fn decode_path(path: &str) -> Result<Cow<'_, str>, ServeError> {
    let bytes = path.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, b)| {
        *b == b'%' && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(ServeError::path_rejected(format!("{path:?} has a malformed percent-encoding")));
    }

    percent_decode_str(path).decode_utf8().map_err(ServeError::path_rejected)
}
