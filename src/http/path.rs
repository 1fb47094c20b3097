//! URL path helpers shared by negotiation and asset serving.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a file name becomes a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a single path segment (a file name or extension).
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Decode a request path, rejecting anything that could leave the served root.
///
/// Returns `None` for invalid UTF-8, NUL bytes and `..` segments.
pub fn decode_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if decoded.contains('\0') || decoded.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }
    Some(decoded.into_owned())
}

/// The part of `path` after its last `/`.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// True for paths whose last segment carries no extension.
pub fn is_extensionless(path: &str) -> bool {
    !last_segment(path).contains('.')
}
