//! Extension → media type index.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::mime::registry::SUPPLEMENT;

static GLOBAL_INDEX: LazyLock<MimeIndex> =
    LazyLock::new(|| MimeIndex::from_registry(SUPPLEMENT.iter().copied()).with_mime_guess());

/// Read-only mapping from a file extension to every media type it can represent.
#[derive(Debug, Clone, Default)]
pub struct MimeIndex {
    by_extension: HashMap<String, Vec<String>>,
    mime_guess: bool,
}

impl MimeIndex {
    /// Build an index by inverting a `(type, extensions)` registry.
    ///
    /// Types are appended per extension in registry order, and a type is
    /// never listed twice for the same extension.
    pub fn from_registry<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let mut by_extension: HashMap<String, Vec<String>> = HashMap::new();

        for (mime_type, extensions) in entries {
            for extension in extensions {
                let types = by_extension.entry(extension.to_ascii_lowercase()).or_default();
                if !types.iter().any(|t| t == mime_type) {
                    types.push(mime_type.to_string());
                }
            }
        }

        Self {
            by_extension,
            mime_guess: false,
        }
    }

    /// Also answer from the `mime_guess` database, after the registry types.
    pub fn with_mime_guess(mut self) -> Self {
        self.mime_guess = true;
        self
    }

    /// The process-wide index: the built-in supplement plus `mime_guess`.
    pub fn global() -> &'static MimeIndex {
        &GLOBAL_INDEX
    }

    /// Every media type known for `extension`; empty when unknown.
    pub fn types_for(&self, extension: &str) -> Vec<&str> {
        if extension.is_empty() {
            return Vec::new();
        }

        let mut types: Vec<&str> = self
            .by_extension
            .get(&extension.to_ascii_lowercase())
            .map(|types| types.iter().map(String::as_str).collect())
            .unwrap_or_default();

        if self.mime_guess {
            for mime_type in mime_guess::from_ext(extension).iter_raw() {
                if !types.contains(&mime_type) {
                    types.push(mime_type);
                }
            }
        }
        types
    }

    /// The preferred media type for `extension`, if any.
    pub fn content_type_for(&self, extension: &str) -> Option<&str> {
        self.types_for(extension).first().copied()
    }

    /// Number of extensions in the registry part of the index.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_empty() {
        let index = MimeIndex::global();
        assert!(index.types_for("definitely-not-an-extension").is_empty());
        assert!(index.types_for("").is_empty());
        assert!(index.content_type_for("nope").is_none());
    }

    #[test]
    fn test_rdf_serialisations() {
        let index = MimeIndex::global();
        assert_eq!(index.content_type_for("ttl"), Some("text/turtle"));
        assert_eq!(index.content_type_for("nt"), Some("application/n-triples"));
        assert_eq!(index.content_type_for("owl"), Some("application/rdf+xml"));
        assert_eq!(index.types_for("ttl").iter().filter(|t| **t == "text/turtle").count(), 1);
    }

    #[test]
    fn test_types_beyond_the_supplement() {
        let index = MimeIndex::global();
        assert!(index.types_for("sh").contains(&"application/x-sh"));
        assert!(index.types_for("mkv").contains(&"video/x-matroska"));
        assert_eq!(index.content_type_for("css"), Some("text/css"));
        assert_eq!(index.content_type_for("png"), Some("image/png"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = MimeIndex::global();
        assert_eq!(index.content_type_for("TTL"), Some("text/turtle"));
        assert_eq!(index.content_type_for("PNG"), Some("image/png"));
    }

    #[test]
    fn test_registry_only_index() {
        let registry: &[(&str, &[&str])] = &[
            ("text/a", &["x", "y"]),
            ("text/b", &["x"]),
            ("text/a", &["x"]),
        ];
        let first = MimeIndex::from_registry(registry.iter().copied());
        let second = MimeIndex::from_registry(registry.iter().copied());

        assert_eq!(first.types_for("x"), ["text/a", "text/b"]);
        assert_eq!(first.types_for("x"), second.types_for("x"));
        assert_eq!(first.types_for("y"), ["text/a"]);
        assert!(first.types_for("png").is_empty());
        assert_eq!(first.len(), 2);
    }
}
