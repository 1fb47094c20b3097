//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! GET /data/test (no extension)
//!     → cache.rs (memoized per request path)
//!         → scanner.rs on miss (list /data, keep siblings named `test.*`)
//!             → MimeIndex (ttl → text/turtle, nt → application/n-triples)
//!     → accept.rs (best candidate for the Accept header)
//!     → request path rewritten to /data/test.ttl
//! ```
//!
//! # Design Decisions
//! - An empty set of representations is a valid, cached answer
//! - Entries are never invalidated; the filesystem is assumed static
//! - The cache is a trait so a TTL or watch-based store can be swapped in
//! - Concurrent misses may scan twice; the scan is idempotent

pub mod accept;
pub mod cache;
pub mod encoding;
pub mod scanner;

use indexmap::IndexMap;

pub use accept::{ContentNegotiator, QualityNegotiator};
pub use cache::{MemoryRepresentationCache, RepresentationCache};
pub use encoding::{preferred_encoding, Encoding};
pub use scanner::DirectoryScanner;

/// The file variants available for one logical resource, keyed by media type.
///
/// Iteration follows insertion order, which is the scanner's listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Representations {
    variants: IndexMap<String, String>,
}

impl Representations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `extension` satisfies `mime_type`. A later call for the
    /// same type replaces the extension but keeps the original position.
    pub fn insert(&mut self, mime_type: impl Into<String>, extension: impl Into<String>) {
        self.variants.insert(mime_type.into(), extension.into());
    }

    /// Media types with at least one variant, in listing order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn extension_for(&self, mime_type: &str) -> Option<&str> {
        self.variants.get(mime_type).map(String::as_str)
    }

    /// First-enumerated `(type, extension)` pair.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.variants.first().map(|(t, e)| (t.as_str(), e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Representations {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut representations = Self::new();
        for (mime_type, extension) in iter {
            representations.insert(mime_type, extension);
        }
        representations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut reps = Representations::new();
        reps.insert("text/xml", "xml");
        reps.insert("text/turtle", "ttl");
        reps.insert("text/xml", "rdf.xml");

        assert_eq!(reps.first(), Some(("text/xml", "rdf.xml")));
        assert_eq!(reps.types().collect::<Vec<_>>(), vec!["text/xml", "text/turtle"]);
        assert_eq!(reps.len(), 2);
    }

    #[test]
    fn test_empty() {
        let reps = Representations::new();
        assert!(reps.is_empty());
        assert!(reps.first().is_none());
        assert!(reps.extension_for("text/turtle").is_none());
    }
}
