//! Media types `mime_guess` does not ship.
//!
//! Mostly linked-data serialisations. Entries here are listed ahead of the
//! `mime_guess` types for the same extension.

/// `(media type, extensions)` pairs in registry order.
pub const SUPPLEMENT: &[(&str, &[&str])] = &[
    ("text/turtle", &["ttl"]),
    ("text/n3", &["n3"]),
    ("application/n-triples", &["nt"]),
    ("application/n-quads", &["nq"]),
    ("application/trig", &["trig"]),
    ("application/rdf+xml", &["rdf", "owl"]),
    ("application/ld+json", &["jsonld"]),
    ("application/sparql-query", &["rq"]),
    ("application/sparql-results+xml", &["srx"]),
    ("application/sparql-results+json", &["srj"]),
    ("application/manifest+json", &["webmanifest"]),
];
