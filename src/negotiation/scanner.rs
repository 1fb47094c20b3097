//! Directory variant discovery.
//!
//! # Responsibilities
//! - Split a request path into directory and base name
//! - List the directory under the served root
//! - Map every sibling `base.ext` to the media types its extension represents
//!
//! # Design Decisions
//! - Listing failures are not errors: they yield no representations
//! - Sibling names are sorted before processing so "listing order" is stable;
//!   when two extensions satisfy the same type the later name wins
//! - Paths that could escape the root yield no representations

use std::path::{Path, PathBuf};

use crate::http::path::decode_path;
use crate::mime::MimeIndex;
use crate::negotiation::Representations;

/// Discovers which representations of a path exist on disk.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
    index: &'static MimeIndex,
}

impl DirectoryScanner {
    /// Scanner over `root` using the global MIME index.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_index(root, MimeIndex::global())
    }

    pub fn with_index(root: impl Into<PathBuf>, index: &'static MimeIndex) -> Self {
        Self {
            root: root.into(),
            index,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect the representations of `request_path` (a URL path without extension).
    pub async fn scan(&self, request_path: &str) -> Representations {
        let mut representations = Representations::new();

        let Some((directory, base_name)) = split_request_path(request_path) else {
            tracing::debug!(path = %request_path, "Rejected path for variant scan");
            return representations;
        };

        let dir_path = self.root.join(directory.trim_start_matches('/'));
        let mut names = match list_file_names(&dir_path).await {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(directory = ?dir_path, error = %e, "Directory not listable, no variants");
                return representations;
            }
        };
        names.sort();

        for name in names {
            let Some((stem, extension)) = name.split_once('.') else {
                continue;
            };
            if stem != base_name {
                continue;
            }
            for mime_type in self.index.types_for(extension) {
                representations.insert(mime_type, extension);
            }
        }

        tracing::debug!(
            path = %request_path,
            variants = representations.len(),
            "Scanned representations"
        );
        representations
    }
}

/// Decode and split `/a/b/name` into (`/a/b/`, `name`).
fn split_request_path(request_path: &str) -> Option<(String, String)> {
    let decoded = decode_path(request_path)?;
    let cut = decoded.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (directory, base_name) = decoded.split_at(cut);
    Some((directory.to_string(), base_name.to_string()))
}

async fn list_file_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        // Names that are not valid UTF-8 can never match a URL path
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}
