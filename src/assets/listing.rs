//! HTML directory listings.

use std::fmt::Write;
use std::path::Path;

use crate::http::path::encode_segment;

#[derive(Debug)]
struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
}

/// Render the listing for `dir`, reached at `request_path` (percent-encoded,
/// ending in `/`). Directories come first; each group is sorted by name.
pub async fn render_listing(
    dir: &Path,
    request_path: &str,
    show_dotfiles: bool,
) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = reader.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !show_dotfiles && name.starts_with('.') {
            continue;
        }
        // Follow symlinks so linked directories list as directories
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        entries.push(Entry {
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let display_path = crate::http::path::decode_path(request_path)
        .unwrap_or_else(|| request_path.to_string());
    let title = escape_html(&display_path);

    let mut html = String::new();
    let _ = write!(
        html,
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Index of {title}</title>\n</head>\n<body>\n<h1>Index of {title}</h1>\n<table>\n"
    );

    if request_path != "/" {
        let parent = parent_href(request_path);
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{}\">../</a></td><td></td></tr>",
            escape_html(&parent)
        );
    }

    for entry in &entries {
        let slash = if entry.is_dir { "/" } else { "" };
        let href = format!("{request_path}{}{slash}", encode_segment(&entry.name));
        let size = if entry.is_dir {
            String::new()
        } else {
            entry.size.to_string()
        };
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{}\">{}{slash}</a></td><td>{size}</td></tr>",
            escape_html(&href),
            escape_html(&entry.name)
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    Ok(html)
}

/// `/a/b/` → `/a/`
fn parent_href(request_path: &str) -> String {
    let trimmed = request_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => trimmed[..=i].to_string(),
        None => "/".to_string(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file"), "hello").unwrap();
        std::fs::write(dir.path().join("a<b>.txt"), "").unwrap();
        std::fs::write(dir.path().join(".hidden"), "").unwrap();
        std::fs::create_dir(dir.path().join("zdir")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_listing_links_are_absolute() {
        let dir = fixture();
        let html = render_listing(dir.path(), "/", false).await.unwrap();

        assert!(html.contains("href=\"/file\""));
        assert!(html.contains("href=\"/zdir/\""));
        assert!(!html.contains(".hidden"));
        assert!(!html.contains("../"));
        // Directories are listed before files
        assert!(html.find("/zdir/").unwrap() < html.find("/file").unwrap());
    }

    #[tokio::test]
    async fn test_listing_escapes_names() {
        let dir = fixture();
        let html = render_listing(dir.path(), "/sub/", true).await.unwrap();

        assert!(html.contains("a&lt;b&gt;.txt"));
        assert!(html.contains("href=\"/sub/a%3Cb%3E.txt\""));
        assert!(html.contains(".hidden"));
        assert!(html.contains("href=\"/\">../"));
    }

    #[test]
    fn test_parent_href() {
        assert_eq!(parent_href("/a/b/"), "/a/");
        assert_eq!(parent_href("/a/"), "/");
    }
}
