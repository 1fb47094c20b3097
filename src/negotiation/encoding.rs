//! `Accept-Encoding` negotiation for precompressed variants.

/// Content codings the asset server can serve from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Brotli,
    Gzip,
}

impl Encoding {
    /// The `Content-Encoding` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Brotli => "br",
            Encoding::Gzip => "gzip",
        }
    }

    /// Suffix of the precompressed file next to the original.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Encoding::Brotli => ".br",
            Encoding::Gzip => ".gz",
        }
    }
}

/// Pick the best of `available` for an `Accept-Encoding` header.
///
/// Codings are ranked by q-value; equal q-values keep the order of
/// `available`, so listing brotli first prefers it when both are acceptable.
/// A missing header accepts only `identity`.
pub fn preferred_encoding(accept_encoding: Option<&str>, available: &[Encoding]) -> Option<Encoding> {
    let header = accept_encoding?;

    let mut explicit: Vec<(String, f32)> = Vec::new();
    let mut wildcard: Option<f32> = None;

    for part in header.split(',') {
        let mut pieces = part.split(';');
        let coding = pieces.next().unwrap_or("").trim().to_ascii_lowercase();
        if coding.is_empty() {
            continue;
        }
        let q = pieces
            .filter_map(|p| p.trim().strip_prefix("q="))
            .next()
            .map(|v| v.trim().parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0))
            .unwrap_or(1.0);

        if coding == "*" {
            wildcard = Some(q);
        } else {
            explicit.push((coding, q));
        }
    }

    let mut best: Option<(Encoding, f32)> = None;
    for encoding in available {
        let q = explicit
            .iter()
            .find(|(coding, _)| coding == encoding.as_str() || (*encoding == Encoding::Gzip && coding == "x-gzip"))
            .map(|(_, q)| *q)
            .or(wildcard)
            .unwrap_or(0.0);

        if q > 0.0 && best.map_or(true, |(_, best_q)| q > best_q) {
            best = Some((*encoding, q));
        }
    }

    best.map(|(encoding, _)| encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: &[Encoding] = &[Encoding::Brotli, Encoding::Gzip];

    #[test]
    fn test_single_coding() {
        assert_eq!(preferred_encoding(Some("br"), BOTH), Some(Encoding::Brotli));
        assert_eq!(preferred_encoding(Some("gzip"), BOTH), Some(Encoding::Gzip));
        assert_eq!(preferred_encoding(Some("deflate"), BOTH), None);
    }

    #[test]
    fn test_brotli_preferred_on_tie() {
        assert_eq!(preferred_encoding(Some("gzip, br"), BOTH), Some(Encoding::Brotli));
        assert_eq!(preferred_encoding(Some("gzip, deflate, br"), BOTH), Some(Encoding::Brotli));
    }

    #[test]
    fn test_quality_values() {
        assert_eq!(preferred_encoding(Some("br;q=0.5, gzip"), BOTH), Some(Encoding::Gzip));
        assert_eq!(preferred_encoding(Some("gzip;q=0"), BOTH), None);
        assert_eq!(preferred_encoding(Some("*, br;q=0"), BOTH), Some(Encoding::Gzip));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(preferred_encoding(None, BOTH), None);
    }

    #[test]
    fn test_only_available_codings() {
        assert_eq!(preferred_encoding(Some("gzip, br"), &[Encoding::Gzip]), Some(Encoding::Gzip));
        assert_eq!(preferred_encoding(Some("br"), &[Encoding::Gzip]), None);
    }
}
