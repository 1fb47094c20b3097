//! Single `Range: bytes=` request parsing.

/// How much of a resource a `Range` header asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Serve the whole resource (no range, or one we ignore).
    Full,
    /// Inclusive byte offsets.
    Partial { start: u64, end: u64 },
    /// The range lies entirely past the end of the resource.
    Unsatisfiable,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        match self {
            ByteRange::Partial { start, end } => end - start + 1,
            _ => 0,
        }
    }
}

/// Interpret a `Range` header against a resource of `len` bytes.
///
/// Multi-range requests, other units and malformed values are ignored,
/// which means the full resource is served.
pub fn parse_range(header: &str, len: u64) -> ByteRange {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = spec.trim().split_once('-') else {
        return ByteRange::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    // Suffix form: the final `last` bytes
    if first.is_empty() {
        let Ok(suffix) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || len == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial {
            start: len.saturating_sub(suffix),
            end: len - 1,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            _ => return ByteRange::Full,
        }
    };

    if start >= len {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial {
        start,
        end: end.map_or(len - 1, |end| end.min(len - 1)),
    }
}
