//! `Accept` header negotiation.
//!
//! # Responsibilities
//! - Parse media ranges with parameters and quality values
//! - Pick the best candidate type for a request
//!
//! # Design Decisions
//! - A missing header accepts everything (`*/*`)
//! - Malformed ranges are dropped rather than failing the request
//! - The most specific matching range decides a candidate's quality

/// Chooses a media type from the ones a resource is available in.
pub trait ContentNegotiator: Send + Sync {
    /// Best candidate for the `Accept` header, or `None` when nothing is acceptable.
    fn select(&self, accept: Option<&str>, candidates: &[&str]) -> Option<String>;

    /// True when the client accepts any type (`*/*`, or no header at all).
    fn accepts_any(&self, accept: Option<&str>) -> bool;
}

/// Quality-value and specificity based negotiator.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityNegotiator;

impl ContentNegotiator for QualityNegotiator {
    fn select(&self, accept: Option<&str>, candidates: &[&str]) -> Option<String> {
        let ranges = parse_accept(accept);

        let mut ranked: Vec<(Priority, usize, &str)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, candidate)| {
                let media = MediaType::parse(candidate)?;
                let priority = best_priority(&media, &ranges)?;
                (priority.q > 0.0).then_some((priority, i, *candidate))
            })
            .collect();

        ranked.sort_by(|(a, ai, _), (b, bi, _)| {
            b.q.total_cmp(&a.q)
                .then(b.specificity.cmp(&a.specificity))
                .then(a.position.cmp(&b.position))
                .then(ai.cmp(bi))
        });

        ranked.first().map(|(_, _, candidate)| candidate.to_string())
    }

    fn accepts_any(&self, accept: Option<&str>) -> bool {
        parse_accept(accept)
            .iter()
            .any(|range| range.media.kind == "*" && range.media.subtype == "*" && range.q > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MediaType {
    kind: String,
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if !is_token(kind) || !is_token(subtype) {
            return None;
        }

        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                Some((
                    name.trim().to_ascii_lowercase(),
                    value.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();

        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }
}

#[derive(Debug, Clone)]
struct MediaRange {
    media: MediaType,
    q: f32,
    position: usize,
}

#[derive(Debug, Clone, Copy)]
struct Priority {
    q: f32,
    specificity: u8,
    position: usize,
}

fn parse_accept(accept: Option<&str>) -> Vec<MediaRange> {
    let header = accept.unwrap_or("*/*");

    header
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .enumerate()
        .filter_map(|(position, part)| {
            let mut media = MediaType::parse(part)?;
            let mut q = 1.0;
            // Parameters after `q` are accept-extensions, not media type parameters
            if let Some(q_at) = media.params.iter().position(|(name, _)| name == "q") {
                q = media.params[q_at].1.parse::<f32>().ok()?.clamp(0.0, 1.0);
                media.params.truncate(q_at);
            }
            Some(MediaRange { media, q, position })
        })
        .collect()
}

fn best_priority(candidate: &MediaType, ranges: &[MediaRange]) -> Option<Priority> {
    let mut best: Option<Priority> = None;

    for range in ranges {
        let Some(specificity) = match_specificity(candidate, &range.media) else {
            continue;
        };
        let priority = Priority {
            q: range.q,
            specificity,
            position: range.position,
        };
        let better = match best {
            None => true,
            Some(current) => {
                specificity > current.specificity
                    || (specificity == current.specificity && priority.q > current.q)
            }
        };
        if better {
            best = Some(priority);
        }
    }

    best
}

/// Specificity bits: 4 = exact type, 2 = exact subtype, 1 = parameters matched.
fn match_specificity(candidate: &MediaType, range: &MediaType) -> Option<u8> {
    let mut specificity = 0;

    if range.kind == candidate.kind {
        specificity |= 4;
    } else if range.kind != "*" {
        return None;
    }

    if range.subtype == candidate.subtype {
        specificity |= 2;
    } else if range.subtype != "*" {
        return None;
    }

    if !range.params.is_empty() {
        let all_match = range.params.iter().all(|(name, value)| {
            candidate
                .params
                .iter()
                .any(|(n, v)| n == name && v.eq_ignore_ascii_case(value))
        });
        if !all_match {
            return None;
        }
        specificity |= 1;
    }

    Some(specificity)
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
