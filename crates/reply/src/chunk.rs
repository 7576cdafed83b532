use crate::segment::find_boundary;

/// Default per-segment size limit in bytes, conservative enough for
/// concatenated-SMS delivery with room for carrier overhead.
pub const DEFAULT_MAX_SEGMENT_LEN: usize = 1500;

/// One size-bounded slice of a generated reply, ready for individual
/// delivery. Transient: segments live for the duration of one request
/// and are persisted only as the bodies of outbound message records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub body: String,
    /// 1-based position within the reply.
    pub position: usize,
    /// Total number of segments the reply produced.
    pub total: usize,
}

/// Planner options.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Maximum segment body length in bytes.
    pub max_len: usize,
    /// When true, the planner reserves the `"(i/N) "` prefix width
    /// before splitting so every numbered body stays within `max_len`.
    /// When false (default), prefixes are applied after the
    /// length-bounded split and a numbered segment may exceed `max_len`
    /// by the prefix width.
    pub reserve_prefix_width: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_SEGMENT_LEN,
            reserve_prefix_width: false,
        }
    }
}

/// Split `text` into segments of at most `max_len` bytes, numbering them
/// with a `"(i/N) "` prefix when more than one is produced.
///
/// Empty input produces zero segments: nothing to send, not an error.
pub fn plan(text: &str, max_len: usize) -> Vec<Segment> {
    plan_with(text, &PlanOptions {
        max_len,
        reserve_prefix_width: false,
    })
}

/// [`plan`] with explicit options.
pub fn plan_with(text: &str, options: &PlanOptions) -> Vec<Segment> {
    if options.max_len == 0 || text.is_empty() {
        return Vec::new();
    }

    if text.len() <= options.max_len {
        return vec![Segment {
            body: text.to_string(),
            position: 1,
            total: 1,
        }];
    }

    let bodies = if options.reserve_prefix_width {
        split_reserving_prefix(text, options.max_len)
    } else {
        split_bodies(text, options.max_len)
    };

    number_segments(bodies)
}

/// Cursor loop over the remaining text: while the remainder is longer
/// than `max_len`, cut at the best boundary and trim the whitespace the
/// cut consumed from the new remainder.
fn split_bodies(text: &str, max_len: usize) -> Vec<String> {
    let mut bodies = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            bodies.push(remaining.to_string());
            break;
        }

        let cut = find_boundary(remaining, max_len);
        bodies.push(remaining[..cut].to_string());
        remaining = remaining[cut..].trim_start();
    }

    bodies
}

/// Split against a reduced limit so numbered bodies never exceed
/// `max_len`. The part count is not known until after splitting, so the
/// prefix width is estimated from a length-based count and the split is
/// re-run until the estimate covers the actual count.
fn split_reserving_prefix(text: &str, max_len: usize) -> Vec<String> {
    let mut estimate = text.len().div_ceil(max_len).max(2);
    loop {
        let usable = max_len.saturating_sub(prefix_width(estimate)).max(1);
        let bodies = split_bodies(text, usable);
        let total = bodies.len().max(2);
        if prefix_width(total) <= prefix_width(estimate) {
            return bodies;
        }
        estimate = total;
    }
}

fn number_segments(bodies: Vec<String>) -> Vec<Segment> {
    let total = bodies.len();
    bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let position = i + 1;
            let body = if total >= 2 {
                format!("({position}/{total}) {body}")
            } else {
                body
            };
            Segment {
                body,
                position,
                total,
            }
        })
        .collect()
}

/// Width in bytes of the widest `"(i/N) "` prefix for `total` parts.
fn prefix_width(total: usize) -> usize {
    decimal_digits(total) * 2 + 4
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
