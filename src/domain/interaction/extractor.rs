//! JSON extraction and repair for agent completions.
//!
//! Agents usually answer with bare JSON, sometimes wrap it in a markdown
//! fence, and occasionally get cut off by their length limit. Extraction
//! isolates the payload, parses it, and on failure applies two repairs:
//! trimming a dangling trailing element and closing whatever containers are
//! still open. Interior corruption such as a missing colon is reported as
//! unrepairable.

use serde_json::Value;

use super::errors::ExtractionError;

/// Upper bound on truncation points tried before giving up.
pub const MAX_REPAIR_ATTEMPTS: usize = 32;

/// Upper bound on bracketed regions tried as the payload start.
pub const MAX_PAYLOAD_STARTS: usize = 8;

/// JSON payload recovered from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedJson {
    /// Syntactically valid JSON text.
    pub text: String,
    /// The parsed value of `text`.
    pub value: Value,
    /// True when the text differs from the (trimmed) payload that was received.
    pub repaired: bool,
}

/// Extracts a JSON payload from raw completion text, repairing truncation.
///
/// # Steps
/// 1. Use the body of a ```json fence when present, otherwise the whole text
/// 2. Trim surrounding whitespace
/// 3. Parse as-is (the common case)
/// 4. Drop prose before the first `{` or `[` and after the balanced end
/// 5. Close open containers, cutting back to a structural comma if needed
/// 6. When a balanced bracketed region is not JSON, retry after it
pub fn extract_json(raw: &str) -> Result<RepairedJson, ExtractionError> {
    let candidate = fenced_payload(raw).unwrap_or(raw).trim();
    if candidate.is_empty() {
        return Err(ExtractionError::unrepairable(raw));
    }

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(RepairedJson {
            text: candidate.to_string(),
            value,
            repaired: false,
        });
    }

    let mut rest = candidate;
    for _ in 0..MAX_PAYLOAD_STARTS {
        let Some(payload) = locate_payload(rest) else {
            break;
        };
        let state = scan(payload);
        if let Some((text, value)) = state
            .balanced_end
            .and_then(|end| parse_balanced(&payload[..end]))
            .or_else(|| repair_truncated(payload))
        {
            return Ok(RepairedJson {
                text,
                value,
                repaired: true,
            });
        }
        // A balanced region that is not JSON is prose; an unbalanced one
        // owns the rest of the text.
        match state.balanced_end {
            Some(end) => rest = &payload[end..],
            None => break,
        }
    }

    Err(ExtractionError::unrepairable(raw))
}

fn parse_balanced(text: &str) -> Option<(String, Value)> {
    serde_json::from_str::<Value>(text)
        .ok()
        .map(|value| (text.to_string(), value))
}

/// Returns the body of the first JSON code fence.
///
/// A fence tagged `json` wins. An untagged (or differently tagged) fence is
/// only used when its body looks like JSON. A fence with no closing marker
/// (truncated output) runs to the end of the text.
fn fenced_payload(raw: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `raw`.
    let lower = raw.to_ascii_lowercase();
    if let Some(start) = lower.find("```json") {
        return Some(until_closing_fence(&raw[start + "```json".len()..]));
    }

    let start = raw.find("```")?;
    let after_marker = &raw[start + 3..];
    let body = match after_marker.find('\n') {
        Some(newline) => &after_marker[newline + 1..],
        None => after_marker,
    };
    let body = until_closing_fence(body);
    let first = body.trim_start().chars().next()?;
    (first == '{' || first == '[').then_some(body)
}

fn until_closing_fence(body: &str) -> &str {
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Slices from the first `{` or `[`; None when the text has neither.
fn locate_payload(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    Some(text[start..].trim_end())
}

/// Structural summary of a (possibly truncated) JSON text.
#[derive(Debug, Default)]
struct Scan {
    /// Containers still open at the end, innermost last.
    stack: Vec<u8>,
    /// The text ends inside a string literal.
    in_string: bool,
    /// Byte offsets of commas outside string literals.
    commas: Vec<usize>,
    /// Offsets just past each nested (non-root) opener.
    openers: Vec<usize>,
    /// Offset just past the point where the first top-level value closed.
    balanced_end: Option<usize>,
    /// A closer did not match the innermost open container.
    mismatched: bool,
}

/// Walks the text tracking string state and container nesting.
///
/// Works on bytes: every structural character is ASCII and UTF-8
/// continuation bytes never collide with ASCII, so offsets are char
/// boundaries.
fn scan(text: &str) -> Scan {
    let mut result = Scan::default();
    let mut escape_next = false;

    for (i, b) in text.bytes().enumerate() {
        if result.in_string {
            if escape_next {
                escape_next = false;
            } else if b == b'\\' {
                escape_next = true;
            } else if b == b'"' {
                result.in_string = false;
            }
            continue;
        }

        match b {
            b'"' => result.in_string = true,
            b'{' | b'[' => {
                if !result.stack.is_empty() {
                    result.openers.push(i + 1);
                }
                result.stack.push(b);
            }
            b'}' | b']' => {
                let opener = if b == b'}' { b'{' } else { b'[' };
                if result.stack.last() != Some(&opener) {
                    result.mismatched = true;
                    break;
                }
                result.stack.pop();
                if result.stack.is_empty() && result.balanced_end.is_none() {
                    result.balanced_end = Some(i + 1);
                }
            }
            b',' => result.commas.push(i),
            _ => {}
        }
    }

    result
}

/// Closers for the open containers, innermost first.
fn closers(stack: &[u8]) -> String {
    stack
        .iter()
        .rev()
        .map(|open| if *open == b'{' { '}' } else { ']' })
        .collect()
}

/// Tries the text as-is, then cut back to each structural comma or nested
/// opener from the end, closing open containers in nesting order each time.
fn repair_truncated(payload: &str) -> Option<(String, Value)> {
    let full = scan(payload);
    if full.mismatched {
        return None;
    }

    let mut cuts: Vec<usize> = full.commas.iter().chain(&full.openers).copied().collect();
    cuts.sort_unstable_by(|a, b| b.cmp(a));
    cuts.dedup();
    let cut_points = cuts
        .into_iter()
        .take(MAX_REPAIR_ATTEMPTS)
        .map(|cut| &payload[..cut]);

    std::iter::once(payload)
        .chain(cut_points)
        .find_map(close_containers)
}

fn close_containers(prefix: &str) -> Option<(String, Value)> {
    let prefix = prefix.trim_end();
    let state = scan(prefix);
    if state.mismatched || state.in_string || state.stack.is_empty() {
        return None;
    }

    let mut text = String::with_capacity(prefix.len() + state.stack.len());
    text.push_str(prefix);
    text.push_str(&closers(&state.stack));

    serde_json::from_str::<Value>(&text)
        .ok()
        .map(|value| (text, value))
}
