//! Best-effort extraction of a JSON payload from model output.
//!
//! Generation responses wrap JSON in markdown fences, lead-in prose, or
//! both, and occasionally emit trailing commas or stray backslashes that
//! break strict parsing. `sanitize` never fails; callers attempt
//! `serde_json` parsing on the result and handle failure themselves.

use regex::Regex;

/// Reduces raw model output to a best-effort JSON string.
///
/// Extraction order:
/// 1. the first fenced block (```json … ``` or bare ``` … ```), if any;
/// 2. otherwise the substring from the first `{` to the last `}`;
/// 3. otherwise the trimmed input unchanged.
///
/// The extracted text then has ASCII control characters (except newline and
/// tab) removed, trailing commas before `}`/`]` dropped, and stray
/// backslashes re-escaped. Idempotent on output that already parses as JSON.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let candidate = extract_candidate(raw);
    let cleaned = strip_control_chars(&candidate);
    let cleaned = escape_stray_backslashes(&cleaned);
    let cleaned = strip_trailing_commas(&cleaned);
    cleaned.trim().to_owned()
}

/// Pulls the most JSON-looking region out of the raw text.
fn extract_candidate(raw: &str) -> String {
    let fence = Regex::new(r"(?s)```(?:[jJ][sS][oO][nN])?\s*(.*?)```").expect("valid regex");
    if let Some(captures) = fence.captures(raw) {
        // Multiple fenced blocks: only the first is used.
        return captures[1].to_owned();
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            return raw[start..=end].to_owned();
        }
    }

    raw.trim().to_owned()
}

fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Removes commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let re = Regex::new(r",\s*([}\]])").expect("valid regex");
    re.replace_all(text, "$1").into_owned()
}

/// Doubles backslashes that do not begin a valid JSON escape sequence.
fn escape_stray_backslashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => {
                out.push('\\');
                // Copy the escape introducer; the remainder flows through the
                // outer loop unchanged.
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            _ => {
                out.push('\\');
                out.push('\\');
            }
        }
    }

    out
}
