/// Timestamp token used when a message has no usable Date header.
const UNKNOWN_TIMESTAMP: &str = "unknown";
const EML_EXTENSION: &str = ".eml";

/// Deterministic `<timestamp> <subject>.eml` name, sanitized as a whole.
///
/// `("2024-03-26 15:30:15", "Re: Q1")` yields `2024-03-26_153015 Re_ Q1.eml`.
pub fn canonical_filename(sent_date: &str, subject: &str) -> String {
    let timestamp = timestamp_token(sent_date);
    sanitize_filename(&format!("{timestamp} {subject}{EML_EXTENSION}"))
}

/// `YYYY-MM-DD HH:MM:SS` becomes `YYYY-MM-DD_HHMMSS`; empty becomes `unknown`.
///
/// A value without a date/time separator is returned unchanged.
pub fn timestamp_token(sent_date: &str) -> String {
    if sent_date.is_empty() {
        return UNKNOWN_TIMESTAMP.to_string();
    }
    match sent_date.split_once(' ') {
        Some((date, rest)) => {
            // Only the first field after the date is the time of day.
            let time = rest.split(' ').next().unwrap_or_default();
            format!("{date}_{}", time.replace(':', ""))
        }
        None => sent_date.to_string(),
    }
}

/// Replaces every character that is invalid in common file systems with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

/// Inserts ` (n)` before the `.eml` extension: `a.eml` -> `a (2).eml`.
pub fn suffixed_filename(name: &str, n: usize) -> String {
    match name.strip_suffix(EML_EXTENSION) {
        Some(stem) => format!("{stem} ({n}){EML_EXTENSION}"),
        None => format!("{name} ({n})"),
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}
