//! Text normalization shared by export, analytics, and suggestion matching.

pub mod csv;

use std::sync::OnceLock;

use regex::Regex;

fn markup_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"))
}

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*h").expect("valid hours pattern"))
}

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*m").expect("valid minutes pattern"))
}

/// Removes embedded markup tags from a rich-text field, leaving plain text.
/// Used wherever plain text is required: CSV export, suggestion matching,
/// search, analytics.
pub fn strip_markup(raw: &str) -> String {
    markup_tag_re().replace_all(raw, "").trim().to_string()
}

/// Collapses a duration expression into integer minutes.
///
/// The mini-language: segments joined by `+`; within a segment an hour count
/// carries a trailing `h` and a minute count a trailing `m` (`"1h 30m"`,
/// `"45m"`, `"20+25"`). A segment with neither suffix contributes any bare
/// digit run it contains.
pub fn duration_minutes(raw: &str) -> u32 {
    let mut total: u32 = 0;
    for segment in raw.split('+') {
        let segment = segment.trim().to_lowercase();
        if segment.is_empty() {
            continue;
        }
        let mut matched = false;
        if let Some(caps) = hours_re().captures(&segment) {
            if let Ok(hours) = caps[1].parse::<u32>() {
                total = total.saturating_add(hours.saturating_mul(60));
                matched = true;
            }
        }
        if let Some(caps) = minutes_re().captures(&segment) {
            if let Ok(minutes) = caps[1].parse::<u32>() {
                total = total.saturating_add(minutes);
                matched = true;
            }
        }
        if !matched {
            let digits: String = segment.chars().filter(|c| c.is_ascii_digit()).collect();
            if let Ok(value) = digits.parse::<u32>() {
                total = total.saturating_add(value);
            }
        }
    }
    total
}
