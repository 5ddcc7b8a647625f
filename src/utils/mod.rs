use lazy_static::lazy_static;
use regex::Regex;

pub mod logging;

lazy_static! {
    // Ordered by specificity; the first match wins.
    static ref MEETING_LINK_PATTERNS: Vec<Regex> = [
        r"https://meet\.google\.com/[a-z]{3}-[a-z]{4}-[a-z]{3}",
        r"https://meet\.google\.com/[A-Za-z0-9_-]+",
        r"https://[A-Za-z0-9.-]*zoom\.us/(?:j|my|s)/[^\s<>]+",
        r"https://teams\.microsoft\.com/l/meetup-join/[^\s<>]+",
        r"https://teams\.live\.com/meet/[^\s<>]+",
        r"https://[A-Za-z0-9.-]*webex\.com/[^\s<>]+",
        r"https://meet\.jit\.si/[^\s<>]+",
        r"https://[A-Za-z0-9.-]*whereby\.com/[^\s<>]+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect();
}

/// Finds the first video-meeting URL in an event's location or description.
pub fn extract_meeting_link(location: Option<&str>, description: Option<&str>) -> Option<String> {
    let combined_text = format!("{} {}", location.unwrap_or(""), description.unwrap_or(""));

    MEETING_LINK_PATTERNS
        .iter()
        .find_map(|regex| regex.find(&combined_text))
        .map(|found| found.as_str().trim_end_matches(['.', ',', ')', '"']).to_string())
}

pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => "(No title)".to_string(),
    }
}
