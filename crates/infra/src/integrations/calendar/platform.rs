//! Meeting platform detection helpers.

/// Detect meeting platform from event title, description, or hangout link.
///
/// Checks indicators in the following order:
/// 1. Google Meet hangout link
/// 2. Zoom URLs or keywords
/// 3. Microsoft Teams URLs or keywords
/// 4. Phone / dial-in keywords
#[must_use]
pub fn detect_meeting_platform(
    title: Option<&str>,
    description: Option<&str>,
    hangout_link: Option<&str>,
) -> Option<String> {
    if hangout_link.is_some() {
        return Some("google_meet".to_string());
    }

    let combined =
        format!("{} {}", title.unwrap_or_default(), description.unwrap_or_default()).to_lowercase();

    if combined.contains("meet.google.com") {
        return Some("google_meet".to_string());
    }
    if combined.contains("zoom.us") || combined.contains("zoom") {
        return Some("zoom".to_string());
    }
    if combined.contains("teams.microsoft.com") || combined.contains("microsoft teams") {
        return Some("teams".to_string());
    }
    if combined.contains("phone") || combined.contains("dial-in") {
        return Some("phone".to_string());
    }

    None
}
