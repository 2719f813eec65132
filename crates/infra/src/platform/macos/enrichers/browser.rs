//! Browser URL enrichment using AppleScript.
//!
//! Supports extracting the current URL from:
//! - Safari (including Technology Preview)
//! - Google Chrome
//! - Firefox (Developer Edition, Nightly)
//! - Microsoft Edge
//! - Brave Browser
//! - Arc
//!
//! # Example
//! ```rust,no_run
//! let url = get_browser_url("com.apple.Safari", "Safari").await;
//! if let Some(url) = url {
//!     println!("Current URL: {url}");
//! }
//! ```

use std::time::Duration;

use super::applescript_helpers::{build_browser_url_script, execute_applescript_optional};

/// Default timeout for browser AppleScript queries (2 seconds).
const BROWSER_SCRIPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Mapping of bundle IDs to browser names for URL extraction.
///
/// This list covers the major browsers with AppleScript support.
/// Order matters: checked in sequence for fallback matching.
const BROWSER_MAPPINGS: &[(&str, &str)] = &[
    // Safari
    ("com.apple.Safari", "Safari"),
    ("com.apple.SafariTechnologyPreview", "Safari Technology Preview"),
    // Chrome-based browsers
    ("com.google.Chrome", "Google Chrome"),
    ("org.chromium.Chromium", "Chromium"),
    ("com.microsoft.edgemac", "Microsoft Edge"),
    ("com.brave.Browser", "Brave Browser"),
    ("company.thebrowser.Browser", "Arc"),
    // Firefox-based browsers
    ("org.mozilla.firefox", "Firefox"),
    ("org.mozilla.firefoxdeveloperedition", "Firefox Developer Edition"),
    ("org.mozilla.nightly", "Firefox Nightly"),
];

/// Get the browser name from a bundle ID.
///
/// # Arguments
/// * `bundle_id` - The application bundle identifier
///
/// # Returns
/// * `Some(&str)` - The browser application name if recognized
/// * `None` - If the bundle ID is not a known browser
fn get_browser_name(bundle_id: &str) -> Option<&'static str> {
    BROWSER_MAPPINGS.iter().find(|(bid, _)| *bid == bundle_id).map(|(_, name)| *name)
}

/// Check if a bundle ID represents a known browser.
///
/// # Arguments
/// * `bundle_id` - The application bundle identifier
///
/// # Returns
/// `true` if the bundle ID is a recognized browser
pub fn is_browser(bundle_id: &str) -> bool {
    get_browser_name(bundle_id).is_some()
}

/// Get the current URL from a browser using AppleScript.
///
/// This function attempts to extract the frontmost tab's URL using
/// browser-specific AppleScript commands. It handles different browsers'
/// quirks and returns None on any failure (permission denied, no windows,
/// etc.).
///
/// # Arguments
/// * `bundle_id` - The browser's bundle identifier (e.g., "com.apple.Safari")
/// * `app_name` - The browser's display name (e.g., "Safari") - used as
///   fallback
///
/// # Returns
/// * `Some(String)` - The URL if successfully extracted
/// * `None` - If browser is not recognized, has no windows, or script fails
///
/// # Note
/// This function is async to allow calling from async contexts, but internally
/// uses blocking AppleScript execution (should be spawned in blocking task).
#[cfg(target_os = "macos")]
pub async fn get_browser_url(bundle_id: &str, app_name: &str) -> Option<String> {
    // First, try to get browser name from bundle ID mapping
    let browser_name = get_browser_name(bundle_id).unwrap_or(app_name);

    tracing::debug!(
        bundle_id = %bundle_id,
        browser_name = %browser_name,
        "Attempting to get URL from browser"
    );

    // Build the appropriate AppleScript for this browser
    let script = build_browser_url_script(browser_name);

    // Execute the script with timeout (this is a blocking operation)
    tokio::task::spawn_blocking(move || {
        execute_applescript_optional(&script, BROWSER_SCRIPT_TIMEOUT, "browser URL fetch")
    })
    .await
    .ok()
    .flatten()
}

/// Get the current URL from a browser synchronously.
///
/// This is a blocking variant of `get_browser_url` for use in synchronous
/// contexts or within `spawn_blocking` tasks.
///
/// # Arguments
/// * `bundle_id` - The browser's bundle identifier
/// * `app_name` - The browser's display name (fallback)
///
/// # Returns
/// * `Some(String)` - The URL if successfully extracted
/// * `None` - If browser is not recognized or script fails
#[cfg(target_os = "macos")]
pub fn get_browser_url_sync(bundle_id: &str, app_name: &str) -> Option<String> {
    let browser_name = get_browser_name(bundle_id).unwrap_or(app_name);

    tracing::debug!(
        bundle_id = %bundle_id,
        browser_name = %browser_name,
        "Attempting to get URL from browser (sync)"
    );

    let script = build_browser_url_script(browser_name);
    execute_applescript_optional(&script, BROWSER_SCRIPT_TIMEOUT, "browser URL fetch")
}
