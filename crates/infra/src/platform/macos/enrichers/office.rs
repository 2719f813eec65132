//! Office application document enrichment using AppleScript.
//!
//! Supports extracting the current document name from:
//! - Microsoft Office: Word, Excel, PowerPoint
//! - Apple iWork: Pages, Numbers, Keynote
//!
//! # Example
//! ```rust,no_run
//! use tokio::runtime::Runtime;
//! use pulsearc_infra::platform::macos::enrichers::office::get_office_document;
//!
//! Runtime::new().unwrap().block_on(async {
//!     if let Some(doc) = get_office_document("com.microsoft.Word", "Microsoft Word").await {
//!         println!("Current document: {doc}");
//!     }
//! });
//! ```

use std::time::Duration;

use super::applescript_helpers::{build_document_name_script, execute_applescript_optional};

/// Default timeout for office AppleScript queries (2 seconds).
const OFFICE_SCRIPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Mapping of bundle IDs to office application names for document extraction.
///
/// This list covers Microsoft Office and Apple iWork suite apps.
/// Order matters: checked in sequence for fallback matching.
const OFFICE_MAPPINGS: &[(&str, &str)] = &[
    // Microsoft Office
    ("com.microsoft.Word", "Microsoft Word"),
    ("com.microsoft.Excel", "Microsoft Excel"),
    ("com.microsoft.Powerpoint", "Microsoft PowerPoint"),
    // Apple iWork
    ("com.apple.iWork.Pages", "Pages"),
    ("com.apple.iWork.Numbers", "Numbers"),
    ("com.apple.iWork.Keynote", "Keynote"),
];

/// Get the office application name from a bundle ID.
///
/// # Arguments
/// * `bundle_id` - The application bundle identifier
///
/// # Returns
/// * `Some(&str)` - The office app name if recognized
/// * `None` - If the bundle ID is not a known office application
fn get_office_app_name(bundle_id: &str) -> Option<&'static str> {
    OFFICE_MAPPINGS.iter().find(|(bid, _)| *bid == bundle_id).map(|(_, name)| *name)
}

/// Check if a bundle ID represents a known office application.
///
/// # Arguments
/// * `bundle_id` - The application bundle identifier
///
/// # Returns
/// `true` if the bundle ID is a recognized office app
pub fn is_office_app(bundle_id: &str) -> bool {
    get_office_app_name(bundle_id).is_some()
}

/// Get the current document name from an office application using AppleScript.
///
/// This function attempts to extract the frontmost document's name using
/// app-specific AppleScript commands. It handles differences between Microsoft
/// Office and Apple iWork apps and returns None on any failure.
///
/// # Arguments
/// * `bundle_id` - The application's bundle identifier (e.g.,
///   "com.microsoft.Word")
/// * `app_name` - The application's display name (e.g., "Microsoft Word") -
///   used as fallback
///
/// # Returns
/// * `Some(String)` - The document name if successfully extracted
/// * `None` - If app is not recognized, has no open documents, or script fails
///
/// # Note
/// This function is async to allow calling from async contexts, but internally
/// uses blocking AppleScript execution (should be spawned in blocking task).
#[cfg(target_os = "macos")]
pub async fn get_office_document(bundle_id: &str, app_name: &str) -> Option<String> {
    // First, try to get app name from bundle ID mapping
    let office_app_name = get_office_app_name(bundle_id).unwrap_or(app_name);

    tracing::debug!(
        bundle_id = %bundle_id,
        office_app_name = %office_app_name,
        "Attempting to get document from office app"
    );

    // Build the appropriate AppleScript for this app
    let script = build_document_name_script(office_app_name);

    // Execute the script with timeout (this is a blocking operation)
    tokio::task::spawn_blocking(move || {
        execute_applescript_optional(&script, OFFICE_SCRIPT_TIMEOUT, "office document fetch")
    })
    .await
    .ok()
    .flatten()
}

/// Get the current document name from an office application synchronously.
///
/// This is a blocking variant of `get_office_document` for use in synchronous
/// contexts or within `spawn_blocking` tasks.
///
/// # Arguments
/// * `bundle_id` - The application's bundle identifier
/// * `app_name` - The application's display name (fallback)
///
/// # Returns
/// * `Some(String)` - The document name if successfully extracted
/// * `None` - If app is not recognized or script fails
#[cfg(target_os = "macos")]
pub fn get_office_document_sync(bundle_id: &str, app_name: &str) -> Option<String> {
    let office_app_name = get_office_app_name(bundle_id).unwrap_or(app_name);

    tracing::debug!(
        bundle_id = %bundle_id,
        office_app_name = %office_app_name,
        "Attempting to get document from office app (sync)"
    );

    let script = build_document_name_script(office_app_name);
    execute_applescript_optional(&script, OFFICE_SCRIPT_TIMEOUT, "office document fetch")
}
