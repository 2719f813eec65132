//! Calendar integration commands

use std::sync::Arc;
use std::time::Instant;

use pulsearc_domain::Result;
use serde::{Deserialize, Serialize};
use tauri::State;
use tracing::info;

use crate::utils::logging::{log_command_execution, record_command_metric};
use crate::AppContext;

/// Calendar event for timeline display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineCalendarEvent {
    pub id: String,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub is_all_day: bool,
    // Additional fields as needed
}

/// Get calendar events for timeline within date range
#[tauri::command]
pub async fn get_calendar_events_for_timeline(
    ctx: State<'_, Arc<AppContext>>,
    start_date: i64,
    end_date: i64,
) -> Result<Vec<TimelineCalendarEvent>> {
    let command_name = "calendar::get_calendar_events_for_timeline";
    let implementation = "new";
    let start = Instant::now();
    let app_ctx = Arc::clone(ctx.inner());

    info!(command = command_name, start_date, end_date, "Fetching calendar events for timeline");
    // TODO: Implement calendar event fetching
    // Should integrate with macOS Calendar/EventKit
    let result = Ok(vec![]);
    let elapsed = start.elapsed();

    log_command_execution(command_name, implementation, elapsed, true);
    record_command_metric(&app_ctx, command_name, implementation, elapsed, true, None).await;

    result
}
