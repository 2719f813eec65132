//! Time entry suggestions and proposed blocks commands

use std::sync::Arc;
use std::time::Instant;

use pulsearc_domain::Result;
use serde::{Deserialize, Serialize};
use tauri::State;
use tracing::info;

use crate::utils::logging::{log_command_execution, record_command_metric};
use crate::AppContext;

/// Outbox entry for time suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryOutbox {
    pub id: String,
    pub status: String,
    // Additional fields would be added as needed
}

/// Proposed time block (30+ min consolidated block)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedBlock {
    pub id: String,
    pub day_epoch: i64,
    pub status: String,
    pub start_time: i64,
    pub end_time: i64,
    // Additional fields would be added as needed
}

/// Get dismissed time entry suggestions
#[tauri::command]
pub async fn get_dismissed_suggestions(
    ctx: State<'_, Arc<AppContext>>,
) -> Result<Vec<TimeEntryOutbox>> {
    let command_name = "suggestions::get_dismissed_suggestions";
    let implementation = "new";
    let start = Instant::now();
    let app_ctx = Arc::clone(ctx.inner());

    info!(command = command_name, "Fetching dismissed suggestions");
    // TODO: Implement dismissed suggestions fetching from database
    let result = Ok(vec![]);
    let elapsed = start.elapsed();

    log_command_execution(command_name, implementation, elapsed, true);
    record_command_metric(&app_ctx, command_name, implementation, elapsed, true, None).await;

    result
}

/// Get proposed time blocks for a specific day
#[tauri::command]
pub async fn get_proposed_blocks(
    ctx: State<'_, Arc<AppContext>>,
    day_epoch: i64,
    status: Option<String>,
) -> Result<Vec<ProposedBlock>> {
    let command_name = "suggestions::get_proposed_blocks";
    let implementation = "new";
    let start = Instant::now();
    let app_ctx = Arc::clone(ctx.inner());

    info!(
        command = command_name,
        day_epoch,
        status = ?status,
        "Fetching proposed blocks"
    );
    // TODO: Implement proposed blocks fetching from database
    // This should return consolidated 30+ minute activity blocks
    let result = Ok(vec![]);
    let elapsed = start.elapsed();

    log_command_execution(command_name, implementation, elapsed, true);
    record_command_metric(&app_ctx, command_name, implementation, elapsed, true, None).await;

    result
}

/// Get outbox status (legacy time entry suggestions)
#[tauri::command]
pub async fn get_outbox_status(ctx: State<'_, Arc<AppContext>>) -> Result<Vec<TimeEntryOutbox>> {
    let command_name = "suggestions::get_outbox_status";
    let implementation = "new";
    let start = Instant::now();
    let app_ctx = Arc::clone(ctx.inner());

    info!(command = command_name, "Fetching outbox status");
    // TODO: Implement outbox status fetching from database
    let result = Ok(vec![]);
    let elapsed = start.elapsed();

    log_command_execution(command_name, implementation, elapsed, true);
    record_command_metric(&app_ctx, command_name, implementation, elapsed, true, None).await;

    result
}
