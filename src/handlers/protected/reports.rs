// handlers/protected/reports.rs - GET /api/reports/boards, GET /api/reports/boards/:id/officers

use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::BoardStatus;
use crate::error::ApiError;
use crate::middleware::{sanitize_filename, FileDownload};
use crate::reports::{self, registry, ReportFormat, ReportTable};
use crate::services::{BoardService, OfficerService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BoardReportQuery {
    pub format: Option<String>,
    pub status: Option<BoardStatus>,
    pub place_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RosterReportQuery {
    pub format: Option<String>,
    /// Former officers are listed unless this is set
    #[serde(default)]
    pub active_only: bool,
}

fn parse_format(format: Option<&str>) -> Result<ReportFormat, ApiError> {
    Ok(format.unwrap_or("xlsx").parse::<ReportFormat>()?)
}

async fn render(table: ReportTable, format: ReportFormat, stem: &str) -> Result<FileDownload, ApiError> {
    let bytes = tokio::task::spawn_blocking(move || reports::render(&table, format))
        .await
        .map_err(|e| {
            tracing::error!("Report rendering task failed: {}", e);
            ApiError::internal_server_error("Could not render the document")
        })??;

    let filename = sanitize_filename(&format!("{}-{}.{}", stem, Utc::now().format("%Y%m%d"), format.extension()));
    Ok(FileDownload::attachment(bytes, format.content_type(), filename))
}

pub async fn boards(State(state): State<AppState>, Query(query): Query<BoardReportQuery>) -> Result<FileDownload, ApiError> {
    let format = parse_format(query.format.as_deref())?;
    let boards = BoardService::new(state.pool.clone()).report(query.status, query.place_id).await?;
    tracing::info!(rows = boards.len(), format = format.extension(), "Board report requested");

    let table = registry::board_listing(&boards, query.status, Utc::now().date_naive());
    render(table, format, "juntas").await
}

pub async fn officers(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<RosterReportQuery>,
) -> Result<FileDownload, ApiError> {
    let format = parse_format(query.format.as_deref())?;
    let detail = BoardService::new(state.pool.clone()).detail(board_id).await?;
    let officers = OfficerService::new(state.pool.clone()).roster(board_id, query.active_only).await?;

    let table = registry::officer_roster(&detail, &officers, Utc::now().date_naive());
    render(table, format, &format!("dignatarios-{}", detail.board.registration_number)).await
}
