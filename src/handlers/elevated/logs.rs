// handlers/elevated/logs.rs - GET /api/admin/logs, GET /api/admin/logs/ws

use axum::{
    extract::{ws::WebSocketUpgrade, Query},
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::config::config;
use crate::error::ApiError;
use crate::logging::current_log_file;
use crate::logview::{clamp_lines, tail_lines, ws::stream_logs};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TailQuery {
    pub lines: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogTail {
    pub file: String,
    pub lines: Vec<String>,
}

pub async fn tail(Query(query): Query<TailQuery>) -> ApiResult<LogTail> {
    let count = clamp_lines(query.lines);
    let path = current_log_file(&config().logging);
    let file = path.display().to_string();

    let lines = tokio::task::spawn_blocking(move || tail_lines(&path, count))
        .await
        .map_err(|e| {
            tracing::error!("Log tail task failed: {}", e);
            ApiError::internal_server_error("Could not read the log file")
        })?
        .map_err(|e| {
            tracing::error!("Could not read log file: {}", e);
            ApiError::internal_server_error("Could not read the log file")
        })?;

    Ok(ApiResponse::success(LogTail { file, lines }))
}

/// Live tail; the backlog size follows the same `lines` parameter
pub async fn stream(ws: WebSocketUpgrade, Query(query): Query<TailQuery>) -> Response {
    let backlog = clamp_lines(query.lines);
    tracing::info!(backlog, "Log viewer connected");
    ws.on_upgrade(move |socket| stream_logs(socket, || current_log_file(&config().logging), backlog))
}
