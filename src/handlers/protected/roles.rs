// handlers/protected/roles.rs - GET /api/roles

use axum::extract::State;

use crate::database::models::RoleRecord;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RoleService;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RoleRecord>> {
    Ok(ApiResponse::success(RoleService::new(state.pool.clone()).list().await?))
}
