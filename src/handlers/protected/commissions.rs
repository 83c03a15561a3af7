// handlers/protected/commissions.rs - /api/boards/:id/commissions, /api/commissions/:id

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{Commission, CommissionInput};
use crate::database::Page;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CommissionService;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Commission>> {
    let page = CommissionService::new(state.pool.clone())
        .list_for_board(board_id, query.into_filter())
        .await?;
    Ok(ApiResponse::success(page))
}

pub async fn create(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CommissionInput>,
) -> ApiResult<Commission> {
    Ok(ApiResponse::created(CommissionService::new(state.pool.clone()).create(board_id, input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Commission> {
    Ok(ApiResponse::success(CommissionService::new(state.pool.clone()).get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CommissionInput>,
) -> ApiResult<Commission> {
    Ok(ApiResponse::success(CommissionService::new(state.pool.clone()).update(id, input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    CommissionService::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
