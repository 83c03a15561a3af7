// handlers/protected/boards.rs - /api/boards

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{Board, BoardDetail, BoardInput, BoardSearch, BoardStatusChange};
use crate::database::Page;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::BoardService;
use crate::state::AppState;

/// GET /api/boards?name=&registration_number=&status=&board_type=&place_id=&institution_id=
pub async fn list(State(state): State<AppState>, Query(search): Query<BoardSearch>) -> ApiResult<Page<Board>> {
    Ok(ApiResponse::success(BoardService::new(state.pool.clone()).search(search).await?))
}

/// POST /api/boards/find - full filter language over the board columns
pub async fn find(State(state): State<AppState>, Json(filter): Json<FilterData>) -> ApiResult<Page<Board>> {
    Ok(ApiResponse::success(BoardService::new(state.pool.clone()).list(filter).await?))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<BoardInput>) -> ApiResult<Board> {
    Ok(ApiResponse::created(BoardService::new(state.pool.clone()).create(input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<BoardDetail> {
    Ok(ApiResponse::success(BoardService::new(state.pool.clone()).detail(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BoardInput>,
) -> ApiResult<Board> {
    Ok(ApiResponse::success(BoardService::new(state.pool.clone()).update(id, input).await?))
}

/// PUT /api/boards/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<BoardStatusChange>,
) -> ApiResult<Board> {
    Ok(ApiResponse::success(BoardService::new(state.pool.clone()).change_status(id, change).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    BoardService::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
