// handlers/protected/officers.rs - /api/boards/:id/officers, /api/officers/:id

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::{Officer, OfficerInput, OfficerPosition};
use crate::database::Page;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::OfficerService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OfficerListQuery {
    pub active: Option<bool>,
    pub position: Option<OfficerPosition>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<OfficerListQuery>,
) -> ApiResult<Page<Officer>> {
    let mut conditions = Map::new();
    if let Some(active) = query.active {
        conditions.insert("active".into(), Value::Bool(active));
    }
    if let Some(position) = query.position {
        conditions.insert("position".into(), position.as_str().into());
    }
    let filter = ListQuery {
        limit: query.limit,
        offset: query.offset,
        order: query.order,
    }
    .with_where(Value::Object(conditions));

    Ok(ApiResponse::success(OfficerService::new(state.pool.clone()).list_for_board(board_id, filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Json(input): Json<OfficerInput>,
) -> ApiResult<Officer> {
    Ok(ApiResponse::created(OfficerService::new(state.pool.clone()).create(board_id, input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Officer> {
    Ok(ApiResponse::success(OfficerService::new(state.pool.clone()).get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<OfficerInput>,
) -> ApiResult<Officer> {
    Ok(ApiResponse::success(OfficerService::new(state.pool.clone()).update(id, input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    OfficerService::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
