// handlers/protected/institutions.rs - /api/institutions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{Institution, InstitutionInput};
use crate::database::Page;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InstitutionService;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Page<Institution>> {
    Ok(ApiResponse::success(InstitutionService::new(state.pool.clone()).list(query.into_filter()).await?))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<InstitutionInput>) -> ApiResult<Institution> {
    Ok(ApiResponse::created(InstitutionService::new(state.pool.clone()).create(input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Institution> {
    Ok(ApiResponse::success(InstitutionService::new(state.pool.clone()).get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<InstitutionInput>,
) -> ApiResult<Institution> {
    Ok(ApiResponse::success(InstitutionService::new(state.pool.clone()).update(id, input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    InstitutionService::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
