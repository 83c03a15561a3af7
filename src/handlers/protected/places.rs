// handlers/protected/places.rs - /api/places

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::{Place, PlaceInput, PlaceKind, PlacePath};
use crate::database::Page;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::PlaceService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceListQuery {
    pub kind: Option<PlaceKind>,
    pub parent_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaceWithPath {
    #[serde(flatten)]
    pub place: Place,
    pub path: PlacePath,
}

/// GET /api/places?kind=&parent_id=
pub async fn list(State(state): State<AppState>, Query(query): Query<PlaceListQuery>) -> ApiResult<Page<Place>> {
    let mut conditions = Map::new();
    if let Some(kind) = query.kind {
        conditions.insert("kind".into(), kind.as_str().into());
    }
    if let Some(parent_id) = query.parent_id {
        conditions.insert("parent_id".into(), Value::String(parent_id.to_string()));
    }
    let page = ListQuery {
        limit: query.limit,
        offset: query.offset,
        order: query.order,
    };
    let filter = page.with_where(Value::Object(conditions));
    Ok(ApiResponse::success(PlaceService::new(state.pool.clone()).list(filter).await?))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<PlaceInput>) -> ApiResult<Place> {
    Ok(ApiResponse::created(PlaceService::new(state.pool.clone()).create(input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<PlaceWithPath> {
    let places = PlaceService::new(state.pool.clone());
    let chain = places.chain(id).await?;
    let path = PlacePath::from_chain(&chain);
    let place = places.get(id).await?;
    Ok(ApiResponse::success(PlaceWithPath { place, path }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PlaceInput>,
) -> ApiResult<Place> {
    Ok(ApiResponse::success(PlaceService::new(state.pool.clone()).update(id, input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    PlaceService::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Place>> {
    Ok(ApiResponse::success(PlaceService::new(state.pool.clone()).children(id, query.into_filter()).await?))
}
