// handlers/protected/auth.rs - GET /api/auth/me, PUT /api/auth/password

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::database::models::{ChangePassword, User};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::state::AppState;

/// Current account as stored, so role or name changes show before the token expires
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<User> {
    let account = UserService::new(state.pool.clone()).get(user.id).await?;
    Ok(ApiResponse::success(account))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ChangePassword>,
) -> ApiResult<Value> {
    UserService::new(state.pool.clone()).change_password(user.id, input).await?;
    tracing::info!(user_id = %user.id, "Password changed");
    Ok(ApiResponse::success(json!({ "changed": true })))
}
