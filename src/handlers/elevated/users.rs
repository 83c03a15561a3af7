// handlers/elevated/users.rs - /api/users

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::config::config;
use crate::database::models::{NewUser, UpdateUser, User};
use crate::database::Page;
use crate::handlers::ListQuery;
use crate::mailer::{deliver, templates};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: User,
    /// True only when a generated password was handed to a real mail transport
    pub password_sent: bool,
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Page<User>> {
    Ok(ApiResponse::success(UserService::new(state.pool.clone()).list(query.into_filter()).await?))
}

/// POST /api/users - without a password, a temporary one is generated and mailed
pub async fn create(State(state): State<AppState>, Json(input): Json<NewUser>) -> ApiResult<CreatedUser> {
    let (user, generated) = UserService::new(state.pool.clone()).create(input).await?;

    let password_sent = match generated {
        Some(password) => {
            let email = templates::welcome(&user.name, &user.email, &password, &config().reports.public_base_url);
            deliver(state.mailer.as_ref(), email).await
        }
        None => false,
    };

    Ok(ApiResponse::created(CreatedUser { user, password_sent }))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<User> {
    Ok(ApiResponse::success(UserService::new(state.pool.clone()).get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(UserService::new(state.pool.clone()).update(id, input, admin.id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    UserService::new(state.pool.clone()).delete(id, admin.id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/users/:id/reset-password - the new password is only ever sent by mail
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<User> {
    let (user, password) = UserService::new(state.pool.clone()).reset_password(id).await?;
    tracing::info!(user_id = %id, reset_by = %admin.id, "Password reset by admin");

    let email = templates::password_reset(&user.name, &user.email, &password, &config().reports.public_base_url);
    deliver(state.mailer.as_ref(), email).await;

    Ok(ApiResponse::success(user))
}
