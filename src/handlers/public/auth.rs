// handlers/public/auth.rs - POST /auth/login, POST /auth/logout

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{generate_jwt, verify_password, Claims, Role};
use crate::config::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: AuthUser,
    /// Same value as the cookie, for clients that send a Bearer header
    pub token: String,
    pub expires_at: i64,
}

/// Sets the session cookie on success. Unknown email and wrong password look the same.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let users = UserService::new(state.pool.clone());
    let credentials = users.find_credentials(&request.email).await?;

    let Some(credentials) = credentials.filter(|c| verify_password(&request.password, &c.password_hash)) else {
        warn!(email = %request.email.trim(), "Failed login attempt");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !credentials.active {
        warn!(user_id = %credentials.id, "Login attempt on inactive account");
        return Err(ApiError::forbidden("This account is disabled"));
    }

    let role: Role = credentials.role.parse()?;
    let claims = Claims::new(credentials.id, credentials.email, credentials.name, role);
    let token = generate_jwt(&claims)?;
    users.touch_last_login(claims.sub).await?;

    let security = &config().security;
    let cookie = Cookie::build((security.cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::hours(security.jwt_expiry_hours as i64));

    info!(user_id = %claims.sub, role = %role, "User logged in");
    let expires_at = claims.exp;
    Ok((
        jar.add(cookie),
        ApiResponse::success(LoginResponse {
            user: AuthUser::from(claims),
            token,
            expires_at,
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<serde_json::Value>) {
    let cookie = Cookie::build((config().security.cookie_name.clone(), "")).path("/");
    (jar.remove(cookie), ApiResponse::success(serde_json::json!({ "logged_out": true })))
}
