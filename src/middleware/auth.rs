use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims, Role};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub expires_at: i64,
}

impl AuthUser {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

/// Validates the session cookie (or a Bearer header) and injects `AuthUser`.
/// Identity and role come from the account as it is now, not as it was at login.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&jar, request.headers()).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        ApiError::from(e)
    })?;

    let Some(account) = state.accounts.current_account(claims.sub).await? else {
        tracing::warn!(user_id = %claims.sub, "Session token for a deleted account");
        return Err(ApiError::unauthorized("Session is no longer valid"));
    };
    if !account.active {
        tracing::warn!(user_id = %account.id, "Session token for an inactive account");
        return Err(ApiError::forbidden("This account is disabled"));
    }

    let auth_user = AuthUser {
        id: account.id,
        email: account.email,
        name: account.name,
        role: account.role.parse()?,
        expires_at: claims.exp,
    };
    tracing::debug!(user_id = %auth_user.id, role = %auth_user.role, "Authenticated request");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Cookie first; API clients without a cookie store may send a Bearer token
fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Result<String, String> {
    let cookie_name = &config::config().security.cookie_name;
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().trim().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Authentication required".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty session token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_wins_over_header() {
        let cookie_name = config::config().security.cookie_name.clone();
        let jar = CookieJar::new().add(Cookie::new(cookie_name, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&jar, &headers).unwrap(), "from-cookie");
    }

    #[test]
    fn bearer_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&CookieJar::new(), &headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_malformed_credentials_fail() {
        assert!(extract_token(&CookieJar::new(), &HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_token(&CookieJar::new(), &headers).is_err());
    }
}
