use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Layer body for role allow-listing; must run after `jwt_auth_middleware`.
///
/// ```ignore
/// router.route_layer(axum::middleware::from_fn(|req: Request, next: Next| {
///     require_roles(Role::ADMINS, req, next)
/// }))
/// ```
pub async fn require_roles(allowed: &'static [Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.has_role(allowed) {
        tracing::warn!(user_id = %user.id, role = %user.role, path = %request.uri().path(), "Role not allowed");
        return Err(ApiError::forbidden(format!(
            "Requires one of the roles: {}",
            allowed.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
        )));
    }

    Ok(next.run(request).await)
}
