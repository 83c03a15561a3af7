pub mod auth;
pub mod response;
pub mod roles;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{sanitize_filename, ApiResponse, ApiResult, FileDownload};
pub use roles::require_roles;
