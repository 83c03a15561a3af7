//! Data access and business rules, one service per resource.
//!
//! Services take a `PgPool` and return [`ServiceError`]; HTTP handlers and the
//! admin CLI share them.

pub mod board_service;
pub mod certificate_service;
pub mod commission_service;
pub mod institution_service;
pub mod officer_service;
pub mod place_service;
pub mod role_service;
pub mod user_service;

pub use board_service::BoardService;
pub use certificate_service::CertificateService;
pub use commission_service::CommissionService;
pub use institution_service::InstitutionService;
pub use officer_service::OfficerService;
pub use place_service::PlaceService;
pub use role_service::RoleService;
pub use user_service::{AccountLookup, UserService};

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::models::ValidationErrors;
use crate::database::DatabaseError;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    /// Request is well formed but the registry state does not allow it
    #[error("{0}")]
    Unprocessable(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e.into(),
            ServiceError::Validation(e) => e.into(),
            ServiceError::Auth(e) => e.into(),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Unprocessable(msg) => ApiError::unprocessable_entity(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
