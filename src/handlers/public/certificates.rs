// handlers/public/certificates.rs - GET /certificates/verify/:code

use axum::extract::{Path, State};

use crate::database::models::CertificateVerification;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CertificateService;
use crate::state::AppState;

/// Anyone holding a printed document can check it; codes are accepted without dashes
pub async fn verify(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<CertificateVerification> {
    let verification = CertificateService::new(state.pool.clone()).verify(&code).await?;
    tracing::info!(code = %verification.code, status = ?verification.status, "Certificate verified");
    Ok(ApiResponse::success(verification))
}
