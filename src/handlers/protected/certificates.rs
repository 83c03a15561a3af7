// handlers/protected/certificates.rs - issue, list, download and revoke certificates

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::config::config;
use crate::database::models::{Certificate, IssueCertificate, RevokeCertificate};
use crate::database::Page;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::mailer::{deliver, templates};
use crate::middleware::{sanitize_filename, ApiResponse, ApiResult, AuthUser, FileDownload};
use crate::reports;
use crate::services::certificate_service::Issuer;
use crate::services::{BoardService, CertificateService};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Certificate>> {
    let page = CertificateService::new(state.pool.clone())
        .list_for_board(board_id, query.into_filter())
        .await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/boards/:id/certificates - the board is notified by mail when it has an address
pub async fn issue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(board_id): Path<Uuid>,
    Json(request): Json<IssueCertificate>,
) -> ApiResult<Certificate> {
    let issuer = Issuer {
        id: user.id,
        name: &user.name,
    };
    let certificate = CertificateService::new(state.pool.clone())
        .issue(board_id, request.kind, issuer)
        .await?;

    let board = BoardService::new(state.pool.clone()).get(board_id).await?;
    if let Some(address) = board.email {
        let email = templates::certificate_issued(
            &address,
            &board.name,
            request.kind,
            &certificate.code,
            certificate.valid_until,
            &config().reports.public_base_url,
        );
        let mailer = state.mailer.clone();
        tokio::spawn(async move {
            deliver(mailer.as_ref(), email).await;
        });
    }

    Ok(ApiResponse::created(certificate))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Certificate> {
    Ok(ApiResponse::success(CertificateService::new(state.pool.clone()).get(id).await?))
}

/// GET /api/certificates/:id/pdf - rendered from the stored snapshot, shown inline
pub async fn pdf(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<FileDownload, ApiError> {
    let certificate = CertificateService::new(state.pool.clone()).get(id).await?;
    let filename = sanitize_filename(&format!("certificado-{}.pdf", certificate.code));

    let bytes = tokio::task::spawn_blocking(move || {
        reports::certificate::render(&certificate, &config().reports, chrono::Utc::now())
    })
    .await
    .map_err(|e| {
        tracing::error!("Certificate rendering task failed: {}", e);
        ApiError::internal_server_error("Could not render the document")
    })?;

    Ok(FileDownload::attachment(bytes, "application/pdf", filename).inline())
}

pub async fn revoke(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RevokeCertificate>,
) -> ApiResult<Certificate> {
    let certificate = CertificateService::new(state.pool.clone()).revoke(id, &request.reason).await?;
    tracing::info!(certificate_id = %id, revoked_by = %user.id, "Certificate revoked by user");
    Ok(ApiResponse::success(certificate))
}
