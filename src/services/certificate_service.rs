use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{BoardService, OfficerService, ServiceError, ServiceResult};
use crate::config::config;
use crate::database::models::certificate::{normalize_code, verification_code};
use crate::database::models::{
    Board, BoardStatus, Certificate, CertificateKind, CertificateSnapshot, CertificateVerification, Officer,
    OfficerPosition, ValidationErrors,
};
use crate::database::tables::CERTIFICATES;
use crate::database::{DatabaseError, Page, Repository};
use crate::filter::FilterData;

const COLUMNS: &str = "id, board_id, kind, code, issued_by, issued_at, valid_until, revoked_at, revoked_reason, snapshot";

/// Who is issuing; the name is printed on the document
pub struct Issuer<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

pub struct CertificateService {
    pool: PgPool,
    certificates: Repository<Certificate>,
}

impl CertificateService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            certificates: Repository::new(&CERTIFICATES, pool.clone()),
            pool,
        }
    }

    pub async fn list_for_board(&self, board_id: Uuid, filter: FilterData) -> ServiceResult<Page<Certificate>> {
        BoardService::new(self.pool.clone()).get(board_id).await?;
        let filter = FilterData {
            order: filter.order.or_else(|| Some(json!("issued_at desc"))),
            ..filter
        };
        Ok(self.certificates.select_scoped(filter, json!({ "board_id": board_id })).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Certificate> {
        self.certificates
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Certificate {} not found", id)))
    }

    /// Lookup by verification code as typed by a reader
    pub async fn find_by_code(&self, code: &str) -> ServiceResult<Option<Certificate>> {
        let Some(code) = normalize_code(code) else {
            return Ok(None);
        };
        let sql = format!("SELECT {} FROM certificates WHERE code = $1", COLUMNS);
        let certificate = sqlx::query_as::<_, Certificate>(&sql)
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(certificate)
    }

    pub async fn verify(&self, code: &str) -> ServiceResult<CertificateVerification> {
        let certificate = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No certificate matches this code".into()))?;
        Ok(CertificateVerification::from_certificate(&certificate, Utc::now()))
    }

    pub async fn issue(&self, board_id: Uuid, kind: CertificateKind, issuer: Issuer<'_>) -> ServiceResult<Certificate> {
        self.issue_with(board_id, kind, issuer, || {
            let id = Uuid::new_v4();
            (id, verification_code(id))
        })
        .await
    }

    /// `next_code` yields the id and code for each attempt
    async fn issue_with<F>(
        &self,
        board_id: Uuid,
        kind: CertificateKind,
        issuer: Issuer<'_>,
        mut next_code: F,
    ) -> ServiceResult<Certificate>
    where
        F: FnMut() -> (Uuid, String) + Send,
    {
        let boards = BoardService::new(self.pool.clone());
        let detail = boards.detail(board_id).await?;
        let officers = match kind {
            CertificateKind::Officers => OfficerService::new(self.pool.clone()).roster(board_id, true).await?,
            CertificateKind::Registration => Vec::new(),
        };
        check_eligibility(&detail.board, kind, &officers)?;

        let snapshot = CertificateSnapshot::capture(kind, &detail, &officers, issuer.name, &config().reports);
        let validity = Duration::days(config().reports.certificate_validity_days);

        // A code collision is retried once with a fresh id
        let mut attempt = 0;
        loop {
            attempt += 1;
            let (id, code) = next_code();
            match self.insert(id, &code, board_id, kind, issuer.id, validity, &snapshot).await {
                Ok(certificate) => {
                    info!(
                        certificate_id = %certificate.id,
                        board_id = %board_id,
                        kind = %kind,
                        code = %certificate.code,
                        "Issued certificate"
                    );
                    return Ok(certificate);
                }
                Err(e) if attempt < 2 && e.constraint().as_deref() == Some("certificates_code_key") => {
                    warn!(board_id = %board_id, "Certificate code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn revoke(&self, id: Uuid, reason: &str) -> ServiceResult<Certificate> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationErrors::single("reason", "A reason is required to revoke a certificate").into());
        }
        let current = self.get(id).await?;
        if current.revoked_at.is_some() {
            return Err(ServiceError::Conflict("Certificate is already revoked".into()));
        }

        let sql = format!(
            "UPDATE certificates SET revoked_at = NOW(), revoked_reason = $2 \
             WHERE id = $1 AND revoked_at IS NULL RETURNING {}",
            COLUMNS
        );
        let certificate = sqlx::query_as::<_, Certificate>(&sql)
            .bind(id)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::Conflict("Certificate is already revoked".into()))?;

        info!(certificate_id = %id, "Revoked certificate");
        Ok(certificate)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        id: Uuid,
        code: &str,
        board_id: Uuid,
        kind: CertificateKind,
        issued_by: Uuid,
        validity: Duration,
        snapshot: &CertificateSnapshot,
    ) -> Result<Certificate, DatabaseError> {
        let issued_at = Utc::now();
        let sql = format!(
            "INSERT INTO certificates (id, board_id, kind, code, issued_by, issued_at, valid_until, snapshot) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COLUMNS
        );
        let certificate = sqlx::query_as::<_, Certificate>(&sql)
            .bind(id)
            .bind(board_id)
            .bind(kind.as_str())
            .bind(code)
            .bind(issued_by)
            .bind(issued_at)
            .bind(issued_at + validity)
            .bind(sqlx::types::Json(snapshot))
            .fetch_one(&self.pool)
            .await?;
        Ok(certificate)
    }
}

/// Registry state a board must be in before a document can be issued
pub fn check_eligibility(board: &Board, kind: CertificateKind, officers: &[Officer]) -> ServiceResult<()> {
    if board.board_status() != Some(BoardStatus::Active) {
        return Err(ServiceError::Unprocessable(format!(
            "Certificates can only be issued for active boards; this board is {}",
            board.status
        )));
    }
    if kind == CertificateKind::Officers {
        let active: Vec<&Officer> = officers.iter().filter(|o| o.active).collect();
        if active.is_empty() {
            return Err(ServiceError::Unprocessable("The board has no active officers".into()));
        }
        if !active.iter().any(|o| o.officer_position() == Some(OfficerPosition::President)) {
            return Err(ServiceError::Unprocessable("The board has no active president".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn board(status: &str) -> Board {
        Board {
            id: Uuid::new_v4(),
            name: "JAC La Esperanza".into(),
            board_type: "communal".into(),
            registration_number: "REG-0100".into(),
            resolution_number: None,
            registered_on: None,
            address: None,
            email: None,
            phone: None,
            status: status.into(),
            place_id: Uuid::new_v4(),
            institution_id: None,
            period_start: NaiveDate::from_ymd_opt(2024, 7, 1),
            period_end: NaiveDate::from_ymd_opt(2028, 6, 30),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn officer(board_id: Uuid, position: OfficerPosition, active: bool) -> Officer {
        Officer {
            id: Uuid::new_v4(),
            board_id,
            commission_id: None,
            full_name: format!("Titular {}", position),
            document_number: "71234567".into(),
            position: position.as_str().into(),
            phone: None,
            email: None,
            period_start: None,
            period_end: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_active_boards_get_certificates() {
        let err = check_eligibility(&board("suspended"), CertificateKind::Registration, &[]).unwrap_err();
        assert!(matches!(err, ServiceError::Unprocessable(_)));
        assert!(check_eligibility(&board("active"), CertificateKind::Registration, &[]).is_ok());
    }

    #[test]
    fn roster_certificates_need_an_active_president() {
        let b = board("active");
        assert!(check_eligibility(&b, CertificateKind::Officers, &[]).is_err());

        let without_president = vec![
            officer(b.id, OfficerPosition::Treasurer, true),
            officer(b.id, OfficerPosition::President, false),
        ];
        assert!(check_eligibility(&b, CertificateKind::Officers, &without_president).is_err());

        let with_president = vec![officer(b.id, OfficerPosition::President, true)];
        assert!(check_eligibility(&b, CertificateKind::Officers, &with_president).is_ok());
    }

    mod with_database {
        use super::*;
        use crate::auth::Role;
        use crate::database::models::BoardStatusChange;
        use crate::testing::TestContext;

        async fn active_board(ctx: &TestContext) -> Board {
            let places = ctx.places().await;
            ctx.board(places.municipality.id).await
        }

        #[tokio::test]
        async fn suspended_boards_are_refused() {
            let Some(ctx) = TestContext::connect().await else { return };
            let issuer = ctx.user(Role::Operator).await;
            let board = active_board(&ctx).await;
            BoardService::new(ctx.pool.clone())
                .change_status(board.id, BoardStatusChange { status: BoardStatus::Suspended, reason: None })
                .await
                .unwrap();

            let err = CertificateService::new(ctx.pool.clone())
                .issue(board.id, CertificateKind::Registration, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Unprocessable(_)));
        }

        #[tokio::test]
        async fn roster_documents_require_a_registered_president() {
            let Some(ctx) = TestContext::connect().await else { return };
            let issuer = ctx.user(Role::Operator).await;
            let board = active_board(&ctx).await;
            let certificates = CertificateService::new(ctx.pool.clone());
            let officers = OfficerService::new(ctx.pool.clone());

            officers
                .create(board.id, TestContext::officer_input("80111222", OfficerPosition::Treasurer))
                .await
                .unwrap();
            let err = certificates
                .issue(board.id, CertificateKind::Officers, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Unprocessable(_)));

            officers
                .create(board.id, TestContext::officer_input("80333444", OfficerPosition::President))
                .await
                .unwrap();
            let issued = certificates
                .issue(board.id, CertificateKind::Officers, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap();
            assert_eq!(issued.snapshot.0.officers.len(), 2);
        }

        #[tokio::test]
        async fn a_taken_code_is_retried_with_a_fresh_one() {
            let Some(ctx) = TestContext::connect().await else { return };
            let issuer = ctx.user(Role::Operator).await;
            let board = active_board(&ctx).await;
            let service = CertificateService::new(ctx.pool.clone());

            let first = service
                .issue(board.id, CertificateKind::Registration, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap();

            let taken = first.code.clone();
            let mut calls = 0;
            let second = service
                .issue_with(
                    board.id,
                    CertificateKind::Registration,
                    Issuer { id: issuer.id, name: &issuer.name },
                    || {
                        calls += 1;
                        let id = Uuid::new_v4();
                        if calls == 1 {
                            (id, taken.clone())
                        } else {
                            (id, verification_code(id))
                        }
                    },
                )
                .await
                .unwrap();

            assert_eq!(calls, 2);
            assert_ne!(second.code, first.code);
        }

        #[tokio::test]
        async fn repeated_code_collisions_give_up() {
            let Some(ctx) = TestContext::connect().await else { return };
            let issuer = ctx.user(Role::Operator).await;
            let board = active_board(&ctx).await;
            let service = CertificateService::new(ctx.pool.clone());

            let first = service
                .issue(board.id, CertificateKind::Registration, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap();

            let taken = first.code.clone();
            let err = service
                .issue_with(
                    board.id,
                    CertificateKind::Registration,
                    Issuer { id: issuer.id, name: &issuer.name },
                    || (Uuid::new_v4(), taken.clone()),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Database(ref e) if e.is_unique_violation()));
        }

        #[tokio::test]
        async fn revoking_twice_conflicts() {
            let Some(ctx) = TestContext::connect().await else { return };
            let issuer = ctx.user(Role::Operator).await;
            let board = active_board(&ctx).await;
            let service = CertificateService::new(ctx.pool.clone());

            let issued = service
                .issue(board.id, CertificateKind::Registration, Issuer { id: issuer.id, name: &issuer.name })
                .await
                .unwrap();

            let err = service.revoke(issued.id, "   ").await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));

            let revoked = service.revoke(issued.id, "Datos de la junta desactualizados").await.unwrap();
            assert!(revoked.revoked_at.is_some());

            let err = service.revoke(issued.id, "Otra vez").await.unwrap_err();
            assert!(matches!(err, ServiceError::Conflict(_)));

            let verification = service.verify(&issued.code).await.unwrap();
            assert!(!verification.valid);
        }
    }
}
