use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{BoardService, CommissionService, ServiceError, ServiceResult};
use crate::database::models::officer::sort_roster;
use crate::database::models::{Board, BoardStatus, Officer, OfficerInput, ValidationErrors};
use crate::database::tables::OFFICERS;
use crate::database::{Page, Repository};
use crate::filter::FilterData;

const COLUMNS: &str = "id, board_id, commission_id, full_name, document_number, position, phone, email, \
                       period_start, period_end, active, created_at, updated_at";

pub struct OfficerService {
    pool: PgPool,
    officers: Repository<Officer>,
}

impl OfficerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            officers: Repository::new(&OFFICERS, pool.clone()),
            pool,
        }
    }

    pub async fn list_for_board(&self, board_id: Uuid, filter: FilterData) -> ServiceResult<Page<Officer>> {
        BoardService::new(self.pool.clone()).get(board_id).await?;
        Ok(self.officers.select_scoped(filter, json!({ "board_id": board_id })).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Officer> {
        self.officers
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Officer {} not found", id)))
    }

    /// Whole roster sorted by position rank; `active_only` drops former officers
    pub async fn roster(&self, board_id: Uuid, active_only: bool) -> ServiceResult<Vec<Officer>> {
        let where_clause = if active_only {
            json!({ "board_id": board_id, "active": true })
        } else {
            json!({ "board_id": board_id })
        };
        let mut officers = self.officers.select_every(Some(where_clause), Some(json!("full_name, id"))).await?;
        sort_roster(&mut officers);
        Ok(officers)
    }

    pub async fn create(&self, board_id: Uuid, input: OfficerInput) -> ServiceResult<Officer> {
        let input = input.normalize();
        input.validate()?;
        let board = self.editable_board(board_id).await?;
        self.check_rules(&board, &input, None).await?;

        let sql = format!(
            "INSERT INTO officers (id, board_id, commission_id, full_name, document_number, position, phone, email, \
             period_start, period_end, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            COLUMNS
        );
        let officer = sqlx::query_as::<_, Officer>(&sql)
            .bind(Uuid::new_v4())
            .bind(board_id)
            .bind(input.commission_id)
            .bind(&input.full_name)
            .bind(&input.document_number)
            .bind(input.position.as_str())
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.period_start)
            .bind(input.period_end)
            .bind(input.active)
            .fetch_one(&self.pool)
            .await?;

        info!(officer_id = %officer.id, board_id = %board_id, position = %officer.position, "Registered officer");
        Ok(officer)
    }

    pub async fn update(&self, id: Uuid, input: OfficerInput) -> ServiceResult<Officer> {
        let input = input.normalize();
        input.validate()?;
        let current = self.get(id).await?;
        let board = self.editable_board(current.board_id).await?;
        self.check_rules(&board, &input, Some(id)).await?;

        let sql = format!(
            "UPDATE officers SET commission_id = $2, full_name = $3, document_number = $4, position = $5, \
             phone = $6, email = $7, period_start = $8, period_end = $9, active = $10, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let officer = sqlx::query_as::<_, Officer>(&sql)
            .bind(id)
            .bind(input.commission_id)
            .bind(&input.full_name)
            .bind(&input.document_number)
            .bind(input.position.as_str())
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.period_start)
            .bind(input.period_end)
            .bind(input.active)
            .fetch_one(&self.pool)
            .await?;

        Ok(officer)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let officer = self.get(id).await?;
        self.editable_board(officer.board_id).await?;
        self.officers.soft_delete(id).await?;
        info!(officer_id = %id, board_id = %officer.board_id, "Deleted officer");
        Ok(())
    }

    async fn editable_board(&self, board_id: Uuid) -> ServiceResult<Board> {
        let board = BoardService::new(self.pool.clone()).get(board_id).await?;
        if board.board_status() == Some(BoardStatus::Dissolved) {
            return Err(ServiceError::Conflict("A dissolved board cannot be edited".into()));
        }
        Ok(board)
    }

    /// Commission ownership, term bounds and the uniqueness rules among active officers
    async fn check_rules(&self, board: &Board, input: &OfficerInput, id: Option<Uuid>) -> ServiceResult<()> {
        input.validate_within(board.period_start, board.period_end)?;

        if let Some(commission_id) = input.commission_id {
            let commission = match CommissionService::new(self.pool.clone()).get(commission_id).await {
                Ok(commission) => commission,
                Err(ServiceError::NotFound(_)) => {
                    return Err(ValidationErrors::single("commission_id", "Commission does not exist").into())
                }
                Err(e) => return Err(e),
            };
            if commission.board_id != board.id {
                return Err(
                    ValidationErrors::single("commission_id", "Commission belongs to a different board").into()
                );
            }
        }

        if !input.active {
            return Ok(());
        }

        let others = match id {
            Some(id) => json!({ "$ne": id }),
            None => json!({ "$null": false }),
        };

        let duplicate_document = self
            .officers
            .exists(json!({
                "board_id": board.id,
                "active": true,
                "document_number": input.document_number,
                "id": others,
            }))
            .await?;
        if duplicate_document {
            return Err(ServiceError::Conflict(
                "This document number already belongs to an active officer of the board".into(),
            ));
        }

        if input.position.is_single_holder() {
            let taken = self
                .officers
                .exists(json!({
                    "board_id": board.id,
                    "active": true,
                    "position": input.position.as_str(),
                    "id": others,
                }))
                .await?;
            if taken {
                return Err(ServiceError::Conflict(format!(
                    "The position of {} is already held by an active officer of the board",
                    input.position.label_es()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CommissionInput, OfficerPosition};
    use crate::testing::TestContext;

    #[tokio::test]
    async fn an_active_document_number_is_unique_within_the_board() {
        let Some(ctx) = TestContext::connect().await else { return };
        let places = ctx.places().await;
        let board = ctx.board(places.municipality.id).await;
        let officers = OfficerService::new(ctx.pool.clone());

        officers
            .create(board.id, TestContext::officer_input("1020304050", OfficerPosition::Member))
            .await
            .unwrap();
        let err = officers
            .create(board.id, TestContext::officer_input("1020304050", OfficerPosition::Delegate))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let mut former = TestContext::officer_input("1020304050", OfficerPosition::Delegate);
        former.active = false;
        assert!(officers.create(board.id, former).await.is_ok());

        let other_board = ctx.board(places.municipality.id).await;
        assert!(officers
            .create(other_board.id, TestContext::officer_input("1020304050", OfficerPosition::Member))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn single_holder_positions_admit_one_active_officer() {
        let Some(ctx) = TestContext::connect().await else { return };
        let places = ctx.places().await;
        let board = ctx.board(places.municipality.id).await;
        let officers = OfficerService::new(ctx.pool.clone());

        let president = officers
            .create(board.id, TestContext::officer_input("43111222", OfficerPosition::President))
            .await
            .unwrap();
        let err = officers
            .create(board.id, TestContext::officer_input("43555666", OfficerPosition::President))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        officers
            .create(board.id, TestContext::officer_input("43777888", OfficerPosition::Member))
            .await
            .unwrap();
        assert!(officers
            .create(board.id, TestContext::officer_input("43999000", OfficerPosition::Member))
            .await
            .is_ok());

        // Updating the holder itself is not a clash
        let mut renamed = TestContext::officer_input("43111222", OfficerPosition::President);
        renamed.full_name = "Presidenta Reelegida".into();
        assert!(officers.update(president.id, renamed).await.is_ok());
    }

    #[tokio::test]
    async fn commissions_must_belong_to_the_same_board() {
        let Some(ctx) = TestContext::connect().await else { return };
        let places = ctx.places().await;
        let board = ctx.board(places.municipality.id).await;
        let other_board = ctx.board(places.municipality.id).await;
        let commissions = CommissionService::new(ctx.pool.clone());
        let officers = OfficerService::new(ctx.pool.clone());

        let foreign = commissions
            .create(other_board.id, CommissionInput { name: "Comisión de Obras".into(), description: None })
            .await
            .unwrap();
        let own = commissions
            .create(board.id, CommissionInput { name: "Comisión de Obras".into(), description: None })
            .await
            .unwrap();

        let mut coordinator = TestContext::officer_input("55123123", OfficerPosition::Coordinator);
        coordinator.commission_id = Some(foreign.id);
        let err = officers.create(board.id, coordinator.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        coordinator.commission_id = Some(own.id);
        let created = officers.create(board.id, coordinator).await.unwrap();
        assert_eq!(created.commission_id, Some(own.id));
    }
}
