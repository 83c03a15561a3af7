use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{BoardService, ServiceError, ServiceResult};
use crate::database::models::{BoardStatus, Commission, CommissionInput};
use crate::database::tables::COMMISSIONS;
use crate::database::{Page, Repository};
use crate::filter::FilterData;

const COLUMNS: &str = "id, board_id, name, description, created_at, updated_at";

pub struct CommissionService {
    pool: PgPool,
    commissions: Repository<Commission>,
}

impl CommissionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            commissions: Repository::new(&COMMISSIONS, pool.clone()),
            pool,
        }
    }

    pub async fn list_for_board(&self, board_id: Uuid, filter: FilterData) -> ServiceResult<Page<Commission>> {
        BoardService::new(self.pool.clone()).get(board_id).await?;
        Ok(self.commissions.select_scoped(filter, json!({ "board_id": board_id })).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Commission> {
        self.commissions
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Commission {} not found", id)))
    }

    pub async fn create(&self, board_id: Uuid, input: CommissionInput) -> ServiceResult<Commission> {
        let input = input.normalize();
        input.validate()?;
        self.ensure_board_editable(board_id).await?;

        let sql = format!(
            "INSERT INTO commissions (id, board_id, name, description) VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        );
        let commission = sqlx::query_as::<_, Commission>(&sql)
            .bind(Uuid::new_v4())
            .bind(board_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(&self.pool)
            .await?;

        info!(commission_id = %commission.id, board_id = %board_id, "Created commission");
        Ok(commission)
    }

    pub async fn update(&self, id: Uuid, input: CommissionInput) -> ServiceResult<Commission> {
        let input = input.normalize();
        input.validate()?;
        let current = self.get(id).await?;
        self.ensure_board_editable(current.board_id).await?;

        let sql = format!(
            "UPDATE commissions SET name = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let commission = sqlx::query_as::<_, Commission>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(&self.pool)
            .await?;

        Ok(commission)
    }

    /// Refused while active officers belong to the commission
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.get(id).await?;
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM officers WHERE commission_id = $1 AND active AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if in_use {
            return Err(ServiceError::Conflict("Commission still has active officers".into()));
        }

        self.commissions.soft_delete(id).await?;
        info!(commission_id = %id, "Deleted commission");
        Ok(())
    }

    async fn ensure_board_editable(&self, board_id: Uuid) -> ServiceResult<()> {
        let board = BoardService::new(self.pool.clone()).get(board_id).await?;
        if board.board_status() == Some(BoardStatus::Dissolved) {
            return Err(ServiceError::Conflict("A dissolved board cannot be edited".into()));
        }
        Ok(())
    }
}
