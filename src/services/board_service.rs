use std::collections::HashMap;

use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{InstitutionService, PlaceService, ServiceError, ServiceResult};
use crate::database::models::{
    Board, BoardDetail, BoardInput, BoardSearch, BoardStatus, BoardStatusChange, PlaceKind, PlacePath,
    ValidationErrors,
};
use crate::database::tables::BOARDS;
use crate::database::{Page, Repository};
use crate::filter::FilterData;

const COLUMNS: &str = "id, name, board_type, registration_number, resolution_number, registered_on, address, \
                       email, phone, status, place_id, institution_id, period_start, period_end, created_at, updated_at";

pub struct BoardService {
    pool: PgPool,
    boards: Repository<Board>,
}

impl BoardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            boards: Repository::new(&BOARDS, pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, filter: FilterData) -> ServiceResult<Page<Board>> {
        Ok(self.boards.select_page(filter).await?)
    }

    pub async fn search(&self, search: BoardSearch) -> ServiceResult<Page<Board>> {
        let place_ids = match search.place_id {
            Some(place_id) => Some(self.municipalities_under(place_id).await?),
            None => None,
        };
        let filter = FilterData {
            where_clause: Some(search.where_clause(place_ids.as_deref())),
            order: None,
            limit: search.limit,
            offset: search.offset,
        };
        Ok(self.boards.select_page(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Board> {
        self.boards
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Board {} not found", id)))
    }

    pub async fn detail(&self, id: Uuid) -> ServiceResult<BoardDetail> {
        let board = self.get(id).await?;
        let mut details = self.details(vec![board]).await?;
        details
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Board {} not found", id)))
    }

    /// Resolve place paths and institution names, once per distinct reference
    pub async fn details(&self, boards: Vec<Board>) -> ServiceResult<Vec<BoardDetail>> {
        let places = PlaceService::new(self.pool.clone());
        let institutions = InstitutionService::new(self.pool.clone());
        let mut paths: HashMap<Uuid, PlacePath> = HashMap::new();
        let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut details = Vec::with_capacity(boards.len());

        for board in boards {
            if !paths.contains_key(&board.place_id) {
                let path = match places.path(board.place_id).await {
                    Ok(path) => path,
                    Err(ServiceError::NotFound(_)) => {
                        warn!(board_id = %board.id, place_id = %board.place_id, "Board references a deleted place");
                        PlacePath::default()
                    }
                    Err(e) => return Err(e),
                };
                paths.insert(board.place_id, path);
            }
            let institution_name = match board.institution_id {
                Some(institution_id) => {
                    if !names.contains_key(&institution_id) {
                        names.insert(institution_id, institutions.name_of(institution_id).await?);
                    }
                    names.get(&institution_id).cloned().flatten()
                }
                None => None,
            };

            details.push(BoardDetail {
                place_path: paths.get(&board.place_id).cloned().unwrap_or_default(),
                institution_name,
                board,
            });
        }

        Ok(details)
    }

    /// Every board matching a report's filters, with details resolved
    pub async fn report(&self, status: Option<BoardStatus>, place_id: Option<Uuid>) -> ServiceResult<Vec<BoardDetail>> {
        let search = BoardSearch {
            status,
            place_id,
            ..Default::default()
        };
        let place_ids = match place_id {
            Some(place_id) => Some(self.municipalities_under(place_id).await?),
            None => None,
        };
        let boards = self
            .boards
            .select_every(Some(search.where_clause(place_ids.as_deref())), Some(json!("name, id")))
            .await?;
        self.details(boards).await
    }

    pub async fn create(&self, input: BoardInput) -> ServiceResult<Board> {
        let input = input.normalize();
        input.validate()?;
        self.check_references(&input).await?;

        let sql = format!(
            "INSERT INTO boards (id, name, board_type, registration_number, resolution_number, registered_on, \
             address, email, phone, place_id, institution_id, period_start, period_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {}",
            COLUMNS
        );
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(input.board_type.as_str())
            .bind(&input.registration_number)
            .bind(&input.resolution_number)
            .bind(input.registered_on)
            .bind(&input.address)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.place_id)
            .bind(input.institution_id)
            .bind(input.period_start)
            .bind(input.period_end)
            .fetch_one(&self.pool)
            .await?;

        info!(board_id = %board.id, registration = %board.registration_number, "Registered board");
        Ok(board)
    }

    pub async fn update(&self, id: Uuid, input: BoardInput) -> ServiceResult<Board> {
        let input = input.normalize();
        input.validate()?;
        let current = self.get(id).await?;
        if current.board_status() == Some(BoardStatus::Dissolved) {
            return Err(ServiceError::Conflict("A dissolved board cannot be edited".into()));
        }
        self.check_references(&input).await?;

        let sql = format!(
            "UPDATE boards SET name = $2, board_type = $3, registration_number = $4, resolution_number = $5, \
             registered_on = $6, address = $7, email = $8, phone = $9, place_id = $10, institution_id = $11, \
             period_start = $12, period_end = $13, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.board_type.as_str())
            .bind(&input.registration_number)
            .bind(&input.resolution_number)
            .bind(input.registered_on)
            .bind(&input.address)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.place_id)
            .bind(input.institution_id)
            .bind(input.period_start)
            .bind(input.period_end)
            .fetch_one(&self.pool)
            .await?;

        Ok(board)
    }

    pub async fn change_status(&self, id: Uuid, change: BoardStatusChange) -> ServiceResult<Board> {
        let current = self.get(id).await?;
        let from = current
            .board_status()
            .ok_or_else(|| ServiceError::Unprocessable(format!("Board has unknown status '{}'", current.status)))?;

        if !from.can_transition_to(change.status) {
            return Err(ServiceError::Conflict(format!(
                "Cannot change board status from {} to {}",
                from, change.status
            )));
        }
        if change.status == BoardStatus::Dissolved && change.reason.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(ValidationErrors::single("reason", "A reason is required to dissolve a board").into());
        }

        let sql = format!(
            "UPDATE boards SET status = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .bind(change.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        info!(
            board_id = %id,
            from = %from,
            to = %change.status,
            reason = change.reason.as_deref().unwrap_or(""),
            "Changed board status"
        );
        Ok(board)
    }

    /// Soft-deletes the board together with its officers and commissions
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE officers SET deleted_at = NOW(), updated_at = NOW() WHERE board_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE commissions SET deleted_at = NOW(), updated_at = NOW() WHERE board_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("UPDATE boards SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("Board {} not found", id)));
        }
        tx.commit().await?;

        info!(board_id = %id, "Deleted board");
        Ok(())
    }

    /// Municipality ids at or below a place
    pub async fn municipalities_under(&self, place_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            WITH RECURSIVE below AS (
                SELECT id, kind FROM places WHERE id = $1 AND deleted_at IS NULL
                UNION ALL
                SELECT p.id, p.kind FROM places p JOIN below ON p.parent_id = below.id
                WHERE p.deleted_at IS NULL
            )
            SELECT id FROM below WHERE kind = 'municipality'
            "#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn check_references(&self, input: &BoardInput) -> ServiceResult<()> {
        let places = PlaceService::new(self.pool.clone());
        let place = match places.get(input.place_id).await {
            Ok(place) => place,
            Err(ServiceError::NotFound(_)) => {
                return Err(ValidationErrors::single("place_id", "Place does not exist").into())
            }
            Err(e) => return Err(e),
        };
        if place.place_kind() != Some(PlaceKind::Municipality) {
            return Err(ValidationErrors::single("place_id", "A board must be registered in a municipality").into());
        }

        if let Some(institution_id) = input.institution_id {
            if InstitutionService::new(self.pool.clone()).name_of(institution_id).await?.is_none() {
                return Err(ValidationErrors::single("institution_id", "Institution does not exist").into());
            }
        }
        Ok(())
    }
}
