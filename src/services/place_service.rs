use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::models::{Place, PlaceInput, PlaceKind, PlacePath, ValidationErrors};
use crate::database::tables::PLACES;
use crate::database::{Page, Repository};
use crate::filter::FilterData;

pub struct PlaceService {
    pool: PgPool,
    places: Repository<Place>,
}

impl PlaceService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            places: Repository::new(&PLACES, pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, filter: FilterData) -> ServiceResult<Page<Place>> {
        Ok(self.places.select_page(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Place> {
        self.places
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Place {} not found", id)))
    }

    pub async fn children(&self, id: Uuid, filter: FilterData) -> ServiceResult<Page<Place>> {
        self.get(id).await?;
        Ok(self.places.select_scoped(filter, json!({ "parent_id": id })).await?)
    }

    pub async fn create(&self, input: PlaceInput) -> ServiceResult<Place> {
        let input = input.normalize();
        self.check_hierarchy(&input, None).await?;

        let place = sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places (id, name, kind, code, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, kind, code, parent_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(&input.code)
        .bind(input.parent_id)
        .fetch_one(&self.pool)
        .await?;

        info!(place_id = %place.id, kind = %place.kind, "Created place");
        Ok(place)
    }

    pub async fn update(&self, id: Uuid, input: PlaceInput) -> ServiceResult<Place> {
        let input = input.normalize();
        let current = self.get(id).await?;
        self.check_hierarchy(&input, Some(id)).await?;

        if current.place_kind() != Some(input.kind) && self.has_children(id).await? {
            return Err(ServiceError::Conflict(
                "Cannot change the kind of a place that has child places".into(),
            ));
        }
        if current.place_kind() == Some(PlaceKind::Municipality)
            && input.kind != PlaceKind::Municipality
            && self.has_boards(id).await?
        {
            return Err(ServiceError::Conflict(
                "Cannot change the kind of a municipality with registered boards".into(),
            ));
        }

        let place = sqlx::query_as::<_, Place>(
            r#"
            UPDATE places
            SET name = $2, kind = $3, code = $4, parent_id = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, kind, code, parent_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(&input.code)
        .bind(input.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(place)
    }

    /// Refused while child places, boards or institutions still reference it
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.get(id).await?;

        if self.has_children(id).await? {
            return Err(ServiceError::Conflict("Place still has child places".into()));
        }
        if self.has_boards(id).await? {
            return Err(ServiceError::Conflict("Place still has registered boards".into()));
        }
        let institutions: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM institutions WHERE place_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if institutions {
            return Err(ServiceError::Conflict("Place is still referenced by institutions".into()));
        }

        self.places.soft_delete(id).await?;
        info!(place_id = %id, "Deleted place");
        Ok(())
    }

    /// Chain from the place up to its department
    pub async fn chain(&self, id: Uuid) -> ServiceResult<Vec<Place>> {
        let chain = sqlx::query_as::<_, Place>(
            r#"
            WITH RECURSIVE chain AS (
                SELECT p.*, 0 AS depth FROM places p WHERE p.id = $1 AND p.deleted_at IS NULL
                UNION ALL
                SELECT parent.*, chain.depth + 1
                FROM places parent
                JOIN chain ON parent.id = chain.parent_id
                WHERE chain.depth < 5
            )
            SELECT id, name, kind, code, parent_id, created_at, updated_at
            FROM chain
            ORDER BY depth
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        if chain.is_empty() {
            return Err(ServiceError::NotFound(format!("Place {} not found", id)));
        }
        Ok(chain)
    }

    pub async fn path(&self, id: Uuid) -> ServiceResult<PlacePath> {
        Ok(PlacePath::from_chain(&self.chain(id).await?))
    }

    /// Loads the parent, checks its kind and rejects cycles on update
    async fn check_hierarchy(&self, input: &PlaceInput, id: Option<Uuid>) -> ServiceResult<()> {
        input.validate()?;

        let Some(parent_id) = input.parent_id else {
            return Ok(());
        };
        if Some(parent_id) == id {
            return Err(ValidationErrors::single("parent_id", "A place cannot be its own parent").into());
        }
        let parent = self
            .places
            .select_one(parent_id)
            .await?
            .ok_or_else(|| ValidationErrors::single("parent_id", "Parent place does not exist"))?;
        input.validate_parent(&parent)?;
        Ok(())
    }

    async fn has_children(&self, id: Uuid) -> ServiceResult<bool> {
        Ok(self.places.exists(json!({ "parent_id": id })).await?)
    }

    async fn has_boards(&self, id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM boards WHERE place_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn places_in_use_cannot_be_deleted() {
        let Some(ctx) = TestContext::connect().await else { return };
        let places = ctx.places().await;
        let service = PlaceService::new(ctx.pool.clone());

        let err = service.delete(places.province.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m.contains("child places")));

        let board = ctx.board(places.municipality.id).await;
        let err = service.delete(places.municipality.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m.contains("boards")));

        crate::services::BoardService::new(ctx.pool.clone()).delete(board.id).await.unwrap();
        service.delete(places.municipality.id).await.unwrap();
        service.delete(places.province.id).await.unwrap();
        service.delete(places.department.id).await.unwrap();
        assert!(matches!(service.get(places.department.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn parents_must_sit_one_level_up() {
        let Some(ctx) = TestContext::connect().await else { return };
        let places = ctx.places().await;
        let service = PlaceService::new(ctx.pool.clone());

        let err = service
            .create(PlaceInput {
                name: TestContext::unique("municipality"),
                kind: PlaceKind::Municipality,
                code: None,
                parent_id: Some(places.department.id),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let chain = service.path(places.municipality.id).await.unwrap();
        assert_eq!(chain.department.as_deref(), Some(places.department.name.as_str()));
    }
}
