use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::models::{Institution, InstitutionInput, Place, ValidationErrors};
use crate::database::tables::{INSTITUTIONS, PLACES};
use crate::database::{Page, Repository};
use crate::filter::FilterData;

const COLUMNS: &str = "id, name, acronym, address, phone, email, place_id, created_at, updated_at";

pub struct InstitutionService {
    pool: PgPool,
    institutions: Repository<Institution>,
}

impl InstitutionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            institutions: Repository::new(&INSTITUTIONS, pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, filter: FilterData) -> ServiceResult<Page<Institution>> {
        Ok(self.institutions.select_page(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Institution> {
        self.institutions
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Institution {} not found", id)))
    }

    pub async fn create(&self, input: InstitutionInput) -> ServiceResult<Institution> {
        let input = input.normalize();
        input.validate()?;
        self.check_place(input.place_id).await?;

        let sql = format!(
            "INSERT INTO institutions (id, name, acronym, address, phone, email, place_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            COLUMNS
        );
        let institution = sqlx::query_as::<_, Institution>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.name.trim())
            .bind(&input.acronym)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.place_id)
            .fetch_one(&self.pool)
            .await?;

        info!(institution_id = %institution.id, "Created institution");
        Ok(institution)
    }

    pub async fn update(&self, id: Uuid, input: InstitutionInput) -> ServiceResult<Institution> {
        let input = input.normalize();
        input.validate()?;
        self.get(id).await?;
        self.check_place(input.place_id).await?;

        let sql = format!(
            "UPDATE institutions SET name = $2, acronym = $3, address = $4, phone = $5, email = $6, \
             place_id = $7, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let institution = sqlx::query_as::<_, Institution>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&input.acronym)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.place_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(institution)
    }

    /// Refused while boards are still accompanied by the institution
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.get(id).await?;
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM boards WHERE institution_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referenced {
            return Err(ServiceError::Conflict("Institution is still assigned to boards".into()));
        }

        self.institutions.soft_delete(id).await?;
        info!(institution_id = %id, "Deleted institution");
        Ok(())
    }

    pub async fn name_of(&self, id: Uuid) -> ServiceResult<Option<String>> {
        Ok(self.institutions.select_one(id).await?.map(|i| i.name))
    }

    async fn check_place(&self, place_id: Option<Uuid>) -> ServiceResult<()> {
        let Some(place_id) = place_id else {
            return Ok(());
        };
        let places = Repository::<Place>::new(&PLACES, self.pool.clone());
        if places.select_one(place_id).await?.is_none() {
            return Err(ValidationErrors::single("place_id", "Place does not exist").into());
        }
        Ok(())
    }
}
