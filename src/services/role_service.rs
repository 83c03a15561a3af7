use sqlx::PgPool;

use super::ServiceResult;
use crate::database::models::RoleRecord;

pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<RoleRecord>> {
        let roles = sqlx::query_as::<_, RoleRecord>("SELECT id, name, description FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }
}
