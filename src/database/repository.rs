use serde_json::json;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{Page, QueryBuilder};
use crate::filter::{FilterData, FilterTable};

/// Generic read access plus soft delete over one filterable table
pub struct Repository<T> {
    table: &'static FilterTable,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static FilterTable, pool: PgPool) -> Self {
        Self {
            table,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn select_page(&self, filter_data: FilterData) -> Result<Page<T>, DatabaseError> {
        QueryBuilder::<T>::new(self.table)
            .filter(filter_data)?
            .select_page(&self.pool)
            .await
    }

    /// Page restricted by a server-side scope such as `{ "board_id": … }`
    pub async fn select_scoped(&self, filter_data: FilterData, scope: serde_json::Value) -> Result<Page<T>, DatabaseError> {
        QueryBuilder::<T>::new(self.table)
            .filter(filter_data)?
            .scope(scope)?
            .select_page(&self.pool)
            .await
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let soft_delete = if self.table.soft_delete { " AND \"deleted_at\" IS NULL" } else { "" };
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1{}", self.table.name, soft_delete);
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} record {} not found", self.table.name, id)))
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(self.table)
            .filter(filter_data)?
            .count(&self.pool)
            .await
    }

    pub async fn exists(&self, where_clause: serde_json::Value) -> Result<bool, DatabaseError> {
        let filter = FilterData { where_clause: Some(where_clause), ..Default::default() };
        Ok(self.count(filter).await? > 0)
    }

    /// Mark a row deleted; 404 when it is already gone
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        if !self.table.soft_delete {
            return Err(DatabaseError::QueryError(format!("{} does not support deletion", self.table.name)));
        }
        let sql = format!(
            "UPDATE \"{}\" SET \"deleted_at\" = NOW(), \"updated_at\" = NOW() WHERE \"id\" = $1 AND \"deleted_at\" IS NULL",
            self.table.name
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} record {} not found", self.table.name, id)));
        }
        Ok(())
    }

    /// Every matching row, fetched in pages of `filter.max_limit`
    pub async fn select_every(&self, where_clause: Option<serde_json::Value>, order: Option<serde_json::Value>) -> Result<Vec<T>, DatabaseError> {
        let page_size = crate::config::config().filter.max_limit.max(1);
        let mut offset = 0;
        let mut rows = Vec::new();

        loop {
            let filter = FilterData {
                where_clause: where_clause.clone(),
                order: order.clone(),
                limit: Some(page_size),
                offset: Some(offset),
            };
            let batch = QueryBuilder::<T>::new(self.table)
                .filter(filter)?
                .select_all(&self.pool)
                .await?;
            let fetched = batch.len() as i64;
            rows.extend(batch);
            if fetched < page_size {
                break;
            }
            offset += page_size;
        }

        Ok(rows)
    }

    pub async fn select_ids(&self, ids: Vec<Uuid>) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = FilterData {
            where_clause: Some(json!({ "id": { "$in": ids } })),
            limit: Some(ids.len() as i64),
            ..Default::default()
        };
        Ok(self.select_page(filter).await?.items)
    }
}
