use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterTable, FilterWhereOptions, SqlResult};

pub struct Filter {
    table: &'static FilterTable,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: i64,
    offset: i64,
    options: FilterWhereOptions,
}

impl Filter {
    pub fn new(table: &'static FilterTable) -> Self {
        let filter_config = &crate::config::config().filter;
        Self {
            table,
            where_data: None,
            order_data: vec![],
            limit: filter_config.default_limit,
            offset: 0,
            options: FilterWhereOptions::default(),
        }
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if data.limit.is_some() || data.offset.is_some() {
            self.limit(data.limit.unwrap_or(self.limit), data.offset)?;
        }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    /// Add a condition ANDed with whatever the caller supplied
    pub fn and_where(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        let combined = match self.where_data.take() {
            Some(existing) if !existing.is_null() => serde_json::json!({ "$and": [existing, conditions] }),
            _ => conditions,
        };
        self.where_data = Some(combined);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(self.table, &order_spec)?;
        Ok(self)
    }

    pub fn include_deleted(&mut self, include: bool) -> &mut Self {
        self.options.include_deleted = include;
        self
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }

        // Apply max limit from config
        let max_limit = crate::config::config().filter.max_limit;
        let applied_limit = if limit > max_limit {
            tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            limit
        };

        self.limit = applied_limit;
        self.offset = offset.unwrap_or(0);
        Ok(self)
    }

    pub fn applied_limit(&self) -> i64 {
        self.limit
    }

    pub fn applied_offset(&self) -> i64 {
        self.offset
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(self.table, self.where_data.as_ref(), &self.options)?;
        let order_clause = if self.order_data.is_empty() {
            format!("ORDER BY \"{}\" ASC", self.table.default_order)
        } else {
            FilterOrder::generate(&self.order_data)
        };

        let query = format!(
            "SELECT * FROM \"{}\" WHERE {} {} LIMIT {} OFFSET {}",
            self.table.name, where_clause, order_clause, self.limit, self.offset
        );
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(self.table, self.where_data.as_ref(), &self.options)?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table.name, where_clause);
        Ok(SqlResult { query, params })
    }
}
