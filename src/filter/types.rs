use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    NIn,
    Between,
    Null,
}

impl FilterOp {
    pub fn parse(op_key: &str) -> Option<Self> {
        Some(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            "$null" => FilterOp::Null,
            _ => return None,
        })
    }
}

/// Body of a find request: `{ "where": {...}, "order": "name asc", "limit": 50, "offset": 0 }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(rename = "where", alias = "where_clause")]
    pub where_clause: Option<serde_json::Value>,
    pub order: Option<serde_json::Value>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Postgres type of a filterable column, used to cast bound text parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Uuid,
    Date,
    Timestamp,
    Bool,
    Integer,
}

impl ColumnType {
    pub fn cast(&self) -> &'static str {
        match self {
            ColumnType::Text => "",
            ColumnType::Uuid => "::uuid",
            ColumnType::Date => "::date",
            ColumnType::Timestamp => "::timestamptz",
            ColumnType::Bool => "::boolean",
            ColumnType::Integer => "::bigint",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterColumn {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl FilterColumn {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind }
    }
}

/// A table that may be queried through a filter, with its allow-listed columns
#[derive(Debug, Clone, Copy)]
pub struct FilterTable {
    pub name: &'static str,
    pub columns: &'static [FilterColumn],
    /// Rows carry a `deleted_at` soft-delete marker
    pub soft_delete: bool,
    pub default_order: &'static str,
}

impl FilterTable {
    pub fn column(&self, name: &str) -> Option<&FilterColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: FilterColumn,
    pub operator: FilterOp,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct FilterWhereOptions {
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
