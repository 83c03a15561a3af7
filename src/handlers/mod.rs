// handlers/mod.rs - three access tiers
//
// Public (no auth) -> Protected (session required, writes need operator or admin)
// -> Elevated (admin only)

pub mod elevated; // /api/users/*, /api/admin/*
pub mod protected; // /api/*
pub mod public; // /, /health, /auth/*, /certificates/verify/*

use serde::Deserialize;

use crate::filter::FilterData;

/// `?limit=&offset=&order=` on list endpoints; POST /find takes a full `FilterData` body
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> FilterData {
        FilterData {
            where_clause: None,
            order: self.order.map(serde_json::Value::String),
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Same paging with server-side conditions
    pub fn with_where(self, where_clause: serde_json::Value) -> FilterData {
        FilterData {
            where_clause: Some(where_clause),
            ..self.into_filter()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_becomes_filter() {
        let query = ListQuery {
            limit: Some(10),
            offset: None,
            order: Some("name desc".into()),
        };
        let filter = query.with_where(serde_json::json!({ "kind": "department" }));
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.order, Some(serde_json::json!("name desc")));
        assert_eq!(filter.where_clause, Some(serde_json::json!({ "kind": "department" })));
    }
}
