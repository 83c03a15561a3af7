use serde_json::Value;

use super::error::FilterError;
use super::types::{ColumnType, FilterColumn, FilterOp, FilterTable, FilterWhereInfo, FilterWhereOptions};

pub struct FilterWhere<'t> {
    table: &'t FilterTable,
    param_values: Vec<Value>,
}

impl<'t> FilterWhere<'t> {
    pub fn new(table: &'t FilterTable) -> Self {
        Self { table, param_values: vec![] }
    }

    pub fn generate(
        table: &'t FilterTable,
        where_data: Option<&Value>,
        options: &FilterWhereOptions,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(table);

        let mut sql_conditions = vec![];
        if table.soft_delete && !options.include_deleted {
            sql_conditions.push("\"deleted_at\" IS NULL".to_string());
        }
        if let Some(data) = where_data {
            sql_conditions.extend(filter_where.parse_group(data)?);
        }

        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            Value::String(_) => Err(FilterError::InvalidWhereClause("Raw SQL conditions are not accepted".to_string())),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    /// Conditions of one object level, implicitly ANDed
    fn parse_group(&mut self, where_data: &Value) -> Result<Vec<String>, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(vec![]),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        };

        let mut out = vec![];
        for (key, value) in obj {
            if key.starts_with('$') {
                out.push(self.parse_logical_operator(key, value)?);
            } else {
                for info in self.parse_field_condition(key, value)? {
                    if let Some(sql) = self.build_sql_condition(&info)? {
                        out.push(sql);
                    }
                }
            }
        }
        Ok(out)
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                if arr.is_empty() {
                    return Err(FilterError::InvalidOperatorData(format!("{} requires at least one condition", op)));
                }
                let mut sql_parts = Vec::new();
                for v in arr {
                    let group = self.parse_group(v)?;
                    let inner = if group.is_empty() { "1=1".to_string() } else { group.join(" AND ") };
                    sql_parts.push(format!("({})", inner));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", sql_parts.join(joiner)))
            }
            "$not" => {
                let group = self.parse_group(value)?;
                let inner = if group.is_empty() { "1=1".to_string() } else { group.join(" AND ") };
                Ok(format!("NOT ({})", inner))
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(&self, field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let column = *self
            .table
            .column(field)
            .ok_or_else(|| FilterError::InvalidColumn(format!("'{}' is not filterable on {}", field, self.table.name)))?;

        if let Value::Object(obj) = value {
            let mut out = vec![];
            for (op_key, op_val) in obj {
                let operator = FilterOp::parse(op_key).ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                out.push(FilterWhereInfo { column, operator, data: op_val.clone() });
            }
            Ok(out)
        } else {
            // Implicit equality: { field: value }
            Ok(vec![FilterWhereInfo { column, operator: FilterOp::Eq, data: value.clone() }])
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<Option<String>, FilterError> {
        let column = condition.column;
        let quoted_column = format!("\"{}\"", column.name);
        let data = &condition.data;

        match condition.operator {
            FilterOp::Eq => {
                if data.is_null() {
                    Ok(Some(format!("{} IS NULL", quoted_column)))
                } else {
                    Ok(Some(format!("{} = {}", quoted_column, self.param(column, data)?)))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    Ok(Some(format!("{} IS NOT NULL", quoted_column)))
                } else {
                    Ok(Some(format!("{} <> {}", quoted_column, self.param(column, data)?)))
                }
            }
            FilterOp::Gt => Ok(Some(format!("{} > {}", quoted_column, self.param(column, data)?))),
            FilterOp::Gte => Ok(Some(format!("{} >= {}", quoted_column, self.param(column, data)?))),
            FilterOp::Lt => Ok(Some(format!("{} < {}", quoted_column, self.param(column, data)?))),
            FilterOp::Lte => Ok(Some(format!("{} <= {}", quoted_column, self.param(column, data)?))),
            FilterOp::Like | FilterOp::ILike => {
                if column.kind != ColumnType::Text || !data.is_string() {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "pattern match on '{}' requires a text column and a string pattern",
                        column.name
                    )));
                }
                let keyword = if condition.operator == FilterOp::Like { "LIKE" } else { "ILIKE" };
                Ok(Some(format!("{} {} {}", quoted_column, keyword, self.param(column, data)?)))
            }
            FilterOp::In | FilterOp::NIn => {
                let values = data
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData("$in/$nin require an array".to_string()))?;
                let negate = condition.operator == FilterOp::NIn;
                if values.is_empty() {
                    // Nothing is in an empty set
                    return Ok(Some(if negate { "1=1" } else { "1=0" }.to_string()));
                }
                let params = values.iter().map(|v| self.param(column, v)).collect::<Result<Vec<_>, _>>()?;
                let keyword = if negate { "NOT IN" } else { "IN" };
                Ok(Some(format!("{} {} ({})", quoted_column, keyword, params.join(", "))))
            }
            FilterOp::Between => match data.as_array() {
                Some(values) if values.len() == 2 => Ok(Some(format!(
                    "{} BETWEEN {} AND {}",
                    quoted_column,
                    self.param(column, &values[0])?,
                    self.param(column, &values[1])?
                ))),
                _ => Err(FilterError::InvalidOperatorData("$between requires array with 2 values".to_string())),
            },
            FilterOp::Null => match data.as_bool() {
                Some(true) => Ok(Some(format!("{} IS NULL", quoted_column))),
                Some(false) => Ok(Some(format!("{} IS NOT NULL", quoted_column))),
                None => Err(FilterError::InvalidOperatorData("$null requires a boolean".to_string())),
            },
        }
    }

    fn param(&mut self, column: FilterColumn, value: &Value) -> Result<String, FilterError> {
        if value.is_array() || value.is_object() {
            return Err(FilterError::InvalidOperatorData(format!("'{}' expects a scalar value", column.name)));
        }
        self.param_values.push(value.clone());
        Ok(format!("${}{}", self.param_values.len(), column.kind.cast()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[FilterColumn] = &[
        FilterColumn::new("name", ColumnType::Text),
        FilterColumn::new("status", ColumnType::Text),
        FilterColumn::new("place_id", ColumnType::Uuid),
        FilterColumn::new("registered_on", ColumnType::Date),
    ];

    const TABLE: FilterTable = FilterTable {
        name: "boards",
        columns: COLUMNS,
        soft_delete: true,
        default_order: "name",
    };

    #[test]
    fn implicit_equality_with_soft_delete() {
        let (sql, params) =
            FilterWhere::generate(&TABLE, Some(&json!({ "status": "active" })), &FilterWhereOptions::default()).unwrap();
        assert_eq!(sql, "\"deleted_at\" IS NULL AND \"status\" = $1");
        assert_eq!(params, vec![json!("active")]);
    }

    #[test]
    fn uuid_and_date_parameters_are_cast() {
        let where_data = json!({
            "place_id": { "$in": ["6f1c1f9e-1d0b-4c38-9d57-08f5a9f0c001", "6f1c1f9e-1d0b-4c38-9d57-08f5a9f0c002"] },
            "registered_on": { "$between": ["2020-01-01", "2020-12-31"] }
        });
        let options = FilterWhereOptions { include_deleted: true };
        let (sql, params) = FilterWhere::generate(&TABLE, Some(&where_data), &options).unwrap();
        assert!(sql.contains("\"place_id\" IN ($1::uuid, $2::uuid)"));
        assert!(sql.contains("\"registered_on\" BETWEEN $3::date AND $4::date"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn nested_logic_numbers_parameters_in_order() {
        let where_data = json!({
            "$or": [
                { "name": { "$ilike": "%carmen%" } },
                { "$not": { "status": "dissolved" } }
            ]
        });
        let (sql, params) = FilterWhere::generate(&TABLE, Some(&where_data), &FilterWhereOptions::default()).unwrap();
        assert_eq!(
            sql,
            "\"deleted_at\" IS NULL AND ((\"name\" ILIKE $1) OR (NOT (\"status\" = $2)))"
        );
        assert_eq!(params, vec![json!("%carmen%"), json!("dissolved")]);
    }

    #[test]
    fn rejects_unknown_columns_and_raw_sql() {
        let err = FilterWhere::generate(&TABLE, Some(&json!({ "password_hash": "x" })), &FilterWhereOptions::default());
        assert!(matches!(err, Err(FilterError::InvalidColumn(_))));
        assert!(FilterWhere::validate(&json!("1=1; DROP TABLE boards")).is_err());
    }

    #[test]
    fn empty_in_matches_nothing() {
        let (sql, params) =
            FilterWhere::generate(&TABLE, Some(&json!({ "status": { "$in": [] } })), &FilterWhereOptions::default()).unwrap();
        assert!(sql.ends_with("1=0"));
        assert!(params.is_empty());
    }

    #[test]
    fn pattern_match_requires_text_column() {
        let err = FilterWhere::generate(&TABLE, Some(&json!({ "place_id": { "$like": "6f%" } })), &FilterWhereOptions::default());
        assert!(matches!(err, Err(FilterError::InvalidOperatorData(_))));
    }
}
