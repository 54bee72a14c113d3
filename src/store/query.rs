//! Query parameters for store reads and write filters.
//!
//! Renders to PostgREST query-string pairs for the REST client and can be
//! evaluated directly against in-memory rows so both store implementations
//! agree on filtering and ordering.

use serde_json::Value;
use std::cmp::Ordering;

use super::{Row, StoreError};

/// Equality filter on a single column.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub value: Value,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column).map(|v| v == &self.value).unwrap_or(false)
    }

    pub(crate) fn to_query_pair(&self) -> (String, String) {
        let rendered = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (self.column.clone(), format!("eq.{}", rendered))
    }
}

#[derive(Debug, Clone)]
pub struct OrderTerm {
    pub column: String,
    pub descending: bool,
}

/// Builder for a table read: filters, ordering, optional limit.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderTerm>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push(OrderTerm {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order.push(OrderTerm {
            column: column.into(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject column names that could smuggle operators into the query string.
    pub fn validate(&self) -> Result<(), StoreError> {
        for column in self
            .conditions
            .iter()
            .map(|c| c.column.as_str())
            .chain(self.order.iter().map(|o| o.column.as_str()))
        {
            validate_identifier(column)?;
        }
        Ok(())
    }

    /// Query-string pairs in the REST dialect: `order=created_at.desc,id.desc`,
    /// `title=eq.Foo`, `limit=3`.
    pub(crate) fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        for condition in &self.conditions {
            pairs.push(condition.to_query_pair());
        }
        if !self.order.is_empty() {
            let rendered = self
                .order
                .iter()
                .map(|o| {
                    format!("{}.{}", o.column, if o.descending { "desc" } else { "asc" })
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), rendered));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Evaluate the query against in-memory rows (MemoryStore path).
    pub(crate) fn apply(&self, rows: &[Row]) -> Vec<Row> {
        let mut out: Vec<Row> = rows
            .iter()
            .filter(|row| self.conditions.iter().all(|c| c.matches(row)))
            .cloned()
            .collect();

        out.sort_by(|a, b| {
            for term in &self.order {
                let left = a.get(&term.column).unwrap_or(&Value::Null);
                let right = b.get(&term.column).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                let ord = if term.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        if let Some(limit) = self.limit {
            out.truncate(limit as usize);
        }
        out
    }
}

fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidQuery(format!(
            "invalid column name: {:?}",
            name
        )))
    }
}

pub(crate) fn validate_table_name(name: &str) -> Result<(), StoreError> {
    validate_identifier(name)
        .map_err(|_| StoreError::InvalidQuery(format!("invalid table name: {:?}", name)))
}

/// Total order over the JSON values a row can hold. ISO-8601 timestamps and
/// uuid strings compare correctly as plain strings.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: Value) -> Row {
        pairs.as_object().cloned().unwrap()
    }

    #[test]
    fn renders_rest_query_pairs() {
        let query = SelectQuery::new()
            .filter(Condition::eq("id", "abc"))
            .order_desc("created_at")
            .order_desc("id")
            .limit(5);

        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("select".into(), "*".into())));
        assert!(pairs.contains(&("id".into(), "eq.abc".into())));
        assert!(pairs.contains(&("order".into(), "created_at.desc,id.desc".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
    }

    #[test]
    fn applies_filter_and_order_in_memory() {
        let rows = vec![
            row(json!({ "id": "a", "created_at": "2026-01-01T00:00:00Z", "kind": "x" })),
            row(json!({ "id": "b", "created_at": "2026-01-03T00:00:00Z", "kind": "x" })),
            row(json!({ "id": "c", "created_at": "2026-01-02T00:00:00Z", "kind": "y" })),
        ];

        let out = SelectQuery::new()
            .filter(Condition::eq("kind", "x"))
            .order_desc("created_at")
            .apply(&rows);

        let ids: Vec<_> = out.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn ties_break_on_secondary_order_term() {
        let rows = vec![
            row(json!({ "id": "a", "created_at": "2026-01-01T00:00:00Z" })),
            row(json!({ "id": "b", "created_at": "2026-01-01T00:00:00Z" })),
        ];

        let out = SelectQuery::new()
            .order_desc("created_at")
            .order_desc("id")
            .apply(&rows);
        let ids: Vec<_> = out.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn rejects_malicious_column_names() {
        let query = SelectQuery::new().order_desc("created_at;drop");
        assert!(query.validate().is_err());
        assert!(validate_table_name("projects").is_ok());
        assert!(validate_table_name("projects; --").is_err());
    }
}
