use std::sync::Arc;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::errors::CoordError;
use super::Database;

/// A stored document: JSON body plus store-managed identity and timestamps.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// The body with `id`, `created_at` and `updated_at` folded in.
    pub fn into_record(self) -> Value {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("id".into(), Value::String(self.id));
            map.insert("created_at".into(), Value::String(format_timestamp(self.created_at)));
            map.insert("updated_at".into(), Value::String(format_timestamp(self.updated_at)));
        }
        data
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, CoordError> {
        Ok(serde_json::from_value(self.into_record())?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    In,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Field is null or `<=` the value.
    LteOrNull,
}

impl FilterOp {
    fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "IS",
            Self::Ne => "IS NOT",
            Self::In => "IN",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::LteOrNull => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Filtered, ordered, limited query over one collection.
///
/// Field names address top-level JSON fields of the document body, except
/// `id`, `created_at` and `updated_at`, which address the store columns.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter { field: field.to_string(), op, value });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Collection-scoped document persistence.
///
/// Every call is atomic for the single document it touches; there are no
/// multi-document transactions.
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its store-assigned id.
    fn add(&self, collection: &str, data: Value) -> Result<String, CoordError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoordError>;

    /// Shallow merge: each top-level key of `fields` replaces the stored
    /// value whole, nulls included. Re-stamps `updated_at`.
    /// Fails with `NotFound` if the id is absent.
    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), CoordError>;

    fn delete(&self, collection: &str, id: &str) -> Result<bool, CoordError>;

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, CoordError>;
}

/// Handle bound to one collection of a shared store.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
}

impl Collection {
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self { store, name }
    }

    pub fn add(&self, data: Value) -> Result<String, CoordError> {
        self.store.add(self.name, data)
    }

    pub fn get(&self, id: &str) -> Result<Option<Document>, CoordError> {
        self.store.get(self.name, id)
    }

    pub fn update(&self, id: &str, fields: Value) -> Result<(), CoordError> {
        self.store.update(self.name, id, fields)
    }

    pub fn delete(&self, id: &str) -> Result<bool, CoordError> {
        self.store.delete(self.name, id)
    }

    pub fn query(&self, query: &Query) -> Result<Vec<Document>, CoordError> {
        self.store.query(self.name, query)
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so that column values sort chronologically as text.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CoordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoordError::Database(format!("Corrupt timestamp '{}': {}", value, e)))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn field_expr(field: &str, params: &mut Vec<SqlValue>) -> String {
    match field {
        "id" | "created_at" | "updated_at" => field.to_string(),
        other => {
            params.push(SqlValue::Text(format!("$.{}", other)));
            format!("json_extract(data, ?{})", params.len())
        }
    }
}

/// JSON path to a top-level key.
fn field_path(key: &str) -> Result<String, CoordError> {
    if key.is_empty() || key.contains('"') {
        return Err(CoordError::InvalidRequest(format!("Invalid field name: {:?}", key)));
    }
    Ok(format!("$.\"{}\"", key))
}

fn require_object(value: &Value, what: &str) -> Result<(), CoordError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(CoordError::InvalidRequest(format!("{} must be a JSON object", what)))
    }
}

type RawRow = (String, String, String, String);

fn decode_row(raw: RawRow) -> Result<Document, CoordError> {
    let (id, data, created_at, updated_at) = raw;
    Ok(Document {
        data: serde_json::from_str(&data)
            .map_err(|e| CoordError::Database(format!("Corrupt document {}: {}", id, e)))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        id,
    })
}

impl DocumentStore for Database {
    fn add(&self, collection: &str, data: Value) -> Result<String, CoordError> {
        require_object(&data, "Document")?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = format_timestamp(Utc::now());
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            rusqlite::params![collection, id, data.to_string(), now],
        ).map_err(|e| CoordError::Database(format!("Insert into {} failed: {}", collection, e)))?;
        Ok(id)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoordError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = ?1 AND id = ?2"
        ).map_err(|e| CoordError::Database(format!("Query failed: {}", e)))?;

        let result = stmt.query_row(rusqlite::params![collection, id], |row: &rusqlite::Row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        });

        match result {
            Ok(raw) => decode_row(raw).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CoordError::Database(format!("Query error: {}", e))),
        }
    }

    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), CoordError> {
        let Value::Object(fields) = fields else {
            return Err(CoordError::InvalidRequest("Update must be a JSON object".into()));
        };
        let mut params: Vec<SqlValue> = vec![
            SqlValue::Text(format_timestamp(Utc::now())),
            SqlValue::Text(collection.to_string()),
            SqlValue::Text(id.to_string()),
        ];
        let mut assignments = Vec::with_capacity(fields.len());
        for (key, value) in &fields {
            params.push(SqlValue::Text(field_path(key)?));
            params.push(SqlValue::Text(value.to_string()));
            assignments.push(format!("?{}, json(?{})", params.len() - 1, params.len()));
        }
        let data = if assignments.is_empty() {
            "data".to_string()
        } else {
            format!("json_set(data, {})", assignments.join(", "))
        };

        let conn = self.lock()?;
        let affected = conn.execute(
            &format!("UPDATE documents SET data = {}, updated_at = ?1 WHERE collection = ?2 AND id = ?3", data),
            rusqlite::params_from_iter(params.iter()),
        ).map_err(|e| CoordError::Database(format!("Update failed: {}", e)))?;

        if affected == 0 {
            return Err(CoordError::NotFound(format!("{}/{}", collection, id)));
        }
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, CoordError> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id],
        ).map_err(|e| CoordError::Database(format!("Delete failed: {}", e)))?;
        Ok(affected > 0)
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, CoordError> {
        let mut sql = String::from(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = ?1"
        );
        let mut params: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

        for filter in &query.filters {
            let expr = field_expr(&filter.field, &mut params);
            if filter.op == FilterOp::In {
                let values = filter.value.as_array().ok_or_else(|| {
                    CoordError::InvalidRequest(format!("'in' filter on {} requires an array", filter.field))
                })?;
                if values.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders: Vec<String> = values.iter().map(|v| {
                    params.push(to_sql_value(v));
                    format!("?{}", params.len())
                }).collect();
                sql.push_str(&format!(" AND {} IN ({})", expr, placeholders.join(", ")));
            } else if filter.op == FilterOp::LteOrNull {
                params.push(to_sql_value(&filter.value));
                sql.push_str(&format!(" AND ({expr} IS NULL OR {expr} <= ?{})", params.len()));
            } else {
                params.push(to_sql_value(&filter.value));
                sql.push_str(&format!(" AND {} {} ?{}", expr, filter.op.sql(), params.len()));
            }
        }

        if let Some((field, direction)) = &query.order_by {
            let expr = field_expr(field, &mut params);
            let dir = match direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            sql.push_str(&format!(" ORDER BY {expr} {dir}, rowid {dir}"));
        } else {
            sql.push_str(" ORDER BY rowid ASC");
        }

        if let Some(limit) = query.limit {
            params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)
            .map_err(|e| CoordError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row: &rusqlite::Row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        }).map_err(|e| CoordError::Database(format!("Query error: {}", e)))?;

        let mut results: Vec<Document> = Vec::new();
        for row in rows {
            let raw: RawRow = row.map_err(|e| CoordError::Database(format!("Row error: {}", e)))?;
            results.push(decode_row(raw)?);
        }
        Ok(results)
    }
}
