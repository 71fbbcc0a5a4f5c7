use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::backend::{ObjectStore, TableStore};
use crate::error::{Result, StorageError};
use crate::query::{Query, SortDirection, value_as_text};

/// Store operations that can be counted or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    Upload,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-process store used for local runs and tests.
///
/// Inserted rows get an `id` and `created_at` when the caller did not supply
/// them, the way the hosted database fills its generated columns.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<HashMap<Operation, usize>>,
    public_base: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_public_base("memory://store")
    }

    pub fn with_public_base(public_base: impl Into<String>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Make every following `operation` fail until [`recover`](Self::recover) is called
    pub fn fail(&self, operation: Operation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
    }

    /// Number of times `operation` was issued, failed attempts included
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Insert rows verbatim, bypassing generated columns and call counting
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), path.to_string()))
            .map(|object| object.bytes.clone())
    }

    pub fn object_content_type(&self, bucket: &str, path: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), path.to_string()))
            .map(|object| object.content_type.clone())
    }

    fn begin(&self, operation: Operation) -> Result<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_insert(0) += 1;

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&operation);
        if failing {
            return Err(StorageError::Unavailable(format!(
                "{:?} rejected by memory store",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        self.begin(Operation::Select)?;

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| {
                query.filters.iter().all(|filter| {
                    row.get(&filter.column).map(value_as_text).as_deref()
                        == Some(filter.value.as_str())
                })
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(columns) = &query.columns {
            rows = rows
                .into_iter()
                .map(|row| {
                    let projected: Map<String, Value> = columns
                        .iter()
                        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(projected)
                })
                .collect();
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.begin(Operation::Insert)?;

        let Value::Object(mut fields) = row else {
            return Err(StorageError::InvalidObject(
                "row must be a JSON object".to_string(),
            ));
        };

        if fields.get("id").is_none_or(Value::is_null) {
            fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if fields.get("created_at").is_none_or(Value::is_null) {
            fields.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let row = Value::Object(fields);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<u64> {
        self.begin(Operation::Update)?;

        let Value::Object(patch) = patch else {
            return Err(StorageError::InvalidObject(
                "patch must be a JSON object".to_string(),
            ));
        };

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut affected = 0;
        for row in tables.get_mut(table).into_iter().flatten() {
            if row.get("id").map(value_as_text).as_deref() != Some(id) {
                continue;
            }
            if let Value::Object(fields) = row {
                for (key, value) in &patch {
                    fields.insert(key.clone(), value.clone());
                }
                affected += 1;
            }
        }

        Ok(affected)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64> {
        self.begin(Operation::Delete)?;

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| row.get("id").map(value_as_text).as_deref() != Some(id));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.begin(Operation::Upload)?;

        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (bucket.to_string(), path.to_string()),
                StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                },
            );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_base, bucket, path
        )
    }
}

/// Column ordering the way Postgres sorts: timestamps chronologically, numbers
/// numerically, nulls after everything else when ascending.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => value_as_text(a).cmp(&value_as_text(b)),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_fills_generated_columns() {
        let store = MemoryStore::new();
        let row = store
            .insert("teams", json!({ "name": "Ada" }))
            .await
            .unwrap();

        assert!(row["id"].is_string());
        assert!(parse_timestamp(row["created_at"].as_str().unwrap()).is_some());
        assert_eq!(store.rows("teams").len(), 1);
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_projects() {
        let store = MemoryStore::new();
        store.seed(
            "teams",
            [
                json!({ "id": "a", "status": "active", "created_at": "2024-01-02T00:00:00.5+00:00" }),
                json!({ "id": "b", "status": "hidden", "created_at": "2024-01-01T00:00:00+00:00" }),
                json!({ "id": "c", "status": "active", "created_at": "2024-01-02T00:00:00+00:00" }),
            ],
        );

        let query = Query::columns(&["id"])
            .eq("status", "active")
            .order("created_at", SortDirection::Ascending);
        let rows = store.select("teams", &query).await.unwrap();

        assert_eq!(rows, vec![json!({ "id": "c" }), json!({ "id": "a" })]);
    }

    #[tokio::test]
    async fn test_descending_order_puts_nulls_first() {
        let store = MemoryStore::new();
        store.seed(
            "t",
            [json!({ "id": "1", "n": 1 }), json!({ "id": "2", "n": null }), json!({ "id": "3", "n": 3 })],
        );

        let rows = store
            .select("t", &Query::all().order("n", SortDirection::Descending))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_affected_rows() {
        let store = MemoryStore::new();
        store.seed("teams", [json!({ "id": "a", "status": "active" })]);

        assert_eq!(
            store.update("teams", "a", json!({ "status": "retired" })).await.unwrap(),
            1
        );
        assert_eq!(store.rows("teams")[0]["status"], "retired");
        assert_eq!(store.update("teams", "zzz", json!({})).await.unwrap(), 0);

        assert_eq!(store.delete("teams", "a").await.unwrap(), 1);
        assert_eq!(store.delete("teams", "a").await.unwrap(), 0);
        assert_eq!(store.delete("missing_table", "a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let store = MemoryStore::new();
        store.fail(Operation::Select);

        let err = store.select("teams", &Query::all()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.calls(Operation::Select), 1);

        store.recover(Operation::Select);
        assert!(store.select("teams", &Query::all()).await.is_ok());
        assert_eq!(store.calls(Operation::Select), 2);
        assert_eq!(store.calls(Operation::Insert), 0);
    }

    #[tokio::test]
    async fn test_objects_round_trip_with_public_url() {
        let store = MemoryStore::with_public_base("https://project.example.co/");
        store
            .upload("team-images", "x.png", vec![9, 9], "image/png")
            .await
            .unwrap();

        assert_eq!(store.object("team-images", "x.png"), Some(vec![9, 9]));
        assert_eq!(
            store.object_content_type("team-images", "x.png").as_deref(),
            Some("image/png")
        );
        assert_eq!(
            store.public_url("team-images", "x.png"),
            "https://project.example.co/storage/v1/object/public/team-images/x.png"
        );
    }
}
