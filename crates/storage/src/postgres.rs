use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::backend::TableStore;
use crate::error::{Result, StorageError};
use crate::query::Query;

/// Direct connection to the project's Postgres database
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Quote a table or column name after checking it is a plain lowercase identifier
fn ident(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(StorageError::InvalidIdentifier(name.to_string()))
    }
}

fn object_columns(row: &Value) -> Result<Vec<String>> {
    let Value::Object(fields) = row else {
        return Err(StorageError::InvalidObject(
            "row must be a JSON object".to_string(),
        ));
    };
    if fields.is_empty() {
        return Err(StorageError::InvalidObject("row has no columns".to_string()));
    }
    fields.keys().map(|k| ident(k)).collect()
}

pub(crate) fn build_select(table: &str, query: &Query) -> Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT ");

    match &query.columns {
        None => {
            builder.push("to_jsonb(t)");
        }
        Some(columns) => {
            let pairs = columns
                .iter()
                .map(|c| -> Result<String> { Ok(format!("'{}', t.{}", c, ident(c)?)) })
                .collect::<Result<Vec<_>>>()?;
            builder.push(format!("jsonb_build_object({})", pairs.join(", ")));
        }
    }
    builder.push(format!(" AS data FROM {} AS t", ident(table)?));

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(format!("t.{}::text = ", ident(&filter.column)?));
        builder.push_bind(filter.value.clone());
    }

    if let Some(order) = &query.order {
        builder.push(format!(
            " ORDER BY t.{} {}",
            ident(&order.column)?,
            order.direction.as_sql()
        ));
    }

    Ok(builder)
}

#[async_trait]
impl TableStore for Database {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let mut builder = build_select(table, query)?;
        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| row.try_get::<Value, _>("data").map_err(StorageError::from))
            .collect()
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let table = ident(table)?;
        let columns = object_columns(&row)?.join(", ");

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {table} AS t ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, "
        ));
        builder.push_bind(row);
        builder.push(") RETURNING to_jsonb(t) AS data");

        let inserted = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.code().as_deref() == Some("23505") {
                        return StorageError::ConstraintViolation(
                            "Row already exists".to_string(),
                        );
                    }
                }
                StorageError::from(e)
            })?;

        Ok(inserted.try_get::<Value, _>("data")?)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<u64> {
        let table = ident(table)?;
        let assignments = object_columns(&patch)?
            .iter()
            .map(|c| format!("{c} = r.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {table} AS t SET {assignments} FROM jsonb_populate_record(NULL::{table}, "
        ));
        builder.push_bind(patch);
        builder.push(") AS r WHERE t.\"id\"::text = ");
        builder.push_bind(id.to_string());

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} AS t WHERE t.\"id\"::text = $1",
            ident(table)?
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
