use async_trait::async_trait;
use catalog_types::ports::document_store::{
    document_id, Direction, Document, DocumentStore, Filter, FindOptions, Query, StoreError,
};
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

/// Documents kept as JSON text in a single `documents` table; filters run
/// through SQLite's JSON1 functions.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_documents.sql");
        sqlx::query(ddl).execute(&pool).await?;

        tracing::debug!(database_url, "sqlite document store ready");
        Ok(Self { pool })
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::DbError(e.to_string())
}

fn encode(doc: &Document) -> Result<String, StoreError> {
    serde_json::to_string(doc).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn decode(body: &str) -> Result<Document, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn push_scalar(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) -> Result<(), StoreError> {
    match value {
        Value::String(s) => {
            qb.push_bind(s.clone());
        }
        Value::Bool(b) => {
            qb.push_bind(*b);
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                qb.push_bind(i);
            } else if let Some(f) = n.as_f64() {
                qb.push_bind(f);
            } else {
                return Err(StoreError::Query(format!("number out of range: {n}")));
            }
        }
        other => {
            return Err(StoreError::Query(format!(
                "only scalars can be compared, got {other}"
            )))
        }
    }
    Ok(())
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> Result<(), StoreError> {
    match filter {
        Filter::Eq { field, value } => {
            qb.push(" AND json_extract(body, ");
            qb.push_bind(json_path(field));
            qb.push(") = ");
            push_scalar(qb, value)?;
        }
        Filter::Contains { field, value } => {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(documents.body, ");
            qb.push_bind(json_path(field));
            qb.push(") WHERE json_each.type <> 'object' AND json_each.value = ");
            push_scalar(qb, value)?;
            qb.push(")");
        }
        Filter::ElemMatch { field, key, value } => {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(documents.body, ");
            qb.push_bind(json_path(field));
            qb.push(") WHERE json_each.type = 'object' AND json_extract(json_each.value, ");
            qb.push_bind(json_path(key));
            qb.push(") = ");
            push_scalar(qb, value)?;
            qb.push(")");
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?.to_string();
        let res = sqlx::query("INSERT OR IGNORE INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(id.as_str())
            .bind(encode(&doc)?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }
        Ok(doc)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(|(body,)| decode(&body)).transpose()
    }

    async fn find(
        &self,
        collection: &str,
        query: &Query,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        for filter in &query.filters {
            push_filter(&mut qb, filter)?;
        }
        if let Some(sort) = &options.sort {
            qb.push(" ORDER BY json_extract(body, ");
            qb.push_bind(json_path(&sort.field));
            qb.push(match sort.direction {
                Direction::Ascending => ") ASC",
                Direction::Descending => ") DESC",
            });
        }
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        let limit = options
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(options.skip).unwrap_or(i64::MAX));

        let rows: Vec<(String,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(|(body,)| decode(body)).collect()
    }

    async fn save(&self, collection: &str, doc: Document) -> Result<bool, StoreError> {
        let id = document_id(&doc)?;
        let res = sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(encode(&doc)?)
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected())
    }
}
