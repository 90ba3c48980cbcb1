mod relations;
mod schema;
mod seed;

pub use seed::{seed_if_empty, SeedReport, SEED_ASSIGNEE_COUNT, SEED_TASK_COUNT};

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;

use crate::models::Record;

/// Keys managed by the store rather than by callers.
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Handle to the document store.
///
/// Cloning is cheap; all clones share one SQLite connection and each store
/// operation holds the connection lock for its whole duration.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the store named by a connection string.
    ///
    /// Accepts a plain file path, `sqlite://<path>`, or `:memory:`.
    pub fn open(url: &str) -> Result<Self> {
        let target = url.strip_prefix("sqlite://").unwrap_or(url);
        if target == ":memory:" {
            return Self::open_memory();
        }
        Self::open_path(Path::new(target))
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .context("failed to enable WAL journal")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Opens `taskboard.db` in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "taskboard")
            .ok_or_else(|| anyhow!("could not determine a data directory"))?;
        Self::open_path(&dirs.data_dir().join("taskboard.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn migrate(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(schema::SCHEMA)
                .context("failed to apply schema")
        })
    }

    /// Closes the connection if this is the last handle.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| anyhow!("database connection lock poisoned"))?;
                conn.close()
                    .map_err(|(_, e)| e)
                    .context("failed to close database")?;
                tracing::info!("Database connection closed");
            }
            Err(_) => {
                tracing::debug!("Database still shared, connection closes with the last handle");
            }
        }
        Ok(())
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&mut conn)
    }

    // Collection operations

    /// All records in insertion order.
    pub fn list_all<R: Record>(&self) -> Result<Vec<R>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT doc, created_at, updated_at FROM {} ORDER BY seq",
                R::COLLECTION
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], raw_row)?;
            collect_records(rows)
        })
        .with_context(|| format!("failed to list {}", R::COLLECTION))
    }

    pub fn count<R: Record>(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", R::COLLECTION);
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(usize::try_from(count)?)
        })
        .with_context(|| format!("failed to count {}", R::COLLECTION))
    }

    /// First record whose `field` equals `value`, if any.
    pub fn find_by_field<R: Record>(&self, field: &str, value: &str) -> Result<Option<R>> {
        let sql = find_one_sql(R::COLLECTION, field)?;
        self.with_conn(|conn| {
            let row = conn
                .query_row(&sql, params![value], raw_row)
                .optional()?;
            row.map(decode::<R>).transpose()
        })
        .with_context(|| format!("failed to find {} by {}", R::NAME, field))
    }

    /// Every record whose `field` is one of `values`.
    pub fn find_many_by_field_in<R: Record>(
        &self,
        field: &str,
        values: &[String],
    ) -> Result<Vec<R>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let set = serde_json::to_string(values)?;
        let sql = format!(
            "SELECT doc, created_at, updated_at FROM {}
             WHERE {} IN (SELECT value FROM json_each(?1))
             ORDER BY seq",
            R::COLLECTION,
            field_expr(field)?
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![set], raw_row)?;
            collect_records(rows)
        })
        .with_context(|| format!("failed to find {} by {}", R::COLLECTION, field))
    }

    /// Persists a new record and returns it with its timestamps.
    ///
    /// Fails when a record with the same identifier already exists.
    pub fn create<R: Record>(&self, record: &R) -> Result<R> {
        let doc = to_document(record)?;
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO {} (id, doc, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                R::COLLECTION
            );
            conn.execute(&sql, params![record.id(), doc, now])?;
            Ok(())
        })
        .with_context(|| format!("failed to create {} {}", R::NAME, record.id()))?;
        decode((doc, now.clone(), now))
    }

    /// Inserts a batch of records in a single transaction.
    pub fn create_many<R: Record>(&self, records: &[R]) -> Result<usize> {
        let docs = records
            .iter()
            .map(|record| to_document(record).map(|doc| (record.id(), doc)))
            .collect::<Result<Vec<_>>>()?;
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let sql = format!(
                    "INSERT INTO {} (id, doc, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                    R::COLLECTION
                );
                let mut stmt = tx.prepare(&sql)?;
                for (id, doc) in &docs {
                    stmt.execute(params![id, doc, now])?;
                }
            }
            tx.commit()?;
            Ok(docs.len())
        })
        .with_context(|| format!("failed to insert {} batch", R::COLLECTION))
    }

    /// Merges `patch` into the first record whose `field` equals `value`.
    ///
    /// Fields absent from the patch keep their stored values. The identifier
    /// and timestamps cannot be patched.
    pub fn update_by_field<R: Record, P: Serialize>(
        &self,
        field: &str,
        value: &str,
        patch: &P,
    ) -> Result<Option<R>> {
        let mut patch = serde_json::to_value(patch)?;
        let Value::Object(fields) = &mut patch else {
            bail!("update for {} must be a JSON object", R::NAME);
        };
        fields.remove("id");
        fields.remove(CREATED_AT);
        fields.remove(UPDATED_AT);
        let patch = patch.to_string();
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "SELECT seq FROM {} WHERE {} = ?1 ORDER BY seq LIMIT 1",
            R::COLLECTION,
            field_expr(field)?
        );

        self.with_conn(|conn| {
            let seq: Option<i64> = conn
                .query_row(&sql, params![value], |row| row.get(0))
                .optional()?;
            let Some(seq) = seq else {
                return Ok(None);
            };

            let sql = format!(
                "UPDATE {} SET doc = json_patch(doc, ?1), updated_at = ?2 WHERE seq = ?3",
                R::COLLECTION
            );
            conn.execute(&sql, params![patch, now, seq])?;

            let sql = format!(
                "SELECT doc, created_at, updated_at FROM {} WHERE seq = ?1",
                R::COLLECTION
            );
            let row = conn.query_row(&sql, params![seq], raw_row)?;
            decode(row).map(Some)
        })
        .with_context(|| format!("failed to update {} {}", R::NAME, value))
    }

    /// Removes the first record whose `field` equals `value`. A miss is a no-op.
    pub fn delete_by_field<R: Record>(&self, field: &str, value: &str) -> Result<usize> {
        self.delete_by_fields::<R>(&[(field, value)])
    }

    /// Removes the first record matching every `(field, value)` pair.
    /// A miss is a no-op.
    pub fn delete_by_fields<R: Record>(&self, filter: &[(&str, &str)]) -> Result<usize> {
        if filter.is_empty() {
            bail!("refusing to delete from {} without a filter", R::COLLECTION);
        }
        let conditions = filter
            .iter()
            .enumerate()
            .map(|(i, (field, _))| {
                field_expr(field).map(|expr| format!("{} = ?{}", expr, i + 1))
            })
            .collect::<Result<Vec<_>>>()?
            .join(" AND ");
        let values = filter.iter().map(|(_, value)| *value);

        self.with_conn(|conn| {
            let sql = format!(
                "DELETE FROM {table} WHERE seq =
                 (SELECT seq FROM {table} WHERE {conditions} ORDER BY seq LIMIT 1)",
                table = R::COLLECTION
            );
            Ok(conn.execute(&sql, params_from_iter(values))?)
        })
        .with_context(|| format!("failed to delete {}", R::NAME))
    }
}

type RawRow = (String, String, String);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn collect_records<R: Record>(
    rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
) -> Result<Vec<R>> {
    rows.map(|row| decode(row?)).collect()
}

/// SQL expression selecting `field` from a stored document.
///
/// `id` maps to the indexed column. Other fields are inlined as literal JSON
/// paths so SQLite can match them against expression indexes; only plain
/// identifiers are accepted.
fn field_expr(field: &str) -> Result<String> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("invalid field name {:?}", field);
    }
    if field == "id" {
        return Ok("id".to_string());
    }
    Ok(format!("json_extract(doc, '$.{}')", field))
}

fn find_one_sql(table: &str, field: &str) -> Result<String> {
    Ok(format!(
        "SELECT doc, created_at, updated_at FROM {} WHERE {} = ?1 ORDER BY seq LIMIT 1",
        table,
        field_expr(field)?
    ))
}

/// Serializes a record to its stored document, leaving out store-managed keys.
fn to_document<R: Record>(record: &R) -> Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut value {
        fields.remove(CREATED_AT);
        fields.remove(UPDATED_AT);
    }
    Ok(value.to_string())
}

fn decode<R: Record>((doc, created_at, updated_at): RawRow) -> Result<R> {
    let mut value: Value = serde_json::from_str(&doc)?;
    if let Value::Object(fields) = &mut value {
        fields.insert(CREATED_AT.to_string(), Value::String(created_at));
        fields.insert(UPDATED_AT.to_string(), Value::String(updated_at));
    }
    serde_json::from_value(value).with_context(|| format!("malformed {} document", R::NAME))
}
