//! SQLite store access.
//!
//! Each request opens its own [`StoreSession`], uses it for introspection
//! and execution, and drops it on completion. The service never pools
//! connections because the database file may be replaced between requests.

use crate::classify::StatementKind;
use crate::config::Config;
use crate::db::schema::{SchemaDescription, TableDescription};
use crate::db::types::{ExecutionOutcome, ResultSet, Row, Value};
use crate::error::{BlueQueryError, Result};
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, TypeInfo};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Handle to the configured SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    max_rows: usize,
    timeout: Duration,
}

impl SqliteStore {
    /// Creates a store handle from the service configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.db_path.clone(),
            max_rows: config.max_rows,
            timeout: Duration::from_secs(config.query_timeout_secs),
        }
    }

    /// The configured database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the database file currently exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Opens a connection for the duration of one request.
    ///
    /// The file is never created here; a missing database is a
    /// configuration problem reported before any session is opened.
    pub async fn open_session(&self) -> Result<StoreSession> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(false);

        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| {
                BlueQueryError::db(format!("Failed to open {}: {e}", self.path.display()))
            })?;

        Ok(StoreSession {
            conn,
            max_rows: self.max_rows,
            timeout: self.timeout,
        })
    }
}

/// A single-request database session.
#[derive(Debug)]
pub struct StoreSession {
    conn: SqliteConnection,
    max_rows: usize,
    timeout: Duration,
}

impl StoreSession {
    /// Builds the schema description for the translation prompt.
    ///
    /// Tables come back in name order; SQLite internals (`sqlite_*`) are
    /// skipped. A database with no user tables yields an empty description.
    pub async fn introspect_schema(&mut self) -> Result<SchemaDescription> {
        let table_names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&mut self.conn)
                .await
                .map_err(|e| BlueQueryError::db(format!("Failed to list tables: {e}")))?;

        let mut tables = Vec::new();
        for name in table_names
            .into_iter()
            .filter(|name| !name.starts_with("sqlite_"))
        {
            let columns = self.table_columns(&name).await?;
            tables.push(TableDescription::new(name, columns));
        }

        Ok(SchemaDescription { tables })
    }

    /// Lists the column names of one table in declared order.
    ///
    /// An unknown table yields an empty list, matching PRAGMA semantics.
    pub async fn table_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| BlueQueryError::db(format!("Failed to read columns for {table}: {e}")))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name").map_err(|e| {
                    BlueQueryError::db(format!("Failed to read columns for {table}: {e}"))
                })
            })
            .collect()
    }

    /// Executes one resolved statement under the configured timeout.
    pub async fn execute(&mut self, sql: &str, kind: StatementKind) -> Result<ExecutionOutcome> {
        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.run_statement(sql, kind))
            .await
            .map_err(|_| {
                warn!(seconds = timeout.as_secs(), "statement execution timed out");
                BlueQueryError::db(format!(
                    "query timed out after {} seconds",
                    timeout.as_secs()
                ))
            })?
    }

    async fn run_statement(&mut self, sql: &str, kind: StatementKind) -> Result<ExecutionOutcome> {
        if kind.returns_rows() {
            let result = self.fetch_capped(sql).await?;
            debug!(
                rows = result.row_count(),
                truncated = result.truncated,
                "fetched result set"
            );
            Ok(ExecutionOutcome::Rows(result))
        } else {
            let done = sqlx::query(sql)
                .execute(&mut self.conn)
                .await
                .map_err(|e| BlueQueryError::db(format_execution_error(e)))?;
            debug!(rows_affected = done.rows_affected(), "executed mutation");
            Ok(ExecutionOutcome::Mutation {
                rows_affected: done.rows_affected(),
            })
        }
    }

    /// Fetches at most `max_rows` rows; the cap is applied here, at the
    /// data-access boundary, so no more rows ever reach the formatter.
    ///
    /// A result that fills the cap exactly is reported as truncated, the
    /// same way a batched fetch cannot tell "exactly the cap" from "more
    /// remaining" without reading further.
    async fn fetch_capped(&mut self, sql: &str) -> Result<ResultSet> {
        let max_rows = self.max_rows;
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();

        // Column names are taken from the first row. A zero-row result
        // formats to a fixed sentence, so its header is never needed.
        let mut stream = sqlx::query(sql).fetch(&mut self.conn);
        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| BlueQueryError::db(format_execution_error(e)))?
        {
            if columns.is_empty() {
                columns = row
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
            }
            rows.push(convert_row(&row));
            if rows.len() == max_rows {
                break;
            }
        }

        let truncated = rows.len() == max_rows;
        if truncated {
            warn!(max_rows, "result set hit the row cap");
        }

        Ok(ResultSet {
            columns,
            rows,
            truncated,
        })
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a SqliteRow to our Value type.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "NULL" => Value::Null,

        "INTEGER" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT, DATE, TIME, DATETIME and anything else decode as text
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Extracts the database engine's message from an execution error.
fn format_execution_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
