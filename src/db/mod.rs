//! Database access layer for BlueQuery.
//!
//! A thin layer over SQLite: a [`SqliteStore`] handle built from
//! configuration, and per-request [`StoreSession`]s that introspect the
//! schema and execute resolved statements under a row cap and timeout.

mod schema;
mod sqlite;
mod types;

pub use schema::{SchemaDescription, TableDescription};
pub use sqlite::{SqliteStore, StoreSession};
pub use types::{ExecutionOutcome, ResultSet, Row, Value};
