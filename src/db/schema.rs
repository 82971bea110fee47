//! Database schema description used for query translation.
//!
//! Only table and column names are captured. The translation prompt does
//! not need types or constraints, and the description is rebuilt on every
//! request because the database file may be swapped out between calls.

/// Ordered description of the user-visible tables in the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescription {
    /// Tables in name order, excluding SQLite internals.
    pub tables: Vec<TableDescription>,
}

/// One table with its columns in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDescription {
    /// Table name.
    pub name: String,

    /// Column names in declared order.
    pub columns: Vec<String>,
}

impl TableDescription {
    /// Creates a table description from a name and column list.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

impl SchemaDescription {
    /// True when the database has no user tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Formats the schema for inclusion in the translation prompt.
    ///
    /// One line per table: `name(col1, col2, ...)`.
    pub fn format_for_prompt(&self) -> String {
        self.tables
            .iter()
            .map(|table| format!("{}({})", table.name, table.columns.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
