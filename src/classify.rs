//! Statement classification for incoming query text.
//!
//! Detection is deliberately shallow: a trimmed, lowercased prefix match
//! against the statement-leading SQL keywords. Anything deeper belongs to
//! the database, which is the real authority on statement validity.

/// The statement-leading keyword found at the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    With,
    Pragma,
    Insert,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
}

const STATEMENT_KINDS: [StatementKind; 9] = [
    StatementKind::Select,
    StatementKind::With,
    StatementKind::Pragma,
    StatementKind::Insert,
    StatementKind::Update,
    StatementKind::Delete,
    StatementKind::Create,
    StatementKind::Alter,
    StatementKind::Drop,
];

impl StatementKind {
    /// The lowercase leading keyword for this statement kind.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::With => "with",
            Self::Pragma => "pragma",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Alter => "alter",
            Self::Drop => "drop",
        }
    }

    /// Whether statements of this kind produce a result set.
    ///
    /// Drives the executor's fetch-versus-execute branch.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Self::Select | Self::With | Self::Pragma)
    }
}

/// Classifies raw text as a SQL statement by its leading keyword.
///
/// The keyword must be followed by a space so that prose starting with a
/// word like "selection" or "created" is not mistaken for SQL. Returns
/// `None` for anything that does not look like a statement.
pub fn classify(text: &str) -> Option<StatementKind> {
    let normalized = text.trim().to_lowercase();
    STATEMENT_KINDS.into_iter().find(|kind| {
        normalized
            .strip_prefix(kind.keyword())
            .is_some_and(|rest| rest.starts_with(' '))
    })
}
