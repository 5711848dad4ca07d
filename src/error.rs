use thiserror::Error;

/// Custom Result type for minidb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minidb
///
/// The `Display` text of every variant is the message surfaced to the
/// caller in a failed [`QueryResult`](crate::sql::engine::QueryResult).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // parse errors
    #[error("Unsupported SQL syntax: {0}")]
    UnsupportedSyntax(String),
    #[error("Unsupported data type: {0}")]
    UnknownType(String),
    #[error("Number of columns ({columns}) doesn't match number of values ({values})")]
    ArityMismatch { columns: usize, values: usize },
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
    #[error("Invalid SET clause: {0}")]
    InvalidSetClause(String),
    #[error("Duplicate column {0} in SET clause")]
    DuplicateSetColumn(String),
    #[error("Invalid column definition: {0}")]
    InvalidColumnDefinition(String),
    #[error("Unterminated string literal")]
    UnterminatedString,

    // schema errors
    #[error("Table {0} already exists")]
    TableExists(String),
    #[error("Table {0} does not exist")]
    TableNotFound(String),

    // validation errors
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Invalid value for column {column}: {value}")]
    TypeMismatch { column: String, value: String },

    // constraint errors
    #[error("Primary key {0} cannot be null")]
    NullPrimaryKey(String),
    #[error("Primary key violation: {column} = {value}")]
    PrimaryKeyViolation { column: String, value: String },
    #[error("Unique constraint violation: {column} = {value}")]
    UniqueViolation { column: String, value: String },
}

/// Error taxonomy groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Schema,
    Validation,
    Constraint,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedSyntax(_)
            | Error::UnknownType(_)
            | Error::ArityMismatch { .. }
            | Error::InvalidCondition(_)
            | Error::InvalidSetClause(_)
            | Error::DuplicateSetColumn(_)
            | Error::InvalidColumnDefinition(_)
            | Error::UnterminatedString => ErrorKind::Parse,
            Error::TableExists(_) | Error::TableNotFound(_) => ErrorKind::Schema,
            Error::UnknownColumn(_) | Error::TypeMismatch { .. } => ErrorKind::Validation,
            Error::NullPrimaryKey(_)
            | Error::PrimaryKeyViolation { .. }
            | Error::UniqueViolation { .. } => ErrorKind::Constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_error_kind_and_message() {
        let err = Error::PrimaryKeyViolation {
            column: "id".into(),
            value: "1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Constraint);
        assert_eq!(err.to_string(), "Primary key violation: id = 1");

        let err = Error::TableNotFound("users".into());
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.to_string(), "Table users does not exist");

        assert_eq!(Error::UnterminatedString.kind(), ErrorKind::Parse);
        assert_eq!(Error::UnknownColumn("x".into()).kind(), ErrorKind::Validation);
    }
}
