//! Error type shared by the persistence, query and assertion helpers.
//!
//! Assertion mismatches are reported as panics like any other test failure.
//! Everything else, including result sets that cannot possibly contain the
//! requested row shape, comes back as a [`HelperError`].

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type HelperResult<T> = Result<T, HelperError>;

#[derive(Debug)]
pub enum HelperError {
    Db(DbError),
    /// Entity rejected by its own `validate()` before persistence.
    Validation {
        table: &'static str,
        message: String,
    },
    /// Query builder state cannot be rendered to SQL.
    InvalidQuery(String),
    /// An expected key is absent from the query results.
    MissingKey { key: String },
    Serialization(serde_json::Error),
}

impl Display for HelperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation { table, message } => {
                write!(f, "invalid `{table}` entity: {message}")
            }
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
            Self::MissingKey { key } => write!(
                f,
                "expected row does not match database results: key `{key}` was not found in results"
            ),
            Self::Serialization(err) => write!(f, "failed to serialize rows: {err}"),
        }
    }
}

impl Error for HelperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Validation { .. } | Self::InvalidQuery(_) | Self::MissingKey { .. } => None,
        }
    }
}

impl From<DbError> for HelperError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for HelperError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for HelperError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
