//! Read-only SQLite access to the Things store.
//!
//! # Responsibility
//! - Open connections in enforced read-only mode.
//! - Execute statements and hand rows back as ordered field mappings.
//!
//! # Invariants
//! - No write transaction is ever started.
//! - A failed statement returns no partial rows.

use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod gateway;
mod open;
pub mod schema;

pub use gateway::{Database, Session};
pub use open::open_read_only;

use crate::config::TimeBasis;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The store file could not be opened.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    InvalidData(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Open { path, source } => {
                write!(f, "cannot open Things database `{}`: {source}", path.display())
            }
            Self::InvalidData(message) => write!(f, "invalid stored value: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Open { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// One result row as an ordered column -> value mapping.
///
/// Column order is the projection order of the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value of the first column, used by single-column selects.
    pub fn first(&self) -> Option<&Value> {
        self.fields.first().map(|(_, value)| value)
    }

    /// Text value; `None` for NULL or a missing column.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::Text(text) => Some(text.clone()),
            Value::Blob(bytes) => String::from_utf8(bytes.clone()).ok(),
            Value::Integer(number) => Some(number.to_string()),
            Value::Real(number) => Some(number.to_string()),
            Value::Null => None,
        }
    }

    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(number) => Some(*number),
            Value::Real(number) => Some(*number as i64),
            _ => None,
        }
    }

    /// Truthiness of a flag column: NULL, 0 and empty text are false.
    pub fn flag(&self, column: &str) -> bool {
        match self.get(column) {
            Some(Value::Integer(number)) => *number != 0,
            Some(Value::Real(number)) => *number != 0.0,
            Some(Value::Text(text)) => !text.is_empty(),
            Some(Value::Blob(bytes)) => !bytes.is_empty(),
            Some(Value::Null) | None => false,
        }
    }
}

/// Executes read-only statements against the Things store.
///
/// Implemented by [`Database`] (fresh connection per statement) and
/// [`Session`] (one connection shared across a call tree).
pub trait RowStore {
    fn fetch(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>>;

    fn time_basis(&self) -> &TimeBasis;
}
