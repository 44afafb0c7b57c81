//! Entity readers over the Things store.
//!
//! # Responsibility
//! - Validate caller parameters against live data before any task query.
//! - Map projection rows onto typed records and attach nested data.
//!
//! # Invariants
//! - Invalid parameters fail before the main statement runs.
//! - Unknown stored codes are reported as `InvalidData`, never masked.
//! - Readers are generic over [`RowStore`], so one [`crate::db::Session`]
//!   can serve a whole call tree.

use crate::db::{DbError, Record, RowStore};
use crate::query::filter::Match;
use crate::query::QueryError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod area_repo;
pub mod meta_repo;
pub mod tag_repo;
pub mod task_repo;

pub use area_repo::{AreaQuery, AreaRepository};
pub use meta_repo::MetaRepository;
pub use tag_repo::{TagQuery, TagRepository};
pub use task_repo::TaskRepository;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Query(QueryError),
    Db(DbError),
    /// No entity of kind `entity` has the key `key`.
    NotFound { entity: &'static str, key: String },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "no such {entity} uuid found: {key:?}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Query(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Rejects a tag title that is not present in the store.
pub(crate) fn validate_tag<S>(store: &S, parameter: &str, tag: &Match) -> RepoResult<()>
where
    S: RowStore + ?Sized,
{
    let Some(title) = tag.value() else {
        return Ok(());
    };
    let titles = TagRepository::new(store).titles()?;
    if titles.iter().any(|known| known == title) {
        return Ok(());
    }
    Err(QueryError::invalid_parameter(parameter, title, titles.join(", ")).into())
}

/// Single integer of a `SELECT COUNT(..)` statement.
pub(crate) fn count_of(records: &[Record]) -> RepoResult<usize> {
    match records.first().and_then(Record::first) {
        Some(Value::Integer(count)) => usize::try_from(*count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}"))),
        other => Err(RepoError::InvalidData(format!(
            "count query returned {other:?}"
        ))),
    }
}

/// Text values of the first column, skipping NULLs.
pub(crate) fn first_column_texts(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| match record.first() {
            Some(Value::Text(text)) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn required_text(record: &Record, column: &str) -> RepoResult<String> {
    record
        .text(column)
        .ok_or_else(|| RepoError::InvalidData(format!("column `{column}` is NULL")))
}

pub(crate) fn parse_label<T>(record: &Record, column: &str) -> RepoResult<T>
where
    T: std::str::FromStr,
{
    let raw = required_text(record, column)
        .map_err(|_| RepoError::InvalidData(format!("unknown `{column}` code")))?;
    raw.parse::<T>()
        .map_err(|_| RepoError::InvalidData(format!("unknown `{column}` label `{raw}`")))
}

pub(crate) fn parse_date(record: &Record, column: &str) -> RepoResult<Option<NaiveDate>> {
    record
        .text(column)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|err| RepoError::InvalidData(format!("`{column}` = `{raw}`: {err}")))
        })
        .transpose()
}

pub(crate) fn parse_datetime(record: &Record, column: &str) -> RepoResult<Option<NaiveDateTime>> {
    record
        .text(column)
        .map(|raw| {
            NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
                .map_err(|err| RepoError::InvalidData(format!("`{column}` = `{raw}`: {err}")))
        })
        .transpose()
}
