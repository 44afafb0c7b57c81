//! Filter configuration for task queries.
//!
//! # Responsibility
//! - Enumerate every recognized task filter with its value domain.
//! - Parse string inputs into typed filter values at the boundary.
//!
//! # Invariants
//! - `TaskQuery::default()` reads like the app: incomplete, not trashed,
//!   context not trashed.
//! - `TaskQuery::unfiltered()` applies no constraint at all.
//! - Offsets follow `<digits><d|w|y>` and nothing else.
//! - Rendered offsets never reach past SQLite's supported date range.

use super::{QueryError, QueryResult};
use crate::model::task::{StartList, Status, TaskType};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([dwy])$").expect("valid offset regex"));

/// About 1900 years; keeps "now minus offset" inside year 0000..9999.
const MAX_OFFSET_DAYS: u64 = 700_000;
const MAX_OFFSET_YEARS: u64 = 1_900;
const ISO_DATE_LEN: usize = "YYYY-MM-DD".len();

const OFFSET_EXPECTED: &str =
    "strings of the form `X[d/w/y]` where X is a non-negative integer (days, weeks, years)";

/// Match on a nullable reference column (area, project, heading, tag).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Match {
    /// No constraint.
    #[default]
    Any,
    /// Column is set.
    Present,
    /// Column is NULL.
    Absent,
    /// Column equals the value.
    Is(String),
}

impl Match {
    pub fn is(value: impl Into<String>) -> Self {
        Self::Is(value.into())
    }

    /// `None` -> any, `Some(true)` -> present, `Some(false)` -> absent.
    pub fn from_presence(value: Option<bool>) -> Self {
        match value {
            None => Self::Any,
            Some(true) => Self::Present,
            Some(false) => Self::Absent,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Is(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Match {
    fn from(value: bool) -> Self {
        Self::from_presence(Some(value))
    }
}

impl From<&str> for Match {
    fn from(value: &str) -> Self {
        Self::Is(value.to_string())
    }
}

/// Constraint on a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Any,
    Set,
    Unset,
    /// After today.
    Future,
    /// Today or earlier.
    Past,
    /// On or after the date.
    Since(NaiveDate),
    /// Exactly on the date.
    On(NaiveDate),
}

impl DateFilter {
    /// Parses `future`, `past`, `true`, `false` or a `YYYY-MM-DD` date;
    /// `exact` selects [`DateFilter::On`] over [`DateFilter::Since`] for dates.
    pub fn parse(parameter: &str, value: &str, exact: bool) -> QueryResult<Self> {
        let invalid = || {
            QueryError::invalid_parameter(
                parameter,
                value,
                "future, past, true, false or a YYYY-MM-DD date",
            )
        };
        match value {
            "future" => Ok(Self::Future),
            "past" => Ok(Self::Past),
            "true" => Ok(Self::Set),
            "false" => Ok(Self::Unset),
            other if other.len() != ISO_DATE_LEN => Err(invalid()),
            other => match NaiveDate::parse_from_str(other, "%Y-%m-%d") {
                Ok(date) if exact => Ok(Self::On(date)),
                Ok(date) => Ok(Self::Since(date)),
                Err(_) => Err(invalid()),
            },
        }
    }
}

impl From<bool> for DateFilter {
    fn from(value: bool) -> Self {
        if value {
            Self::Set
        } else {
            Self::Unset
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Days,
    Weeks,
    Years,
}

/// A look-back window such as `3d`, `5w` or `1y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub amount: u64,
    pub unit: OffsetUnit,
}

impl Offset {
    /// Parses an offset, naming `parameter` in the error.
    pub fn parse(parameter: &str, value: &str) -> QueryResult<Self> {
        let invalid = || QueryError::invalid_parameter(parameter, value, OFFSET_EXPECTED);
        let captures = OFFSET_RE.captures(value).ok_or_else(invalid)?;
        // Digits only, so overflow is the sole failure; saturate it.
        let amount = captures[1].parse::<u64>().unwrap_or(u64::MAX);
        let unit = match &captures[2] {
            "d" => OffsetUnit::Days,
            "w" => OffsetUnit::Weeks,
            _ => OffsetUnit::Years,
        };
        Ok(Self { amount, unit })
    }

    /// SQLite date modifier moving "now" back by this offset.
    ///
    /// Windows longer than SQLite can represent are clamped, so a huge
    /// offset selects everything instead of nothing.
    pub fn sqlite_modifier(&self) -> String {
        match self.unit {
            OffsetUnit::Days => format!("-{} days", self.amount.min(MAX_OFFSET_DAYS)),
            OffsetUnit::Weeks => format!(
                "-{} days",
                self.amount.saturating_mul(7).min(MAX_OFFSET_DAYS)
            ),
            OffsetUnit::Years => format!("-{} years", self.amount.min(MAX_OFFSET_YEARS)),
        }
    }
}

impl FromStr for Offset {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse("offset", value)
    }
}

/// Ordering key of a task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKey {
    /// `TMTask.index`, the order of the app's lists.
    #[default]
    Index,
    /// `TMTask.todayIndex`, the order of the Today list.
    TodayIndex,
    /// Most recently stopped first.
    StopDateDesc,
    /// Most recently created first.
    CreatedDesc,
}

impl FromStr for OrderKey {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "index" => Ok(Self::Index),
            "todayIndex" | "today_index" => Ok(Self::TodayIndex),
            other => Err(QueryError::invalid_parameter(
                "index",
                other,
                "index, todayIndex",
            )),
        }
    }
}

/// Parses a tri-state string: `true`, `false` or `none`.
pub fn parse_tri_state(parameter: &str, value: &str) -> QueryResult<Option<bool>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        "none" | "null" | "any" => Ok(None),
        _ => Err(QueryError::invalid_parameter(
            parameter,
            value,
            "true, false, none",
        )),
    }
}

/// Every recognized task filter.
///
/// Fields combine with AND semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Fetch exactly this task; all other filters are ignored.
    pub uuid: Option<String>,
    pub kind: Option<TaskType>,
    pub status: Option<Status>,
    pub start: Option<StartList>,
    /// Area uuid.
    pub area: Match,
    /// Project uuid, matched directly or through the task's heading.
    pub project: Match,
    /// Heading uuid.
    pub heading: Match,
    /// Tag title; validated against the live tag set.
    pub tag: Match,
    pub start_date: DateFilter,
    pub stop_date: DateFilter,
    pub deadline: DateFilter,
    pub deadline_suppressed: Option<bool>,
    pub trashed: Option<bool>,
    /// Whether the enclosing project or heading is trashed.
    pub context_trashed: Option<bool>,
    /// Created within this offset, e.g. `3d`.
    pub last: Option<String>,
    /// LIKE pattern matched against title, notes and area title.
    pub search_query: Option<String>,
    pub index: OrderKey,
    pub include_items: bool,
    /// Include repeating-task templates.
    pub include_recurring: bool,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: Some(Status::Incomplete),
            trashed: Some(false),
            context_trashed: Some(false),
            ..Self::unfiltered()
        }
    }
}

impl TaskQuery {
    /// No constraint on any field.
    pub fn unfiltered() -> Self {
        Self {
            uuid: None,
            kind: None,
            status: None,
            start: None,
            area: Match::Any,
            project: Match::Any,
            heading: Match::Any,
            tag: Match::Any,
            start_date: DateFilter::Any,
            stop_date: DateFilter::Any,
            deadline: DateFilter::Any,
            deadline_suppressed: None,
            trashed: None,
            context_trashed: None,
            last: None,
            search_query: None,
            index: OrderKey::Index,
            include_items: false,
            include_recurring: false,
        }
    }

    pub fn for_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            ..Self::default()
        }
    }

    /// Parsed `last` offset, if any.
    pub fn offset(&self) -> QueryResult<Option<Offset>> {
        self.last
            .as_deref()
            .map(|value| Offset::parse("last", value))
            .transpose()
    }
}
