//! Predicate builders for task, area and tag filters.
//!
//! # Responsibility
//! - Turn one filter value into one boolean SQL fragment.
//!
//! # Invariants
//! - An unconstrained value yields `""`.
//! - Fragments carry no leading `AND`; callers join them.
//! - Text literals have single quotes doubled; NUL bytes are rejected.
//! - Start dates and deadlines are stored as 00:00 UTC and are never shifted
//!   to local time; stop dates are full timestamps and always are.

use super::filter::{DateFilter, Match, Offset};
use super::{QueryError, QueryResult};
use crate::config::TimeBasis;

/// Columns considered for `context_trashed`: the task's project, its
/// heading and the heading's project.
const CONTEXT_TRASHED_COLUMNS: [&str; 3] = [
    "PROJECT.trashed",
    "HEADING.trashed",
    "PROJECT_OF_HEADING.trashed",
];

const SEARCH_COLUMNS: [&str; 3] = ["TASK.title", "TASK.notes", "AREA.title"];

/// How an epoch column relates to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateColumn {
    /// Stored as 00:00 UTC of the calendar day (start date, deadline).
    UtcMidnight,
    /// Stored as the full instant of an event (stop date).
    LocalTimestamp,
}

/// Escapes `value` for use inside a single-quoted SQLite literal.
pub fn escape_string(parameter: &str, value: &str) -> QueryResult<String> {
    if value.contains('\0') {
        return Err(QueryError::MalformedLiteral {
            parameter: parameter.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value.replace('\'', "''"))
}

/// `column = 'value'`, `column IS [NOT] NULL`, or nothing.
pub fn equality_filter(column: &str, value: &Match) -> QueryResult<String> {
    match value {
        Match::Any => Ok(String::new()),
        Match::Present => Ok(format!("{column} IS NOT NULL")),
        Match::Absent => Ok(format!("{column} IS NULL")),
        Match::Is(literal) => Ok(format!("{column} = '{}'", escape_string(column, literal)?)),
    }
}

/// `column = code` for enum-valued integer columns.
pub fn code_filter(column: &str, code: Option<i64>) -> String {
    code.map_or_else(String::new, |code| format!("{column} = {code}"))
}

/// Truthy (`column`) or falsy (`NOT IFNULL(column, 0)`); NULL counts as false.
pub fn truthy_filter(column: &str, value: Option<bool>) -> String {
    match value {
        None => String::new(),
        Some(true) => column.to_string(),
        Some(false) => format!("NOT IFNULL({column}, 0)"),
    }
}

/// Parenthesized disjunction of the non-empty fragments.
pub fn or_filter<I>(fragments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let kept = fragments
        .into_iter()
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>();
    if kept.is_empty() {
        return String::new();
    }
    format!("({})", kept.join(" OR "))
}

/// Conjunction of the non-empty fragments, parenthesized when compound.
pub fn and_filter<I>(fragments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let kept = fragments
        .into_iter()
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>();
    match kept.len() {
        0 => String::new(),
        1 => kept.into_iter().collect(),
        _ => format!("({})", kept.join(" AND ")),
    }
}

/// Project containment: a task belongs to a project directly or through
/// its heading.
pub fn project_filter(value: &Match) -> QueryResult<String> {
    Ok(or_filter([
        equality_filter("TASK.project", value)?,
        equality_filter("PROJECT_OF_HEADING.uuid", value)?,
    ]))
}

/// Trashed state of the task's enclosing containers.
///
/// `Some(false)`: no container is trashed. `Some(true)`: at least one is.
pub fn context_trashed_filter(value: Option<bool>) -> String {
    match value {
        None => String::new(),
        Some(false) => and_filter(
            CONTEXT_TRASHED_COLUMNS
                .iter()
                .map(|column| truthy_filter(column, Some(false))),
        ),
        Some(true) => or_filter(
            CONTEXT_TRASHED_COLUMNS
                .iter()
                .map(|column| truthy_filter(column, Some(true))),
        ),
    }
}

/// Date comparison on an epoch column.
///
/// `Past` includes today.
pub fn date_filter(
    column: &str,
    kind: DateColumn,
    value: &DateFilter,
    basis: &TimeBasis,
) -> String {
    let column_date = || match kind {
        DateColumn::UtcMidnight => TimeBasis::utc_date_of(column),
        DateColumn::LocalTimestamp => basis.local_date_of(column),
    };

    match value {
        DateFilter::Any => String::new(),
        DateFilter::Set => format!("{column} IS NOT NULL"),
        DateFilter::Unset => format!("{column} IS NULL"),
        DateFilter::Future => format!("{} > {}", column_date(), basis.local_today()),
        DateFilter::Past => format!("{} <= {}", column_date(), basis.local_today()),
        DateFilter::Since(date) => {
            format!("{} >= date('{}')", column_date(), date.format("%Y-%m-%d"))
        }
        DateFilter::On(date) => format!("{} = date('{}')", column_date(), date.format("%Y-%m-%d")),
    }
}

/// Limits a timestamp column to the window ending now.
pub fn date_range_filter(column: &str, offset: Option<&Offset>, basis: &TimeBasis) -> String {
    let Some(offset) = offset else {
        return String::new();
    };
    format!(
        "datetime({column}, 'unixepoch') > {}",
        basis.utc_now_shifted(&offset.sqlite_modifier())
    )
}

/// Substring search over title, notes and area title.
///
/// `%` and `_` inside the query keep their LIKE meaning.
pub fn search_filter(query: Option<&str>) -> QueryResult<String> {
    let Some(query) = query.filter(|query| !query.is_empty()) else {
        return Ok(String::new());
    };
    let escaped = escape_string("search_query", query)?;
    Ok(or_filter(
        SEARCH_COLUMNS
            .iter()
            .map(|column| format!("{column} LIKE '%{escaped}%'")),
    ))
}

#[cfg(test)]
mod tests {
    use super::{
        code_filter, context_trashed_filter, date_filter, date_range_filter, equality_filter,
        or_filter, project_filter, search_filter, truthy_filter, DateColumn,
    };
    use crate::config::TimeBasis;
    use crate::query::filter::{DateFilter, Match, Offset};
    use crate::query::QueryError;
    use chrono::NaiveDate;

    const NOW: i64 = 1_710_504_000;

    #[test]
    fn equality_filter_covers_all_match_variants() {
        assert_eq!(equality_filter("TASK.area", &Match::Any).unwrap(), "");
        assert_eq!(
            equality_filter("TASK.area", &Match::Present).unwrap(),
            "TASK.area IS NOT NULL"
        );
        assert_eq!(
            equality_filter("TASK.area", &Match::Absent).unwrap(),
            "TASK.area IS NULL"
        );
        assert_eq!(
            equality_filter("TAG.title", &Match::is("Dad's")).unwrap(),
            "TAG.title = 'Dad''s'"
        );
    }

    #[test]
    fn equality_filter_rejects_nul_bytes() {
        let err = equality_filter("TASK.area", &Match::is("\0")).unwrap_err();
        assert!(matches!(err, QueryError::MalformedLiteral { .. }));
    }

    #[test]
    fn truthy_filter_distinguishes_false_from_null() {
        assert_eq!(truthy_filter("PROJECT.trashed", None), "");
        assert_eq!(truthy_filter("PROJECT.trashed", Some(true)), "PROJECT.trashed");
        assert_eq!(
            truthy_filter("PROJECT.trashed", Some(false)),
            "NOT IFNULL(PROJECT.trashed, 0)"
        );
    }

    #[test]
    fn or_filter_drops_empty_fragments() {
        assert_eq!(or_filter([String::new(), String::new()]), "");
        assert_eq!(or_filter(["a = 1".to_string(), String::new()]), "(a = 1)");
        assert_eq!(
            or_filter(["a = 1".to_string(), "b = 2".to_string()]),
            "(a = 1 OR b = 2)"
        );
    }

    #[test]
    fn project_filter_routes_through_heading() {
        assert_eq!(
            project_filter(&Match::is("P1")).unwrap(),
            "(TASK.project = 'P1' OR PROJECT_OF_HEADING.uuid = 'P1')"
        );
        assert_eq!(project_filter(&Match::Any).unwrap(), "");
    }

    #[test]
    fn context_trashed_filter_spans_project_and_heading() {
        assert_eq!(context_trashed_filter(None), "");
        assert_eq!(
            context_trashed_filter(Some(false)),
            "(NOT IFNULL(PROJECT.trashed, 0) AND NOT IFNULL(HEADING.trashed, 0) AND NOT IFNULL(PROJECT_OF_HEADING.trashed, 0))"
        );
        assert_eq!(
            context_trashed_filter(Some(true)),
            "(PROJECT.trashed OR HEADING.trashed OR PROJECT_OF_HEADING.trashed)"
        );
    }

    #[test]
    fn date_filter_keeps_utc_midnight_columns_unshifted() {
        let basis = TimeBasis::fixed(18_000, NOW);
        assert_eq!(
            date_filter("TASK.startDate", DateColumn::UtcMidnight, &DateFilter::Future, &basis),
            "date(TASK.startDate, 'unixepoch') > date(1710504000, 'unixepoch', '+18000 seconds')"
        );
        assert_eq!(
            date_filter("TASK.stopDate", DateColumn::LocalTimestamp, &DateFilter::Past, &basis),
            "date(TASK.stopDate, 'unixepoch', '+18000 seconds') <= date(1710504000, 'unixepoch', '+18000 seconds')"
        );
    }

    #[test]
    fn date_filter_handles_presence_and_iso_dates() {
        let basis = TimeBasis::default();
        let date = NaiveDate::from_ymd_opt(2021, 3, 28).unwrap();
        assert_eq!(
            date_filter("TASK.dueDate", DateColumn::UtcMidnight, &DateFilter::Any, &basis),
            ""
        );
        assert_eq!(
            date_filter("TASK.dueDate", DateColumn::UtcMidnight, &DateFilter::Set, &basis),
            "TASK.dueDate IS NOT NULL"
        );
        assert_eq!(
            date_filter(
                "TASK.stopDate",
                DateColumn::LocalTimestamp,
                &DateFilter::Since(date),
                &basis
            ),
            "date(TASK.stopDate, 'unixepoch', 'localtime') >= date('2021-03-28')"
        );
        assert_eq!(
            date_filter("TASK.dueDate", DateColumn::UtcMidnight, &DateFilter::On(date), &basis),
            "date(TASK.dueDate, 'unixepoch') = date('2021-03-28')"
        );
    }

    #[test]
    fn date_range_filter_shifts_now_back() {
        let basis = TimeBasis::default();
        let offset = "3d".parse::<Offset>().unwrap();
        assert_eq!(
            date_range_filter("TASK.creationDate", Some(&offset), &basis),
            "datetime(TASK.creationDate, 'unixepoch') > datetime('now', '-3 days')"
        );
        assert_eq!(date_range_filter("TASK.creationDate", None, &basis), "");
    }

    #[test]
    fn search_filter_escapes_quotes() {
        assert_eq!(search_filter(None).unwrap(), "");
        assert_eq!(search_filter(Some("")).unwrap(), "");
        assert_eq!(
            search_filter(Some("it's")).unwrap(),
            "(TASK.title LIKE '%it''s%' OR TASK.notes LIKE '%it''s%' OR AREA.title LIKE '%it''s%')"
        );
        assert!(search_filter(Some("To-Do\0Heading")).is_err());
    }

    #[test]
    fn code_filter_renders_integer_comparison() {
        assert_eq!(code_filter("TASK.type", Some(1)), "TASK.type = 1");
        assert_eq!(code_filter("TASK.type", None), "");
    }
}
