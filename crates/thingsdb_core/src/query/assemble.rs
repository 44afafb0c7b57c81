//! SQL assembly over the fixed Things join topology.
//!
//! # Responsibility
//! - Combine predicate fragments into one `WHERE` clause.
//! - Render task, area, tag, checklist and meta statements.
//!
//! # Invariants
//! - Task statements always join project, area, heading, the heading's
//!   project, tags and checklist items, in that order.
//! - Repeating-task templates are excluded first unless explicitly included.
//! - Lookups by uuid or owner bind `?1` instead of inlining the value.
//!
//! # See also
//! - `query::predicate` for the individual fragments.

use super::filter::{Match, OrderKey, TaskQuery};
use super::predicate::{
    code_filter, context_trashed_filter, date_filter, date_range_filter, equality_filter,
    project_filter, search_filter, DateColumn,
};
use super::QueryResult;
use crate::config::TimeBasis;
use crate::db::schema::{
    DATE_CREATED, DATE_DEADLINE, DATE_DEADLINE_SUPPRESSED, DATE_MODIFIED, DATE_START, DATE_STOP,
    IS_NOT_RECURRING, META_DATABASE_VERSION_KEY, NOT_TRASHED_CODE, SETTINGS_UUID, TABLE_AREA,
    TABLE_AREATAG, TABLE_CHECKLIST_ITEM, TABLE_META, TABLE_SETTINGS, TABLE_TAG, TABLE_TASK,
    TABLE_TASKTAG, TRASHED_CODE,
};
use crate::model::task::{StartList, Status, TaskType};

/// Conjunction of predicate fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    fragments: Vec<String>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragment`; empty fragments mean "no constraint" and are skipped.
    pub fn push(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// `TRUE` when unconstrained, otherwise the fragments joined by `AND`.
    pub fn render(&self) -> String {
        if self.fragments.is_empty() {
            return "TRUE".to_string();
        }
        self.fragments.join("\n                AND ")
    }
}

impl OrderKey {
    fn sql(self) -> &'static str {
        match self {
            Self::Index => "TASK.\"index\"",
            Self::TodayIndex => "TASK.todayIndex",
            Self::StopDateDesc => "TASK.stopDate DESC",
            Self::CreatedDesc => "TASK.creationDate DESC",
        }
    }
}

fn case_of<I>(column: &str, labels: I, alias: &str) -> String
where
    I: IntoIterator<Item = (i64, &'static str)>,
{
    let arms = labels
        .into_iter()
        .map(|(code, label)| format!("WHEN {column} = {code} THEN '{label}'"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("CASE {arms} END AS {alias}")
}

fn task_type_case() -> String {
    case_of(
        "TASK.type",
        TaskType::ALL.map(|kind| (kind.code(), kind.as_str())),
        "type",
    )
}

fn status_case(table: &str) -> String {
    case_of(
        &format!("{table}.status"),
        Status::ALL.map(|status| (status.code(), status.as_str())),
        "status",
    )
}

fn start_case() -> String {
    case_of(
        "TASK.start",
        StartList::ALL.map(|start| (start.code(), start.as_str())),
        "start",
    )
}

/// Task projection over the fixed join topology.
pub fn tasks_sql(where_predicate: &str, order: OrderKey, basis: &TimeBasis) -> String {
    format!(
        r#"
            SELECT DISTINCT
                TASK.uuid,
                {task_type},
                CASE WHEN TASK.trashed = {trashed} THEN 1 END AS trashed,
                TASK.title,
                {status},
                CASE WHEN AREA.uuid IS NOT NULL THEN AREA.uuid END AS area,
                CASE WHEN AREA.uuid IS NOT NULL THEN AREA.title END AS area_title,
                CASE WHEN PROJECT.uuid IS NOT NULL THEN PROJECT.uuid END AS project,
                CASE WHEN PROJECT.uuid IS NOT NULL THEN PROJECT.title END AS project_title,
                CASE WHEN HEADING.uuid IS NOT NULL THEN HEADING.uuid END AS heading,
                CASE WHEN HEADING.uuid IS NOT NULL THEN HEADING.title END AS heading_title,
                TASK.notes,
                CASE WHEN TAG.uuid IS NOT NULL THEN 1 END AS tags,
                {start},
                CASE WHEN CHECKLIST_ITEM.uuid IS NOT NULL THEN 1 END AS checklist,
                {start_date} AS start_date,
                {deadline} AS deadline,
                {stop_date} AS stop_date,
                {created} AS created,
                {modified} AS modified,
                TASK."index" AS "index",
                TASK.todayIndex AS today_index
            FROM
                {TABLE_TASK} AS TASK
            LEFT OUTER JOIN
                {TABLE_TASK} PROJECT ON TASK.project = PROJECT.uuid
            LEFT OUTER JOIN
                {TABLE_AREA} AREA ON TASK.area = AREA.uuid
            LEFT OUTER JOIN
                {TABLE_TASK} HEADING ON TASK.actionGroup = HEADING.uuid
            LEFT OUTER JOIN
                {TABLE_TASK} PROJECT_OF_HEADING ON HEADING.project = PROJECT_OF_HEADING.uuid
            LEFT OUTER JOIN
                {TABLE_TASKTAG} TAGS ON TASK.uuid = TAGS.tasks
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAGS.tags = TAG.uuid
            LEFT OUTER JOIN
                {TABLE_CHECKLIST_ITEM} CHECKLIST_ITEM ON TASK.uuid = CHECKLIST_ITEM.task
            WHERE
                {where_predicate}
            ORDER BY
                {order}
            "#,
        task_type = task_type_case(),
        trashed = TRASHED_CODE,
        status = status_case("TASK"),
        start = start_case(),
        start_date = TimeBasis::utc_date_of(&format!("TASK.{DATE_START}")),
        deadline = TimeBasis::utc_date_of(&format!("TASK.{DATE_DEADLINE}")),
        stop_date = basis.local_date_of(&format!("TASK.{DATE_STOP}")),
        created = basis.local_datetime_of(&format!("TASK.{DATE_CREATED}")),
        modified = basis.local_datetime_of(&format!("TASK.{DATE_MODIFIED}")),
        order = order.sql(),
    )
}

/// Single task by uuid; binds the uuid as `?1`.
///
/// Repeating templates are not excluded here.
pub fn task_by_uuid_sql(basis: &TimeBasis) -> String {
    tasks_sql("TASK.uuid = ?1", OrderKey::Index, basis)
}

/// Translates every filter field of `query` into its fragment.
///
/// The `uuid` field is not part of the clause; see [`task_by_uuid_sql`].
pub fn task_where_clause(query: &TaskQuery, basis: &TimeBasis) -> QueryResult<WhereClause> {
    let offset = query.offset()?;
    let mut clause = WhereClause::new();

    if !query.include_recurring {
        clause.push(IS_NOT_RECURRING);
    }
    clause.push(code_filter(
        "TASK.trashed",
        query
            .trashed
            .map(|trashed| if trashed { TRASHED_CODE } else { NOT_TRASHED_CODE }),
    ));
    clause.push(context_trashed_filter(query.context_trashed));
    clause.push(code_filter("TASK.type", query.kind.map(TaskType::code)));
    clause.push(code_filter("TASK.start", query.start.map(StartList::code)));
    clause.push(code_filter("TASK.status", query.status.map(Status::code)));
    clause.push(equality_filter("TASK.area", &query.area)?);
    clause.push(project_filter(&query.project)?);
    clause.push(equality_filter("TASK.actionGroup", &query.heading)?);
    clause.push(equality_filter(
        &format!("TASK.{DATE_DEADLINE_SUPPRESSED}"),
        &Match::from_presence(query.deadline_suppressed),
    )?);
    clause.push(equality_filter("TAG.title", &query.tag)?);
    clause.push(date_filter(
        &format!("TASK.{DATE_START}"),
        DateColumn::UtcMidnight,
        &query.start_date,
        basis,
    ));
    clause.push(date_filter(
        &format!("TASK.{DATE_STOP}"),
        DateColumn::LocalTimestamp,
        &query.stop_date,
        basis,
    ));
    clause.push(date_filter(
        &format!("TASK.{DATE_DEADLINE}"),
        DateColumn::UtcMidnight,
        &query.deadline,
        basis,
    ));
    clause.push(date_range_filter(
        &format!("TASK.{DATE_CREATED}"),
        offset.as_ref(),
        basis,
    ));
    clause.push(search_filter(query.search_query.as_deref())?);

    Ok(clause)
}

impl TaskQuery {
    /// Full task statement for this filter set.
    ///
    /// With `uuid` set the statement carries a `?1` placeholder for it.
    pub fn render(&self, basis: &TimeBasis) -> QueryResult<String> {
        if self.uuid.is_some() {
            return Ok(task_by_uuid_sql(basis));
        }
        let clause = task_where_clause(self, basis)?;
        Ok(tasks_sql(&clause.render(), self.index, basis))
    }
}

/// Wraps any statement into a row count.
pub fn count_sql(sql: &str) -> String {
    format!("SELECT COUNT(uuid) FROM (\n{sql}\n)")
}

/// Areas filtered by uuid and tag title, in sidebar order.
pub fn areas_sql(uuid: &Match, tag: &Match) -> QueryResult<String> {
    let mut clause = WhereClause::new();
    clause.push(equality_filter("TAG.title", tag)?);
    clause.push(equality_filter("AREA.uuid", uuid)?);

    Ok(format!(
        r#"
            SELECT DISTINCT
                AREA.uuid,
                AREA.title,
                CASE WHEN AREA_TAG.areas IS NOT NULL THEN 1 END AS tags
            FROM
                {TABLE_AREA} AS AREA
            LEFT OUTER JOIN
                {TABLE_AREATAG} AREA_TAG ON AREA_TAG.areas = AREA.uuid
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = AREA_TAG.tags
            WHERE
                {predicate}
            ORDER BY AREA."index"
            "#,
        predicate = clause.render(),
    ))
}

/// Tags, optionally restricted to one title.
pub fn tags_sql(title: &Match) -> QueryResult<String> {
    let mut clause = WhereClause::new();
    clause.push(equality_filter("title", title)?);
    Ok(format!(
        r#"
            SELECT
                uuid, title, shortcut
            FROM
                {TABLE_TAG}
            WHERE
                {predicate}
            ORDER BY "index"
            "#,
        predicate = clause.render(),
    ))
}

pub fn tag_titles_sql() -> String {
    format!(r#"SELECT title FROM {TABLE_TAG} ORDER BY "index""#)
}

/// Tag titles of one task; binds the task uuid as `?1`.
pub fn tags_of_task_sql() -> String {
    format!(
        r#"
            SELECT
                TAG.title
            FROM
                {TABLE_TASKTAG} AS TASK_TAG
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = TASK_TAG.tags
            WHERE
                TASK_TAG.tasks = ?1
            ORDER BY TAG."index"
            "#
    )
}

/// Tag titles of one area; binds the area uuid as `?1`.
pub fn tags_of_area_sql() -> String {
    format!(
        r#"
            SELECT
                TAG.title
            FROM
                {TABLE_AREATAG} AS AREA_TAG
            LEFT OUTER JOIN
                {TABLE_TAG} TAG ON TAG.uuid = AREA_TAG.tags
            WHERE
                AREA_TAG.areas = ?1
            ORDER BY TAG."index"
            "#
    )
}

/// Checklist items of one to-do; binds the to-do uuid as `?1`.
pub fn checklist_items_sql(basis: &TimeBasis) -> String {
    format!(
        r#"
            SELECT
                CHECKLIST_ITEM.uuid,
                CHECKLIST_ITEM.title,
                {status},
                {stop_date} AS stop_date,
                {created} AS created,
                {modified} AS modified
            FROM
                {TABLE_CHECKLIST_ITEM} AS CHECKLIST_ITEM
            WHERE
                CHECKLIST_ITEM.task = ?1
            ORDER BY CHECKLIST_ITEM."index"
            "#,
        status = status_case("CHECKLIST_ITEM"),
        stop_date = basis.local_date_of(&format!("CHECKLIST_ITEM.{DATE_STOP}")),
        created = basis.local_datetime_of(&format!("CHECKLIST_ITEM.{DATE_CREATED}")),
        modified = basis.local_datetime_of(&format!("CHECKLIST_ITEM.{DATE_MODIFIED}")),
    )
}

pub fn version_sql() -> String {
    format!("SELECT value FROM {TABLE_META} WHERE key = '{META_DATABASE_VERSION_KEY}'")
}

pub fn token_sql() -> String {
    format!(
        "SELECT uriSchemeAuthenticationToken FROM {TABLE_SETTINGS} WHERE uuid = '{SETTINGS_UUID}'"
    )
}

#[cfg(test)]
mod tests {
    use super::{areas_sql, count_sql, task_where_clause, tasks_sql, WhereClause};
    use crate::config::TimeBasis;
    use crate::model::task::{StartList, TaskType};
    use crate::query::filter::{DateFilter, Match, OrderKey, TaskQuery};
    use crate::query::QueryError;

    #[test]
    fn where_clause_skips_empty_fragments() {
        let mut clause = WhereClause::new();
        assert_eq!(clause.render(), "TRUE");

        clause.push("");
        clause.push("TASK.type = 0");
        clause.push(String::new());
        clause.push("TASK.start = 1");
        assert_eq!(clause.fragments().len(), 2);
        assert!(clause.render().starts_with("TASK.type = 0\n"));
        assert!(clause.render().ends_with("AND TASK.start = 1"));
    }

    #[test]
    fn recurring_exclusion_comes_first() {
        let basis = TimeBasis::default();
        let clause = task_where_clause(&TaskQuery::default(), &basis).unwrap();
        assert_eq!(clause.fragments()[0], "TASK.recurrenceRule IS NULL");
        assert_eq!(clause.fragments()[1], "TASK.trashed = 0");

        let all = TaskQuery {
            include_recurring: true,
            ..TaskQuery::unfiltered()
        };
        assert!(task_where_clause(&all, &basis).unwrap().is_empty());
    }

    #[test]
    fn typed_filters_render_store_codes() {
        let query = TaskQuery {
            kind: Some(TaskType::Heading),
            start: Some(StartList::Someday),
            area: Match::Absent,
            deadline_suppressed: Some(false),
            ..TaskQuery::unfiltered()
        };
        let fragments = task_where_clause(&query, &TimeBasis::default())
            .unwrap()
            .fragments()
            .to_vec();
        assert!(fragments.contains(&"TASK.type = 2".to_string()));
        assert!(fragments.contains(&"TASK.start = 2".to_string()));
        assert!(fragments.contains(&"TASK.area IS NULL".to_string()));
        assert!(fragments.contains(&"TASK.dueDateSuppressionDate IS NULL".to_string()));
    }

    #[test]
    fn malformed_last_fails_before_rendering() {
        let query = TaskQuery {
            last: Some("XYZ".to_string()),
            ..TaskQuery::default()
        };
        let err = query.render(&TimeBasis::default()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidParameter { .. }));
    }

    #[test]
    fn uuid_query_binds_placeholder() {
        let sql = TaskQuery::for_uuid("A1")
            .render(&TimeBasis::default())
            .unwrap();
        assert!(sql.contains("TASK.uuid = ?1"));
        assert!(!sql.contains("recurrenceRule"));
    }

    #[test]
    fn tasks_sql_keeps_start_and_deadline_in_utc() {
        let sql = tasks_sql("TRUE", OrderKey::TodayIndex, &TimeBasis::fixed(3_600, 0));
        assert!(sql.contains("date(TASK.startDate, 'unixepoch') AS start_date"));
        assert!(sql.contains("date(TASK.dueDate, 'unixepoch') AS deadline"));
        assert!(sql.contains("date(TASK.stopDate, 'unixepoch', '+3600 seconds') AS stop_date"));
        assert!(sql.contains("WHEN TASK.type = 1 THEN 'project'"));
        assert!(sql.trim_end().ends_with("TASK.todayIndex"));
    }

    #[test]
    fn date_filters_are_applied_per_column() {
        let query = TaskQuery {
            start_date: DateFilter::Future,
            stop_date: DateFilter::Set,
            ..TaskQuery::unfiltered()
        };
        let rendered = task_where_clause(&query, &TimeBasis::fixed(0, 10))
            .unwrap()
            .render();
        assert!(rendered.contains("date(TASK.startDate, 'unixepoch') > date(10, 'unixepoch', '+0 seconds')"));
        assert!(rendered.contains("TASK.stopDate IS NOT NULL"));
    }

    #[test]
    fn count_sql_wraps_statement() {
        assert_eq!(
            count_sql("SELECT uuid FROM TMTask"),
            "SELECT COUNT(uuid) FROM (\nSELECT uuid FROM TMTask\n)"
        );
    }

    #[test]
    fn areas_sql_filters_by_tag_title() {
        let sql = areas_sql(&Match::Any, &Match::is("Office")).unwrap();
        assert!(sql.contains("TAG.title = 'Office'"));
        assert!(sql.contains("ORDER BY AREA.\"index\""));
    }
}
