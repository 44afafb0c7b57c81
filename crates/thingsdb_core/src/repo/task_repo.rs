//! Task reader: to-dos, projects and headings.
//!
//! # Responsibility
//! - Run task queries and map rows to [`Task`] records.
//! - Resolve tag titles and nested items (headings, to-dos, checklists).
//!
//! # Invariants
//! - A uuid lookup always includes items and fails with `NotFound` when the
//!   uuid is unknown; its count is 0 instead.
//! - Project items list to-dos before headings; relative order is otherwise
//!   kept.
//! - Nested reads ignore the trashed state of the enclosing project.

use super::{
    count_of, first_column_texts, parse_date, parse_datetime, parse_label, required_text,
    validate_tag, RepoError, RepoResult,
};
use crate::db::{Record, RowStore};
use crate::model::checklist::ChecklistItem;
use crate::model::task::{StartList, Task, TaskType};
use crate::query::assemble::{checklist_items_sql, count_sql, tags_of_task_sql, task_by_uuid_sql};
use crate::query::filter::{Match, TaskQuery};
use log::{debug, warn};
use rusqlite::types::Value;
use std::time::Instant;

pub struct TaskRepository<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> TaskRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Tasks matching `query`, in the query's order.
    pub fn list(&self, query: &TaskQuery) -> RepoResult<Vec<Task>> {
        let started_at = Instant::now();
        let result = self.list_inner(query);
        match &result {
            Ok(tasks) => debug!(
                "event=task_list module=repo status=ok rows={} include_items={} duration_ms={}",
                tasks.len(),
                query.include_items || query.uuid.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=task_list module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Number of rows `list` would return, without nested items.
    pub fn count(&self, query: &TaskQuery) -> RepoResult<usize> {
        if let Some(uuid) = &query.uuid {
            let sql = count_sql(&task_by_uuid_sql(self.store.time_basis()));
            let records = self.store.fetch(&sql, &[Value::Text(uuid.clone())])?;
            return count_of(&records);
        }

        let sql = count_sql(&query.render(self.store.time_basis())?);
        validate_tag(self.store, "tag", &query.tag)?;
        let records = self.store.fetch(&sql, &[])?;
        count_of(&records)
    }

    /// One task with its items.
    pub fn get(&self, uuid: &str) -> RepoResult<Task> {
        let mut tasks = self.list(&TaskQuery::for_uuid(uuid))?;
        if tasks.is_empty() {
            return Err(not_found(uuid));
        }
        Ok(tasks.swap_remove(0))
    }

    /// Checklist items of a to-do, in checklist order.
    pub fn checklist_items(&self, todo_uuid: &str) -> RepoResult<Vec<ChecklistItem>> {
        let sql = checklist_items_sql(self.store.time_basis());
        self.store
            .fetch(&sql, &[Value::Text(todo_uuid.to_string())])?
            .iter()
            .map(checklist_item_from_record)
            .collect()
    }

    /// Tag titles attached to a task, in tag order.
    pub fn tags_of(&self, task_uuid: &str) -> RepoResult<Vec<String>> {
        let records = self
            .store
            .fetch(&tags_of_task_sql(), &[Value::Text(task_uuid.to_string())])?;
        Ok(first_column_texts(&records))
    }

    fn list_inner(&self, query: &TaskQuery) -> RepoResult<Vec<Task>> {
        let (records, include_items) = match &query.uuid {
            Some(uuid) => {
                let sql = task_by_uuid_sql(self.store.time_basis());
                let records = self.store.fetch(&sql, &[Value::Text(uuid.clone())])?;
                if records.is_empty() {
                    return Err(not_found(uuid));
                }
                (records, true)
            }
            None => {
                let sql = query.render(self.store.time_basis())?;
                validate_tag(self.store, "tag", &query.tag)?;
                (self.store.fetch(&sql, &[])?, query.include_items)
            }
        };

        records
            .iter()
            .map(|record| self.resolve(record, include_items))
            .collect()
    }

    fn resolve(&self, record: &Record, include_items: bool) -> RepoResult<Task> {
        let mut task = task_from_record(record)?;
        if record.flag("tags") {
            task.tags = self.tags_of(&task.uuid)?;
        }
        if include_items {
            self.attach_items(&mut task)?;
        }
        Ok(task)
    }

    fn attach_items(&self, task: &mut Task) -> RepoResult<()> {
        match task.kind {
            TaskType::ToDo => {
                if task.has_checklist {
                    task.checklist = Some(self.checklist_items(&task.uuid)?);
                }
            }
            TaskType::Project => {
                let mut items = self.list(&TaskQuery {
                    project: Match::is(task.uuid.as_str()),
                    context_trashed: None,
                    include_items: true,
                    ..TaskQuery::default()
                })?;
                items.sort_by_key(|item| !item.is_todo());
                task.items = Some(items);
            }
            TaskType::Heading => {
                task.items = Some(self.list(&TaskQuery {
                    kind: Some(TaskType::ToDo),
                    heading: Match::is(task.uuid.as_str()),
                    context_trashed: None,
                    include_items: true,
                    ..TaskQuery::default()
                })?);
            }
        }
        Ok(())
    }
}

fn not_found(uuid: &str) -> RepoError {
    RepoError::NotFound {
        entity: "task",
        key: uuid.to_string(),
    }
}

pub(crate) fn task_from_record(record: &Record) -> RepoResult<Task> {
    Ok(Task {
        uuid: required_text(record, "uuid")?,
        kind: parse_label(record, "type")?,
        trashed: record.flag("trashed"),
        title: record.text("title").unwrap_or_default(),
        status: parse_label(record, "status")?,
        area: record.text("area"),
        area_title: record.text("area_title"),
        project: record.text("project"),
        project_title: record.text("project_title"),
        heading: record.text("heading"),
        heading_title: record.text("heading_title"),
        notes: record.text("notes").unwrap_or_default(),
        tags: Vec::new(),
        start: record
            .text("start")
            .map(|raw| raw.parse::<StartList>())
            .transpose()
            .map_err(|_| RepoError::InvalidData("unknown `start` label".to_string()))?,
        has_checklist: record.flag("checklist"),
        checklist: None,
        start_date: parse_date(record, "start_date")?,
        deadline: parse_date(record, "deadline")?,
        stop_date: parse_date(record, "stop_date")?,
        created: parse_datetime(record, "created")?,
        modified: parse_datetime(record, "modified")?,
        index: record.integer("index").unwrap_or_default(),
        today_index: record.integer("today_index").unwrap_or_default(),
        items: None,
    })
}

fn checklist_item_from_record(record: &Record) -> RepoResult<ChecklistItem> {
    Ok(ChecklistItem {
        uuid: required_text(record, "uuid")?,
        title: record.text("title").unwrap_or_default(),
        status: parse_label(record, "status")?,
        stop_date: parse_date(record, "stop_date")?,
        created: parse_datetime(record, "created")?,
        modified: parse_datetime(record, "modified")?,
    })
}
