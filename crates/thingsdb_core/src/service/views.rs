//! Derived views: the lists shown in the Things sidebar.
//!
//! # Responsibility
//! - Express each view as one or more disjoint task queries.
//! - Merge and order part results the way the app does.
//!
//! # Invariants
//! - Parts of a view never overlap, so `count` is the sum of part counts
//!   and equals `list(..).len()`.
//! - Caller-supplied base filters apply to every part; the view's own
//!   fields win on conflict.
//! - Sorting after a merge is stable.

use crate::db::RowStore;
use crate::model::task::{StartList, Status, Task, TaskType};
use crate::query::filter::{DateFilter, OrderKey, TaskQuery};
use crate::query::QueryError;
use crate::repo::{RepoResult, TaskRepository};
use log::{debug, warn};
use std::time::Instant;

/// A named task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Inbox,
    /// Scheduled for today, plus the app's predictions of what will land
    /// there on next open (yellow-dot to-dos and overdue deadlines).
    Today,
    Upcoming,
    Anytime,
    Someday,
    Logbook,
    /// Trashed tasks; with `include_context_trashed` also tasks whose
    /// project or heading is trashed.
    Trash { include_context_trashed: bool },
    Deadlines,
    /// Created within an offset such as `3d`, `5w` or `1y`.
    Last(Option<String>),
    Completed,
    Canceled,
    Todos,
    Projects,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Anytime => "anytime",
            Self::Someday => "someday",
            Self::Logbook => "logbook",
            Self::Trash { .. } => "trash",
            Self::Deadlines => "deadlines",
            Self::Last(_) => "last",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Todos => "todos",
            Self::Projects => "projects",
        }
    }

    /// Base filters used when the caller passes none.
    ///
    /// Trash looks at every status.
    pub fn default_base(&self) -> TaskQuery {
        match self {
            Self::Trash { .. } => TaskQuery {
                status: None,
                ..TaskQuery::default()
            },
            _ => TaskQuery::default(),
        }
    }

    /// The disjoint queries whose union is this view.
    pub fn parts(&self, base: &TaskQuery) -> Result<Vec<TaskQuery>, QueryError> {
        let parts = match self {
            Self::Inbox => vec![refine(base, |q| q.start = Some(StartList::Inbox))],
            Self::Anytime => vec![refine(base, |q| q.start = Some(StartList::Anytime))],
            Self::Someday => vec![refine(base, |q| {
                q.start = Some(StartList::Someday);
                q.start_date = DateFilter::Unset;
            })],
            Self::Upcoming => vec![refine(base, |q| {
                q.start = Some(StartList::Someday);
                q.start_date = DateFilter::Future;
            })],
            Self::Today => vec![
                refine(base, |q| {
                    q.start = Some(StartList::Anytime);
                    q.start_date = DateFilter::Set;
                    q.index = OrderKey::TodayIndex;
                }),
                refine(base, |q| {
                    q.start = Some(StartList::Someday);
                    q.start_date = DateFilter::Past;
                    q.index = OrderKey::TodayIndex;
                }),
                refine(base, |q| {
                    q.start_date = DateFilter::Unset;
                    q.deadline = DateFilter::Past;
                    q.deadline_suppressed = Some(false);
                }),
            ],
            Self::Logbook => vec![
                refine(base, |q| {
                    q.status = Some(Status::Canceled);
                    q.index = OrderKey::StopDateDesc;
                }),
                refine(base, |q| {
                    q.status = Some(Status::Completed);
                    q.index = OrderKey::StopDateDesc;
                }),
            ],
            Self::Trash {
                include_context_trashed,
            } => {
                let mut parts = vec![refine(base, |q| {
                    q.trashed = Some(true);
                    q.context_trashed = None;
                })];
                if *include_context_trashed {
                    parts.push(refine(base, |q| {
                        q.trashed = Some(false);
                        q.context_trashed = Some(true);
                    }));
                }
                parts
            }
            Self::Deadlines => vec![refine(base, |q| q.deadline = DateFilter::Set)],
            Self::Last(offset) => {
                let Some(offset) = offset else {
                    return Err(QueryError::invalid_parameter(
                        "offset",
                        "None",
                        "strings of the form `X[d/w/y]`",
                    ));
                };
                vec![refine(base, |q| {
                    q.last = Some(offset.clone());
                    q.index = OrderKey::CreatedDesc;
                })]
            }
            Self::Completed => vec![refine(base, |q| q.status = Some(Status::Completed))],
            Self::Canceled => vec![refine(base, |q| q.status = Some(Status::Canceled))],
            Self::Todos => vec![refine(base, |q| q.kind = Some(TaskType::ToDo))],
            Self::Projects => vec![refine(base, |q| q.kind = Some(TaskType::Project))],
        };
        Ok(parts)
    }

    fn sort(&self, tasks: &mut [Task]) {
        match self {
            Self::Today => tasks.sort_by(|a, b| {
                (a.today_index, a.start_date).cmp(&(b.today_index, b.start_date))
            }),
            Self::Logbook => tasks.sort_by(|a, b| b.stop_date.cmp(&a.stop_date)),
            Self::Deadlines => tasks.sort_by(|a, b| a.deadline.cmp(&b.deadline)),
            Self::Last(_) => tasks.sort_by(|a, b| b.created.cmp(&a.created)),
            Self::Trash { .. } => tasks.sort_by_key(|task| task.index),
            _ => {}
        }
    }
}

fn refine(base: &TaskQuery, apply: impl FnOnce(&mut TaskQuery)) -> TaskQuery {
    let mut query = base.clone();
    apply(&mut query);
    query
}

/// Lists and counts views against one row store.
pub struct ViewService<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> ViewService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Tasks of `view`, merged across parts and ordered like the app.
    ///
    /// # Contract
    /// - `base = None` uses [`View::default_base`].
    /// - Parameter errors surface before any part is read.
    pub fn list(&self, view: &View, base: Option<&TaskQuery>) -> RepoResult<Vec<Task>> {
        let started_at = Instant::now();
        let result = self.list_inner(view, base);
        match &result {
            Ok(tasks) => debug!(
                "event=view_list module=service status=ok view={} rows={} duration_ms={}",
                view.name(),
                tasks.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=view_list module=service status=error view={} error={}",
                view.name(),
                err
            ),
        }
        result
    }

    /// Number of tasks `list` would return.
    pub fn count(&self, view: &View, base: Option<&TaskQuery>) -> RepoResult<usize> {
        let repo = TaskRepository::new(self.store);
        let mut total = 0;
        for part in self.parts(view, base)? {
            total += repo.count(&part)?;
        }
        Ok(total)
    }

    pub fn inbox(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Inbox, None)
    }

    pub fn today(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Today, None)
    }

    pub fn upcoming(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Upcoming, None)
    }

    pub fn anytime(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Anytime, None)
    }

    pub fn someday(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Someday, None)
    }

    pub fn logbook(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Logbook, None)
    }

    /// Trash including tasks of trashed projects and headings.
    pub fn trash(&self) -> RepoResult<Vec<Task>> {
        self.list(
            &View::Trash {
                include_context_trashed: true,
            },
            None,
        )
    }

    pub fn deadlines(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Deadlines, None)
    }

    pub fn last(&self, offset: &str) -> RepoResult<Vec<Task>> {
        self.list(&View::Last(Some(offset.to_string())), None)
    }

    pub fn completed(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Completed, None)
    }

    pub fn canceled(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Canceled, None)
    }

    pub fn todos(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Todos, None)
    }

    pub fn projects(&self) -> RepoResult<Vec<Task>> {
        self.list(&View::Projects, None)
    }

    fn parts(&self, view: &View, base: Option<&TaskQuery>) -> RepoResult<Vec<TaskQuery>> {
        let default_base;
        let base = match base {
            Some(base) => base,
            None => {
                default_base = view.default_base();
                &default_base
            }
        };
        let parts = view.parts(base)?;
        for part in &parts {
            part.offset()?;
        }
        Ok(parts)
    }

    fn list_inner(&self, view: &View, base: Option<&TaskQuery>) -> RepoResult<Vec<Task>> {
        let repo = TaskRepository::new(self.store);
        let mut tasks = Vec::new();
        for part in self.parts(view, base)? {
            tasks.extend(repo.list(&part)?);
        }
        view.sort(&mut tasks);
        Ok(tasks)
    }
}
