//! Task domain model (to-dos, projects and headings).
//!
//! # Responsibility
//! - Mirror the raw `TMTask` codes as typed enums.
//! - Define the read model returned by task queries.
//!
//! # Invariants
//! - Raw codes map one-to-one onto enum variants; unknown codes are rejected
//!   by the repository instead of being masked.
//! - Context fields stay `None` when the task has no such container.

use super::checklist::ChecklistItem;
use crate::query::QueryError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The database uses "task" for all three kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskType {
    #[serde(rename = "to-do")]
    ToDo,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "heading")]
    Heading,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [Self::ToDo, Self::Project, Self::Heading];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::Project => "project",
            Self::Heading => "heading",
        }
    }

    /// Value of `TMTask.type`.
    pub fn code(self) -> i64 {
        match self {
            Self::ToDo => 0,
            Self::Project => 1,
            Self::Heading => 2,
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| QueryError::invalid_parameter("type", value, "to-do, project, heading"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Incomplete,
    Canceled,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Self::Incomplete, Self::Canceled, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }

    /// Value of `status` in `TMTask` and `TMChecklistItem`.
    pub fn code(self) -> i64 {
        match self {
            Self::Incomplete => 0,
            Self::Canceled => 2,
            Self::Completed => 3,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                QueryError::invalid_parameter("status", value, "incomplete, canceled, completed")
            })
    }
}

/// Sidebar list a task starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StartList {
    Inbox,
    Anytime,
    Someday,
}

impl StartList {
    pub const ALL: [StartList; 3] = [Self::Inbox, Self::Anytime, Self::Someday];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Anytime => "Anytime",
            Self::Someday => "Someday",
        }
    }

    /// Value of `TMTask.start`.
    pub fn code(self) -> i64 {
        match self {
            Self::Inbox => 0,
            Self::Anytime => 1,
            Self::Someday => 2,
        }
    }
}

impl Display for StartList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartList {
    type Err = QueryError;

    /// Case-insensitive: `inbox`, `INBOX` and `Inbox` are the same list.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|start| start.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| QueryError::invalid_parameter("start", value, "Inbox, Anytime, Someday"))
    }
}

/// One row of the task projection plus resolved nested data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    #[serde(skip_serializing_if = "is_false")]
    pub trashed: bool,
    pub title: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_title: Option<String>,
    pub notes: String,
    /// Tag titles in tag order; resolved only for rows flagged as tagged.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub start: Option<StartList>,
    #[serde(skip)]
    pub has_checklist: bool,
    /// Loaded only when items are included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub stop_date: Option<NaiveDate>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub index: i64,
    pub today_index: i64,
    /// Headings and to-dos of a project, or to-dos of a heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Task>>,
}

impl Task {
    pub fn is_todo(&self) -> bool {
        self.kind == TaskType::ToDo
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
