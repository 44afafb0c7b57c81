//! Checklist items of a to-do.

use super::task::Status;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub uuid: String,
    pub title: String,
    pub status: Status,
    pub stop_date: Option<NaiveDate>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}
