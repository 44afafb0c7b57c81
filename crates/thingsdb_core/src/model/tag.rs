//! Tag read model.
//!
//! # Invariants
//! - `title` is the lookup key used by every tag filter; `uuid` is not.

use super::area::Area;
use super::task::Task;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub uuid: String,
    pub title: String,
    pub shortcut: Option<String>,
    /// Areas carrying the tag followed by tasks carrying it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TagItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagItem {
    Area(Area),
    Task(Task),
}
