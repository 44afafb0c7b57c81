//! Area read model.

use super::task::Task;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    pub uuid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub has_tags: bool,
    /// To-dos and projects directly in this area.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Task>>,
}
