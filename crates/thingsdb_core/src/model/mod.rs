//! Read models for the Things schema.
//!
//! # Responsibility
//! - Define immutable snapshots of tasks, areas, tags and checklist items.
//! - Keep serialized field names aligned with the Things vocabulary.
//!
//! # Invariants
//! - Nothing here is created or mutated by this crate; the host app owns the
//!   lifecycle of every record.

pub mod area;
pub mod checklist;
pub mod tag;
pub mod task;

use serde::Serialize;

/// Any object addressable by uuid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Task(task::Task),
    Area(area::Area),
    Tag(tag::Tag),
}

impl Entity {
    pub fn uuid(&self) -> &str {
        match self {
            Self::Task(task) => &task.uuid,
            Self::Area(area) => &area.uuid,
            Self::Tag(tag) => &tag.uuid,
        }
    }
}
