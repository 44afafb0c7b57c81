//! Read-only query layer over the Things 3 SQLite database.
//! Filters are typed values; every read goes through a read-only connection.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{DatabaseConfig, TimeBasis, Zone, ENVIRONMENT_VARIABLE_WITH_FILEPATH};
pub use db::{Database, DbError, DbResult, Record, RowStore, Session};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::area::Area;
pub use model::checklist::ChecklistItem;
pub use model::tag::{Tag, TagItem};
pub use model::task::{StartList, Status, Task, TaskType};
pub use model::Entity;
pub use query::filter::{DateFilter, Match, Offset, OrderKey, TaskQuery};
pub use query::{QueryError, QueryResult};
pub use repo::{
    AreaQuery, AreaRepository, MetaRepository, RepoError, RepoResult, TagQuery, TagRepository,
    TaskRepository,
};
pub use service::lookup::{get, link, search};
pub use service::views::{View, ViewService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
