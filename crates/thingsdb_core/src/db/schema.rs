//! Table, column and code names of the Things SQLite schema.

pub const TABLE_AREA: &str = "TMArea";
pub const TABLE_AREATAG: &str = "TMAreaTag";
pub const TABLE_CHECKLIST_ITEM: &str = "TMChecklistItem";
pub const TABLE_META: &str = "Meta";
pub const TABLE_SETTINGS: &str = "TMSettings";
pub const TABLE_TAG: &str = "TMTag";
pub const TABLE_TASK: &str = "TMTask";
pub const TABLE_TASKTAG: &str = "TMTaskTag";

pub const DATE_CREATED: &str = "creationDate";
pub const DATE_DEADLINE: &str = "dueDate";
pub const DATE_DEADLINE_SUPPRESSED: &str = "dueDateSuppressionDate";
pub const DATE_MODIFIED: &str = "userModificationDate";
pub const DATE_START: &str = "startDate";
pub const DATE_STOP: &str = "stopDate";

pub const META_DATABASE_VERSION_KEY: &str = "databaseVersion";
/// Fixed primary key of the single `TMSettings` row.
pub const SETTINGS_UUID: &str = "RhAzEf6qDxCD5PmnZVtBZR";

pub const IS_NOT_RECURRING: &str = "TASK.recurrenceRule IS NULL";

pub const TRASHED_CODE: i64 = 1;
pub const NOT_TRASHED_CODE: i64 = 0;
