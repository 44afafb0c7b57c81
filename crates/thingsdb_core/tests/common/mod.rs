#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;
use thingsdb_core::{Database, DatabaseConfig, TimeBasis};

/// 2024-03-15 12:00:00 UTC.
pub const NOW: i64 = 1_710_504_000;
/// 2024-03-15 00:00:00 UTC.
pub const DAY0: i64 = 1_710_460_800;
pub const DAY: i64 = 86_400;
pub const HOUR: i64 = 3_600;

pub const VERSION_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<integer>24</integer>
</plist>"#;
pub const TOKEN: &str = "vKkylosuSuGwxrz7qcklOw";

const SCHEMA_SQL: &str = r#"
CREATE TABLE TMTask (
    uuid TEXT PRIMARY KEY,
    type INTEGER,
    trashed INTEGER,
    title TEXT,
    status INTEGER,
    area TEXT,
    project TEXT,
    actionGroup TEXT,
    notes TEXT,
    start INTEGER,
    startDate INTEGER,
    dueDate INTEGER,
    dueDateSuppressionDate INTEGER,
    stopDate REAL,
    creationDate REAL,
    userModificationDate REAL,
    "index" INTEGER,
    todayIndex INTEGER,
    recurrenceRule BLOB
);
CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT, "index" INTEGER);
CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT, shortcut TEXT, "index" INTEGER);
CREATE TABLE TMTaskTag (tasks TEXT, tags TEXT);
CREATE TABLE TMAreaTag (areas TEXT, tags TEXT);
CREATE TABLE TMChecklistItem (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    status INTEGER,
    stopDate REAL,
    task TEXT,
    "index" INTEGER,
    creationDate REAL,
    userModificationDate REAL
);
CREATE TABLE Meta (key TEXT PRIMARY KEY, value TEXT);
CREATE TABLE TMSettings (uuid TEXT PRIMARY KEY, uriSchemeAuthenticationToken TEXT);
"#;

pub const INBOX_TODO: &str = "T-INBOX-1";
pub const PLUMBER: &str = "T-INBOX-2";
pub const TODAY_TODO: &str = "T-TODAY";
pub const TODAY_PROJECT: &str = "P-TODAY";
pub const YELLOW_TODO: &str = "T-YELLOW";
pub const UPCOMING_TODO: &str = "T-UPCOMING";
pub const SOMEDAY_TODO: &str = "T-SOMEDAY";
pub const OVERDUE_TODO: &str = "T-OVERDUE";
pub const SUPPRESSED_TODO: &str = "T-SUPPRESSED";
pub const FUTURE_DEADLINE_TODO: &str = "T-FUTURE-DEADLINE";
pub const PROJECT_ALPHA: &str = "P-ALPHA";
pub const HEADING_H: &str = "H-ALPHA";
pub const PROJECT_TODO: &str = "T-IN-PROJECT";
pub const HEADING_TODO: &str = "T-IN-HEADING";
pub const HEADING_DONE: &str = "T-DONE-IN-HEADING";
pub const DONE_YESTERDAY: &str = "T-DONE-YESTERDAY";
pub const CANCELED_EARLIER: &str = "T-CANCELED";
pub const DONE_AT_BOUNDARY: &str = "T-DONE-BOUNDARY";
pub const TRASHED_TODO: &str = "T-TRASHED";
pub const DELETED_PROJECT: &str = "P-DELETED";
pub const IN_DELETED_PROJECT: &str = "T-IN-DELETED-PROJECT";
pub const REPEATING_TEMPLATE: &str = "T-REPEATING";

pub const AREA_WORK: &str = "A-WORK";
pub const AREA_HOME: &str = "A-HOME";
pub const TAG_ERRAND: &str = "TG-ERRAND";
pub const TAG_IMPORTANT: &str = "TG-IMPORTANT";
pub const TAG_OFFICE: &str = "TG-OFFICE";

/// One `TMTask` row; defaults to an open, untrashed Anytime to-do.
struct TaskRow {
    uuid: &'static str,
    kind: i64,
    title: &'static str,
    status: i64,
    trashed: i64,
    start: i64,
    area: Option<&'static str>,
    project: Option<&'static str>,
    heading: Option<&'static str>,
    notes: &'static str,
    start_date: Option<i64>,
    due: Option<i64>,
    suppressed: Option<i64>,
    stop: Option<i64>,
    created: i64,
    index: i64,
    today_index: i64,
    repeating: bool,
}

impl TaskRow {
    fn todo(uuid: &'static str, title: &'static str, index: i64) -> Self {
        Self {
            uuid,
            kind: 0,
            title,
            status: 0,
            trashed: 0,
            start: 1,
            area: None,
            project: None,
            heading: None,
            notes: "",
            start_date: None,
            due: None,
            suppressed: None,
            stop: None,
            created: NOW - 10 * DAY,
            index,
            today_index: 0,
            repeating: false,
        }
    }

    fn project(uuid: &'static str, title: &'static str, index: i64) -> Self {
        Self {
            kind: 1,
            ..Self::todo(uuid, title, index)
        }
    }

    fn insert(&self, conn: &Connection) {
        conn.execute(
            r#"INSERT INTO TMTask (
                uuid, type, trashed, title, status, area, project, actionGroup, notes,
                start, startDate, dueDate, dueDateSuppressionDate, stopDate,
                creationDate, userModificationDate, "index", todayIndex, recurrenceRule
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15, ?16, ?17, ?18)"#,
            params![
                self.uuid,
                self.kind,
                self.trashed,
                self.title,
                self.status,
                self.area,
                self.project,
                self.heading,
                self.notes,
                self.start,
                self.start_date,
                self.due,
                self.suppressed,
                self.stop,
                self.created,
                self.index,
                self.today_index,
                self.repeating.then(|| vec![0_u8, 1, 2]),
            ],
        )
        .unwrap();
    }
}

/// A populated Things store inside a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        populate(&conn);
        drop(conn);
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Database pinned to [`NOW`] in UTC.
    pub fn database(&self) -> Database {
        self.database_with(TimeBasis::fixed(0, NOW))
    }

    pub fn database_with(&self, basis: TimeBasis) -> Database {
        Database::new(
            DatabaseConfig::new()
                .with_filepath(&self.path)
                .with_time_basis(basis),
        )
    }

    /// Opens a writable connection for tests that mutate the fixture.
    pub fn writer(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }
}

fn populate(conn: &Connection) {
    conn.execute_batch(
        r#"
        INSERT INTO TMArea (uuid, title, "index") VALUES ('A-WORK', 'Work', 1), ('A-HOME', 'Home', 2);
        INSERT INTO TMTag (uuid, title, shortcut, "index") VALUES
            ('TG-ERRAND', 'Errand', 'e', 1),
            ('TG-IMPORTANT', 'Important', NULL, 2),
            ('TG-OFFICE', 'Office', NULL, 3);
        INSERT INTO TMAreaTag (areas, tags) VALUES ('A-WORK', 'TG-OFFICE');
        INSERT INTO TMTaskTag (tasks, tags) VALUES
            ('T-INBOX-2', 'TG-ERRAND'),
            ('T-TODAY', 'TG-ERRAND'),
            ('T-TODAY', 'TG-OFFICE'),
            ('T-IN-PROJECT', 'TG-IMPORTANT'),
            ('T-IN-HEADING', 'TG-IMPORTANT');
        INSERT INTO TMSettings (uuid, uriSchemeAuthenticationToken)
            VALUES ('RhAzEf6qDxCD5PmnZVtBZR', 'vKkylosuSuGwxrz7qcklOw');
        "#,
    )
    .unwrap();
    conn.execute(
        "INSERT INTO Meta (key, value) VALUES ('databaseVersion', ?1)",
        params![VERSION_PLIST],
    )
    .unwrap();

    let rows = [
        TaskRow {
            start: 0,
            created: NOW - DAY,
            ..TaskRow::todo(INBOX_TODO, "Inbox To-Do", 1)
        },
        TaskRow {
            start: 0,
            notes: "it's leaking",
            ..TaskRow::todo(PLUMBER, "Call plumber", 2)
        },
        TaskRow {
            area: Some(AREA_WORK),
            start_date: Some(DAY0),
            today_index: 2,
            ..TaskRow::todo(TODAY_TODO, "To-Do in Today", 3)
        },
        TaskRow {
            start_date: Some(DAY0 - 2 * DAY),
            today_index: 1,
            ..TaskRow::project(TODAY_PROJECT, "Project in Today", 4)
        },
        TaskRow {
            start: 2,
            start_date: Some(DAY0 - DAY),
            today_index: 0,
            ..TaskRow::todo(YELLOW_TODO, "Upcoming To-Do in Today (yellow)", 5)
        },
        TaskRow {
            start: 2,
            start_date: Some(DAY0 + 3 * DAY),
            ..TaskRow::todo(UPCOMING_TODO, "Upcoming To-Do", 6)
        },
        TaskRow {
            start: 2,
            ..TaskRow::todo(SOMEDAY_TODO, "Someday To-Do", 7)
        },
        TaskRow {
            due: Some(DAY0 - 2 * DAY),
            today_index: 3,
            ..TaskRow::todo(OVERDUE_TODO, "Overdue To-Do", 8)
        },
        TaskRow {
            due: Some(DAY0 - DAY),
            suppressed: Some(DAY0),
            today_index: 4,
            ..TaskRow::todo(SUPPRESSED_TODO, "Suppressed Overdue To-Do", 9)
        },
        TaskRow {
            due: Some(DAY0 + 5 * DAY),
            ..TaskRow::todo(FUTURE_DEADLINE_TODO, "Future Deadline To-Do", 10)
        },
        TaskRow {
            area: Some(AREA_HOME),
            ..TaskRow::project(PROJECT_ALPHA, "Project Alpha", 11)
        },
        TaskRow {
            kind: 2,
            project: Some(PROJECT_ALPHA),
            ..TaskRow::todo(HEADING_H, "Heading H", 12)
        },
        TaskRow {
            project: Some(PROJECT_ALPHA),
            ..TaskRow::todo(PROJECT_TODO, "To-Do in Project", 13)
        },
        TaskRow {
            heading: Some(HEADING_H),
            ..TaskRow::todo(HEADING_TODO, "To-Do in Heading", 14)
        },
        TaskRow {
            heading: Some(HEADING_H),
            status: 3,
            stop: Some(DAY0 - 5 * DAY + 9 * HOUR),
            ..TaskRow::todo(HEADING_DONE, "Completed To-Do in Heading", 15)
        },
        TaskRow {
            status: 3,
            stop: Some(DAY0 - 14 * HOUR),
            ..TaskRow::todo(DONE_YESTERDAY, "Completed Yesterday", 16)
        },
        TaskRow {
            status: 2,
            stop: Some(DAY0 - 3 * DAY + 8 * HOUR),
            ..TaskRow::todo(CANCELED_EARLIER, "Canceled Earlier", 17)
        },
        TaskRow {
            status: 3,
            stop: Some(DAY0 - 2 * HOUR),
            ..TaskRow::todo(DONE_AT_BOUNDARY, "Completed at Boundary", 18)
        },
        TaskRow {
            trashed: 1,
            ..TaskRow::todo(TRASHED_TODO, "Trashed To-Do", 19)
        },
        TaskRow {
            trashed: 1,
            ..TaskRow::project(DELETED_PROJECT, "Deleted Project", 20)
        },
        TaskRow {
            project: Some(DELETED_PROJECT),
            ..TaskRow::todo(IN_DELETED_PROJECT, "To-Do in Deleted Project", 21)
        },
        TaskRow {
            repeating: true,
            ..TaskRow::todo(REPEATING_TEMPLATE, "Repeating Template", 22)
        },
    ];
    for row in &rows {
        row.insert(conn);
    }

    conn.execute_batch(&format!(
        r#"
        INSERT INTO TMChecklistItem (uuid, title, status, stopDate, task, "index", creationDate, userModificationDate)
        VALUES
            ('CL-1', 'Buy milk', 0, NULL, 'T-TODAY', 1, {created}, {created}),
            ('CL-2', 'Buy eggs', 3, {stopped}, 'T-TODAY', 2, {created}, {stopped});
        "#,
        created = NOW - 2 * DAY,
        stopped = NOW - HOUR,
    ))
    .unwrap();
}

/// Diagnostic sink whose output stays readable after the database owns it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn titles(tasks: &[thingsdb_core::Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

pub fn uuids(tasks: &[thingsdb_core::Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.uuid.as_str()).collect()
}
