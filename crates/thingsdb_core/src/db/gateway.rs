//! Row-store gateways over the read-only Things database.
//!
//! # Responsibility
//! - Resolve the store path once per handle.
//! - Run one statement per call and map rows to [`Record`]s.
//! - Print statements to a diagnostic sink when enabled.
//!
//! # Invariants
//! - [`Database`] opens and drops a connection for every statement.
//! - [`Session`] reuses a single connection and never outlives its database.
//! - Diagnostic output never changes results; sink write errors are ignored.

use super::{open_read_only, DbResult, Record, RowStore};
use crate::config::{DatabaseConfig, TimeBasis};
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

static LEADING_INDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+").expect("valid indent regex"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid blank line regex"));

/// Handle on one Things database file.
///
/// Cheap to construct; no connection is held between calls.
pub struct Database {
    filepath: PathBuf,
    time_basis: TimeBasis,
    diagnostics: Option<RefCell<Box<dyn Write>>>,
    query_count: Cell<usize>,
}

impl Database {
    /// Resolves the store path from `config` and builds the handle.
    ///
    /// The file is not touched until the first read.
    pub fn new(config: DatabaseConfig) -> Self {
        let filepath = config.resolved_filepath();
        let diagnostics = config
            .print_sql
            .then(|| RefCell::new(Box::new(std::io::stderr()) as Box<dyn Write>));

        Self {
            filepath,
            time_basis: config.time_basis,
            diagnostics,
            query_count: Cell::new(0),
        }
    }

    /// Enables diagnostics and redirects them to `sink`.
    pub fn with_diagnostic_sink(mut self, sink: impl Write + 'static) -> Self {
        self.diagnostics = Some(RefCell::new(Box::new(sink)));
        self
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Opens one read-only connection for a sequence of related reads.
    pub fn session(&self) -> DbResult<Session<'_>> {
        let conn = open_read_only(&self.filepath)?;
        Ok(Session { db: self, conn })
    }

    fn trace_query(&self, sql: &str, params: &[Value]) {
        let Some(sink) = &self.diagnostics else {
            return;
        };
        let count = self.query_count.get() + 1;
        self.query_count.set(count);

        let mut sink = sink.borrow_mut();
        let _ = writeln!(sink, "/* Filepath '{}' */", self.filepath.display());
        let _ = writeln!(sink, "/* Query {count} */");
        if !params.is_empty() {
            let _ = writeln!(sink, "/* Parameters: {} */", render_params(params));
        }
        let _ = writeln!(sink);
        let _ = writeln!(sink, "{}", prettify_sql(sql));
        let _ = writeln!(sink);
        let _ = sink.flush();
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("filepath", &self.filepath)
            .field("time_basis", &self.time_basis)
            .field("print_sql", &self.diagnostics.is_some())
            .finish()
    }
}

impl RowStore for Database {
    fn fetch(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        self.trace_query(sql, params);
        let conn = open_read_only(&self.filepath)?;
        run_query(&conn, sql, params)
    }

    fn time_basis(&self) -> &TimeBasis {
        &self.time_basis
    }
}

/// A read-only connection shared across a call tree.
pub struct Session<'db> {
    db: &'db Database,
    conn: Connection,
}

impl Session<'_> {
    pub fn database(&self) -> &Database {
        self.db
    }
}

impl RowStore for Session<'_> {
    fn fetch(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        self.db.trace_query(sql, params);
        run_query(&self.conn, sql, params)
    }

    fn time_basis(&self) -> &TimeBasis {
        &self.db.time_basis
    }
}

fn run_query(conn: &Connection, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
    let started_at = Instant::now();
    let result = collect_records(conn, sql, params);
    match &result {
        Ok(records) => debug!(
            "event=query_execute module=db status=ok rows={} params={} duration_ms={}",
            records.len(),
            params.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=query_execute module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn collect_records(conn: &Connection, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut fields = Vec::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            fields.push((name.clone(), row.get::<_, Value>(idx)?));
        }
        records.push(Record::new(fields));
    }
    Ok(records)
}

/// Strips indentation and blank lines so statements read well in a terminal.
pub(crate) fn prettify_sql(sql: &str) -> String {
    let dedented = LEADING_INDENT_RE.replace_all(sql, "");
    BLANK_LINES_RE
        .replace_all(&dedented, "\n")
        .trim()
        .to_string()
}

fn render_params(params: &[Value]) -> String {
    let rendered = params
        .iter()
        .map(|value| match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(number) => number.to_string(),
            Value::Real(number) => number.to_string(),
            Value::Text(text) => format!("'{}'", text.replace('\'', "''")),
            Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        })
        .collect::<Vec<_>>();
    format!("[{}]", rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::{prettify_sql, render_params};
    use rusqlite::types::Value;

    #[test]
    fn prettify_sql_drops_indentation_and_blank_lines() {
        let sql = "\n            SELECT\n                uuid\n\n\n            FROM TMTask\n            ";
        assert_eq!(prettify_sql(sql), "SELECT\nuuid\nFROM TMTask");
    }

    #[test]
    fn render_params_quotes_text() {
        let rendered = render_params(&[Value::Text("it's".to_string()), Value::Integer(3)]);
        assert_eq!(rendered, "['it''s', 3]");
    }
}
