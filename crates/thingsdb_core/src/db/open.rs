//! Read-only connection bootstrap.
//!
//! # Responsibility
//! - Open the Things store without write capability.
//! - Emit `db_open` events with duration and status.
//!
//! # Invariants
//! - Returned connections are opened with `SQLITE_OPEN_READ_ONLY`.
//! - Returned connections have `query_only=ON`.

use super::{DbError, DbResult};
use log::{debug, error};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Instant;

/// Opens the store at `path` in enforced read-only mode.
///
/// # Errors
/// - Returns [`DbError::Open`] when the file is missing, unreadable or not a
///   database.
pub fn open_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    debug!("event=db_open module=db status=start mode=read_only");

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=read_only duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(DbError::Open {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode=read_only duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=read_only duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(())
}
