//! Store location and time-basis configuration.
//!
//! # Responsibility
//! - Resolve the Things database path once per handle.
//! - Describe how "now" and local wall-clock conversions are rendered in SQL.
//!
//! # Invariants
//! - Resolution order: explicit path > `THINGSDB` > built-in default.
//! - A resolved file whose first line is the "database moved" marker is
//!   replaced with the built-in default.
//! - UTC-midnight columns never receive a local-time modifier.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no explicit path is configured.
pub const ENVIRONMENT_VARIABLE_WITH_FILEPATH: &str = "THINGSDB";

const DEFAULT_RELATIVE_FILEPATH: &str = "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac/Things Database.thingsdatabase/main.sqlite";
const MOVED_DATABASE_MARKER: &str = "Your database file has been moved there";
const MARKER_PROBE_BYTES: u64 = 4096;

/// Returns the database location used by Things 3.12.6 and newer.
pub fn default_filepath() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(DEFAULT_RELATIVE_FILEPATH)
}

/// Resolves the store path from an explicit value and the environment value.
///
/// Empty values are treated as unset.
pub fn resolve_filepath(explicit: Option<&Path>, env_value: Option<OsString>) -> PathBuf {
    let candidate = explicit
        .filter(|path| !path.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|value| !value.is_empty()).map(PathBuf::from))
        .unwrap_or_else(default_filepath);

    if is_moved_marker(&candidate) {
        return default_filepath();
    }
    candidate
}

// Older Things releases leave a text stub behind at the legacy location.
// Binary or unreadable files are never markers.
fn is_moved_marker(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut first_line = Vec::new();
    if BufReader::new(file.take(MARKER_PROBE_BYTES))
        .read_until(b'\n', &mut first_line)
        .is_err()
    {
        return false;
    }
    match String::from_utf8(first_line) {
        Ok(line) => line.contains(MOVED_DATABASE_MARKER),
        Err(_) => false,
    }
}

/// Time zone applied to local wall-clock conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The process time zone, via SQLite's `localtime` modifier.
    #[default]
    Local,
    /// A fixed offset east of UTC, in seconds.
    Fixed(i32),
}

impl Zone {
    /// UTC as a fixed zone.
    pub fn utc() -> Self {
        Self::Fixed(0)
    }

    fn modifier(self) -> String {
        match self {
            Self::Local => "'localtime'".to_string(),
            Self::Fixed(offset_seconds) => format!("'{offset_seconds:+} seconds'"),
        }
    }
}

/// Clock used when rendering date predicates and local timestamps.
///
/// `now` pins the current instant (Unix seconds); `None` defers to the
/// engine's own clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBasis {
    pub zone: Zone,
    pub now: Option<i64>,
}

impl TimeBasis {
    /// Fixed offset and pinned instant, mostly useful for reproducible reads.
    pub fn fixed(offset_seconds: i32, now: i64) -> Self {
        Self {
            zone: Zone::Fixed(offset_seconds),
            now: Some(now),
        }
    }

    fn now_args(&self) -> String {
        match self.now {
            Some(seconds) => format!("{seconds}, 'unixepoch'"),
            None => "'now'".to_string(),
        }
    }

    /// Today's calendar date in the configured zone.
    pub(crate) fn local_today(&self) -> String {
        format!("date({}, {})", self.now_args(), self.zone.modifier())
    }

    /// The current instant shifted by an SQLite modifier such as `-3 days`.
    pub(crate) fn utc_now_shifted(&self, modifier: &str) -> String {
        format!("datetime({}, '{modifier}')", self.now_args())
    }

    /// Calendar date of an epoch column stored as a full timestamp.
    pub(crate) fn local_date_of(&self, column: &str) -> String {
        format!("date({column}, 'unixepoch', {})", self.zone.modifier())
    }

    /// Local wall-clock datetime of an epoch column.
    pub(crate) fn local_datetime_of(&self, column: &str) -> String {
        format!("datetime({column}, 'unixepoch', {})", self.zone.modifier())
    }

    /// Calendar date of an epoch column stored as 00:00 UTC.
    pub(crate) fn utc_date_of(column: &str) -> String {
        format!("date({column}, 'unixepoch')")
    }
}

/// Construction parameters for a [`crate::db::Database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Explicit store path; wins over the environment.
    pub filepath: Option<PathBuf>,
    /// Print every statement to the diagnostic sink before running it.
    pub print_sql: bool,
    pub time_basis: TimeBasis,
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filepath(mut self, filepath: impl Into<PathBuf>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }

    pub fn with_print_sql(mut self, print_sql: bool) -> Self {
        self.print_sql = print_sql;
        self
    }

    pub fn with_time_basis(mut self, time_basis: TimeBasis) -> Self {
        self.time_basis = time_basis;
        self
    }

    /// Applies the documented resolution order against the live environment.
    pub fn resolved_filepath(&self) -> PathBuf {
        resolve_filepath(
            self.filepath.as_deref(),
            std::env::var_os(ENVIRONMENT_VARIABLE_WITH_FILEPATH),
        )
    }
}
