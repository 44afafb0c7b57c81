//! Store metadata probes: schema version and URL-scheme token.

use super::{RepoError, RepoResult};
use crate::db::{DbError, RowStore};
use crate::query::assemble::{token_sql, version_sql};
use log::info;
use rusqlite::types::Value;
use std::io::Cursor;

pub struct MetaRepository<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> MetaRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Database schema version stored as a property-list blob.
    pub fn version(&self) -> RepoResult<i64> {
        let records = self.store.fetch(&version_sql(), &[])?;
        let bytes = match records.first().and_then(|record| record.first()) {
            Some(Value::Text(text)) => text.as_bytes().to_vec(),
            Some(Value::Blob(bytes)) => bytes.clone(),
            _ => {
                return Err(RepoError::InvalidData(
                    "database version is missing".to_string(),
                ))
            }
        };

        let version = decode_version(&bytes)?;
        info!("event=version_probe module=repo status=ok version={version}");
        Ok(version)
    }

    /// Token required by authenticated `things:///` URL commands.
    pub fn url_scheme_token(&self) -> RepoResult<Option<String>> {
        let records = self.store.fetch(&token_sql(), &[])?;
        Ok(records.first().and_then(|record| match record.first() {
            Some(Value::Text(token)) => Some(token.clone()),
            _ => None,
        }))
    }
}

fn decode_version(bytes: &[u8]) -> RepoResult<i64> {
    let value = plist::Value::from_reader(Cursor::new(bytes))
        .map_err(|err| DbError::InvalidData(format!("database version plist: {err}")))?;
    value
        .as_signed_integer()
        .ok_or_else(|| DbError::InvalidData(format!("database version is not an integer: {value:?}")))
        .map_err(RepoError::from)
}
