//! Area reader.

use super::{
    count_of, first_column_texts, required_text, validate_tag, RepoError, RepoResult,
    TaskRepository,
};
use crate::db::{Record, RowStore};
use crate::model::area::Area;
use crate::query::assemble::{areas_sql, count_sql, tags_of_area_sql};
use crate::query::filter::{Match, TaskQuery};
use log::debug;
use rusqlite::types::Value;

/// Area filters; fields combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaQuery {
    pub uuid: Option<String>,
    /// Tag title; `Present`/`Absent` select areas with or without tags.
    pub tag: Match,
    /// Attach the area's open tasks.
    pub include_items: bool,
}

pub struct AreaRepository<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> AreaRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn list(&self, query: &AreaQuery) -> RepoResult<Vec<Area>> {
        let sql = self.render(query)?;
        let areas = self
            .store
            .fetch(&sql, &[])?
            .iter()
            .map(|record| self.resolve(record, query.include_items))
            .collect::<RepoResult<Vec<_>>>()?;

        debug!(
            "event=area_list module=repo status=ok rows={} include_items={}",
            areas.len(),
            query.include_items
        );
        Ok(areas)
    }

    pub fn count(&self, query: &AreaQuery) -> RepoResult<usize> {
        let sql = count_sql(&self.render(query)?);
        count_of(&self.store.fetch(&sql, &[])?)
    }

    /// One area; `NotFound` when the uuid is unknown.
    pub fn get(&self, uuid: &str, include_items: bool) -> RepoResult<Area> {
        self.list(&AreaQuery {
            uuid: Some(uuid.to_string()),
            tag: Match::Any,
            include_items,
        })?
        .into_iter()
        .next()
        .ok_or_else(|| RepoError::NotFound {
            entity: "area",
            key: uuid.to_string(),
        })
    }

    pub fn tags_of(&self, area_uuid: &str) -> RepoResult<Vec<String>> {
        let records = self
            .store
            .fetch(&tags_of_area_sql(), &[Value::Text(area_uuid.to_string())])?;
        Ok(first_column_texts(&records))
    }

    fn render(&self, query: &AreaQuery) -> RepoResult<String> {
        let uuid = query
            .uuid
            .as_deref()
            .map_or(Match::Any, Match::from);
        let sql = areas_sql(&uuid, &query.tag)?;
        validate_tag(self.store, "tag", &query.tag)?;
        Ok(sql)
    }

    fn resolve(&self, record: &Record, include_items: bool) -> RepoResult<Area> {
        let uuid = required_text(record, "uuid")?;
        let has_tags = record.flag("tags");
        let tags = if has_tags {
            self.tags_of(&uuid)?
        } else {
            Vec::new()
        };
        let items = if include_items {
            Some(TaskRepository::new(self.store).list(&TaskQuery {
                area: Match::is(uuid.as_str()),
                include_items: true,
                ..TaskQuery::default()
            })?)
        } else {
            None
        };

        Ok(Area {
            title: record.text("title").unwrap_or_default(),
            uuid,
            tags,
            has_tags,
            items,
        })
    }
}
