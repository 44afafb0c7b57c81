//! Tag reader.
//!
//! # Invariants
//! - Tags are looked up by title; an unknown title is an invalid parameter,
//!   not a missing entity.
//! - Tagged items list areas before tasks.

use super::{
    first_column_texts, required_text, validate_tag, AreaQuery, AreaRepository, RepoResult,
    TaskRepository,
};
use crate::db::{Record, RowStore};
use crate::model::tag::{Tag, TagItem};
use crate::query::assemble::{tag_titles_sql, tags_sql};
use crate::query::filter::{Match, TaskQuery};
use crate::query::QueryError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    pub title: Option<String>,
    /// Attach areas and open tasks carrying the tag.
    pub include_items: bool,
}

pub struct TagRepository<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> TagRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn list(&self, query: &TagQuery) -> RepoResult<Vec<Tag>> {
        let title = query.title.as_deref().map_or(Match::Any, Match::from);
        let sql = tags_sql(&title)?;
        validate_tag(self.store, "title", &title)?;

        self.store
            .fetch(&sql, &[])?
            .iter()
            .map(|record| self.resolve(record, query.include_items))
            .collect()
    }

    /// One tag by title.
    pub fn get(&self, title: &str, include_items: bool) -> RepoResult<Tag> {
        self.list(&TagQuery {
            title: Some(title.to_string()),
            include_items,
        })?
        .into_iter()
        .next()
        .ok_or_else(|| QueryError::invalid_parameter("title", title, "an existing tag title").into())
    }

    /// Every tag title, in tag order.
    pub fn titles(&self) -> RepoResult<Vec<String>> {
        Ok(first_column_texts(&self.store.fetch(&tag_titles_sql(), &[])?))
    }

    pub fn of_task(&self, task_uuid: &str) -> RepoResult<Vec<String>> {
        TaskRepository::new(self.store).tags_of(task_uuid)
    }

    pub fn of_area(&self, area_uuid: &str) -> RepoResult<Vec<String>> {
        AreaRepository::new(self.store).tags_of(area_uuid)
    }

    fn resolve(&self, record: &Record, include_items: bool) -> RepoResult<Tag> {
        let title = required_text(record, "title")?;
        let items = if include_items {
            Some(self.items_of(&title)?)
        } else {
            None
        };

        Ok(Tag {
            uuid: required_text(record, "uuid")?,
            shortcut: record.text("shortcut"),
            title,
            items,
        })
    }

    fn items_of(&self, title: &str) -> RepoResult<Vec<TagItem>> {
        let areas = AreaRepository::new(self.store).list(&AreaQuery {
            tag: Match::is(title),
            ..AreaQuery::default()
        })?;
        let tasks = TaskRepository::new(self.store).list(&TaskQuery {
            tag: Match::is(title),
            ..TaskQuery::default()
        })?;

        Ok(areas
            .into_iter()
            .map(TagItem::Area)
            .chain(tasks.into_iter().map(TagItem::Task))
            .collect())
    }
}
