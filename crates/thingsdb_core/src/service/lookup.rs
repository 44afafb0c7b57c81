//! Uuid lookup across entity kinds, full-text search and app links.

use crate::db::RowStore;
use crate::model::task::Task;
use crate::model::Entity;
use crate::query::filter::TaskQuery;
use crate::repo::{AreaRepository, RepoResult, TagQuery, TagRepository, TaskRepository};

const SHOW_URL_PREFIX: &str = "things:///show?id=";

/// Finds any object by uuid, trying tasks, then areas, then tags.
///
/// `Ok(None)` when nothing matches; callers pick their own default.
pub fn get<S>(store: &S, uuid: &str) -> RepoResult<Option<Entity>>
where
    S: RowStore + ?Sized,
{
    match TaskRepository::new(store).get(uuid) {
        Ok(task) => return Ok(Some(Entity::Task(task))),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    match AreaRepository::new(store).get(uuid, false) {
        Ok(area) => return Ok(Some(Entity::Area(area))),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    let tags = TagRepository::new(store).list(&TagQuery::default())?;
    Ok(tags
        .into_iter()
        .find(|tag| tag.uuid == uuid)
        .map(Entity::Tag))
}

/// Tasks whose title, notes or area title contain `query`.
///
/// `base = None` searches open, untrashed tasks.
pub fn search<S>(store: &S, query: &str, base: Option<&TaskQuery>) -> RepoResult<Vec<Task>>
where
    S: RowStore + ?Sized,
{
    let mut filter = base.cloned().unwrap_or_default();
    filter.search_query = Some(query.to_string());
    TaskRepository::new(store).list(&filter)
}

/// `things:///` URL that opens the object in the app.
pub fn link(uuid: &str) -> String {
    format!("{SHOW_URL_PREFIX}{uuid}")
}
