use crate::config::{personal_timeline_key, GLOBAL_TIMELINE_KEY};
use crate::core::errors::{FeedError, FeedResult};
use crate::core::helpers::{elapsed_label, now_unix};
use crate::models::models::Page;
use crate::posts;
use crate::store::KvStore;

/// Which list of post ids to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineKey {
    /// A user's personal feed. Profiles read the same list.
    Personal(String),
    Global,
}

impl TimelineKey {
    pub fn personal(user_id: impl Into<String>) -> Self {
        TimelineKey::Personal(user_id.into())
    }

    pub fn store_key(&self) -> String {
        match self {
            TimelineKey::Personal(user_id) => personal_timeline_key(user_id),
            TimelineKey::Global => GLOBAL_TIMELINE_KEY.to_string(),
        }
    }
}

/// Reads `count` posts starting at offset `start`.
///
/// Either every id on the page resolves or the whole call fails with
/// [`FeedError::NotFound`]. `remaining` is `len - start - returned` and can
/// go negative when `start` is past the end.
pub fn page(store: &dyn KvStore, timeline: &TimelineKey, start: i64, count: i64) -> FeedResult<Page> {
    page_at(store, timeline, start, count, now_unix())
}

/// [`page`] with an explicit clock for the elapsed-time labels.
pub fn page_at(
    store: &dyn KvStore,
    timeline: &TimelineKey,
    start: i64,
    count: i64,
    now: i64,
) -> FeedResult<Page> {
    let key = timeline.store_key();
    let ids = if count > 0 {
        store
            .lrange(&key, start, start.saturating_add(count - 1))
            .map_err(|e| FeedError::not_found(format!("timeline {}: {:#}", key, e)))?
    } else {
        Vec::new()
    };

    let mut resolved = Vec::with_capacity(ids.len());
    for id in &ids {
        let mut post = posts::get(store, id)?;
        post.time = elapsed_label(&post.time, now);
        resolved.push(post);
    }

    let total = store
        .llen(&key)
        .map_err(|e| FeedError::not_found(format!("timeline {}: {:#}", key, e)))?;
    let remaining = total.saturating_sub(start).saturating_sub(resolved.len() as i64);

    tracing::debug!(timeline = key.as_str(), start, count, returned = resolved.len(), remaining, "page read");
    Ok(Page {
        posts: resolved,
        start,
        count,
        remaining,
    })
}
