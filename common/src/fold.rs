//! Post folding and the persisted fold map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForumError;
use crate::post::PostId;
use crate::prefs::{PreferenceStore, Preferences};

/// Post id → millisecond timestamp at which it was folded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoldMap(HashMap<String, i64>);

impl FoldMap {
    pub fn from_json(json: &str) -> Result<Self, ForumError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ForumError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn insert(&mut self, post: PostId, folded_at: DateTime<Utc>) {
        self.0.insert(post.to_string(), folded_at.timestamp_millis());
    }

    pub fn remove(&mut self, post: PostId) {
        self.0.remove(&post.to_string());
    }

    /// When the post was folded. Entries with an out-of-range stamp read as `None`.
    pub fn get(&self, post: PostId) -> Option<DateTime<Utc>> {
        self.0
            .get(&post.to_string())
            .copied()
            .and_then(DateTime::from_timestamp_millis)
    }

    pub fn contains(&self, post: PostId) -> bool {
        self.0.contains_key(&post.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Folded flag of one post's toggle control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoldState {
    pub folded: bool,
}

impl FoldState {
    /// Initial state for a freshly rendered post.
    pub fn restore(map: &FoldMap, post: PostId) -> Self {
        Self {
            folded: map.contains(post),
        }
    }

    pub fn icon_class(&self) -> &'static str {
        if self.folded {
            "icon-plus-squared"
        } else {
            "icon-minus-squared"
        }
    }

    pub fn message_visible(&self) -> bool {
        !self.folded
    }

    /// Flip the post and persist the whole map. The map entry is written or
    /// removed to match the new state.
    ///
    /// An unreadable stored map aborts the toggle: neither the state nor the
    /// store is touched, so other posts' entries are never overwritten.
    pub fn toggle<S: PreferenceStore>(
        &mut self,
        prefs: &Preferences<S>,
        post: PostId,
        now: DateTime<Utc>,
    ) -> Result<(), ForumError> {
        let mut map = prefs.fold_map()?;
        self.folded = !self.folded;
        if self.folded {
            map.insert(post, now);
        } else {
            map.remove(post);
        }
        tracing::debug!("Post {post} folded={}", self.folded);
        prefs.save_fold_map(&map)
    }
}
