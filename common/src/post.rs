use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ForumConfig;

/// The server's long post id, as returned in `longid` and used in `/p/{id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl PostId {
    /// Permalink the browser is sent to after a successful post.
    pub fn permalink(&self, config: &ForumConfig) -> String {
        config.url(&format!("/p/{}", self.0))
    }

    /// URL of the bare rendered fragment used for inline quoting.
    pub fn raw_url(&self, config: &ForumConfig) -> String {
        config.url(&format!("/p/{}?raw=1", self.0))
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

/// Topic a reply belongs to. Zero starts a new topic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub u32);

impl TopicId {
    pub const NEW: TopicId = TopicId(0);

    pub fn is_new(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TopicId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TopicId)
    }
}
