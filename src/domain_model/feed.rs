use serde::Deserialize;
use std::fmt;

/// Number of most recent messages the feed is subscribed to.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize)]
#[serde(transparent)]
pub struct FeedLimit(pub u32);

impl FeedLimit {
    pub fn grown_by(self, increment: PageIncrement) -> Self {
        FeedLimit(self.0.saturating_add(increment.0))
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// True when the window already covers `total` records.
    pub fn covers(self, total: usize) -> bool {
        self.as_usize() >= total
    }
}

impl fmt::Display for FeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PageIncrement(pub u32);

#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub initial_limit: FeedLimit,
    pub page_increment: PageIncrement,
    /// Distance from the top, in pixels, below which the pager fires.
    pub scroll_threshold: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_limit: FeedLimit(50),
            page_increment: PageIncrement(50),
            scroll_threshold: 50,
        }
    }
}
