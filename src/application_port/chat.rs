use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("not signed in")]
    NoSession,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    SignedIn(Session),
    SignedOut,
    /// Same user, refreshed copy.
    Refreshed,
    Unchanged,
}

/// Which part of the feed a notification touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    Messages { visible: usize },
    TotalCount(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerOutcome {
    NotNearTop,
    Grew { from: FeedLimit, to: FeedLimit },
    /// Window already covers the whole collection.
    Exhausted,
}
