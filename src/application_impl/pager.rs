use crate::application_impl::FeedViewModel;
use crate::application_port::PagerOutcome;
use crate::domain_model::*;

/// Grows the feed window when the scroll position nears the top.
///
/// Not debounced: every qualifying scroll event may grow the window once,
/// bounded only by the total-count guard.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPager {
    threshold: u32,
    increment: PageIncrement,
}

impl ScrollPager {
    pub fn new(threshold: u32, increment: PageIncrement) -> Self {
        Self {
            threshold,
            increment,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.scroll_threshold, config.page_increment)
    }

    /// `scroll_top` is the distance from the top of the scroll region.
    pub fn on_scroll(&self, scroll_top: u32, feed: &mut FeedViewModel) -> PagerOutcome {
        if scroll_top >= self.threshold {
            return PagerOutcome::NotNearTop;
        }

        let from = feed.limit();
        match feed.grow(self.increment) {
            Some(to) => {
                tracing::debug!(%from, %to, total = feed.total_count(), "loading more history");
                PagerOutcome::Grew { from, to }
            }
            None => {
                tracing::debug!(total = feed.total_count(), "all messages loaded");
                PagerOutcome::Exhausted
            }
        }
    }
}
