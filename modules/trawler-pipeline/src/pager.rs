//! Drives repeated calls to a paginated comment listing.
//!
//! Pagination is an explicit loop over the cursor store — the cursor only
//! advances after a successful page, so a failed fetch retries the same
//! position next cycle. A fixed pacing delay precedes every call to respect
//! the source's rate limit; consecutive failures stretch it exponentially up
//! to a cap, and after `MAX_FETCH_ATTEMPTS` in a row the pager surfaces an
//! error instead of retrying forever.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use trawler_common::TrawlerError;

use crate::cursor::CursorStore;
use crate::source::CommentSource;

/// Consecutive transport failures tolerated before the pager gives up on the
/// current position and surfaces an error.
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

/// Ceiling on the backed-off inter-call delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Which listing stream this pager walks.
#[derive(Debug, Clone)]
pub enum PageTarget {
    Subreddit(String),
    Author(String),
}

impl PageTarget {
    fn describe(&self) -> String {
        match self {
            PageTarget::Subreddit(s) => format!("r/{s}"),
            PageTarget::Author(a) => format!("u/{a}"),
        }
    }
}

/// Finite pass (stop at the terminal cursor) or continuous stream (loop back
/// to the start of the sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    SinglePass,
    Continuous,
}

/// Result of one fetch cycle.
#[derive(Debug)]
pub enum PageOutcome {
    /// A page of raw records; the cursor has advanced past it.
    Page(Vec<reddit_client::Comment>),
    /// Transport failure: no records this cycle, cursor unchanged.
    Retry,
    /// Terminal cursor reached in a single pass.
    Exhausted,
}

pub struct Pager {
    source: Arc<dyn CommentSource>,
    target: PageTarget,
    cursor: CursorStore,
    pacing: Duration,
    mode: PassMode,
    consecutive_failures: u32,
}

impl Pager {
    pub fn new(
        source: Arc<dyn CommentSource>,
        target: PageTarget,
        pacing: Duration,
        mode: PassMode,
    ) -> Self {
        Self {
            source,
            target,
            cursor: CursorStore::new(),
            pacing,
            mode,
            consecutive_failures: 0,
        }
    }

    pub fn cursor(&self) -> &CursorStore {
        &self.cursor
    }

    /// Fetch the next page. Sleeps the pacing delay first, every call,
    /// regardless of how long the previous response took.
    pub async fn next_page(&mut self) -> Result<PageOutcome, TrawlerError> {
        if self.cursor.is_exhausted() {
            match self.mode {
                PassMode::SinglePass => return Ok(PageOutcome::Exhausted),
                PassMode::Continuous => {
                    info!(target = %self.target.describe(), "Sequence exhausted, looping back to start");
                    self.cursor.reset();
                }
            }
        }

        tokio::time::sleep(self.delay()).await;

        let after = self.cursor.current();
        let result = match &self.target {
            PageTarget::Subreddit(subreddit) => {
                self.source.subreddit_page(subreddit, after).await
            }
            PageTarget::Author(author) => self.source.author_comments_page(author, after).await,
        };

        match result {
            Ok(page) => {
                self.consecutive_failures = 0;
                debug!(
                    target = %self.target.describe(),
                    records = page.comments.len(),
                    next = ?page.after,
                    "Fetched page"
                );
                self.cursor.advance(page.after);
                Ok(PageOutcome::Page(page.comments))
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    target = %self.target.describe(),
                    attempt = self.consecutive_failures,
                    error = %e,
                    "Page fetch failed, will retry same position"
                );
                if self.consecutive_failures >= MAX_FETCH_ATTEMPTS {
                    self.consecutive_failures = 0;
                    return Err(TrawlerError::Transport(format!(
                        "{} failed {MAX_FETCH_ATTEMPTS} consecutive fetches: {e}",
                        self.target.describe()
                    )));
                }
                Ok(PageOutcome::Retry)
            }
        }
    }

    /// Pacing delay, doubled per consecutive failure, capped.
    fn delay(&self) -> Duration {
        let factor = 1u32 << self.consecutive_failures.min(6);
        (self.pacing * factor).min(MAX_BACKOFF)
    }
}
