//! Trait seam over the external comment source.
//!
//! The pipeline depends on this trait rather than on `RedditClient` directly
//! so tests can script pages and failures with a mock: no network, no pacing.

use anyhow::Result;
use async_trait::async_trait;
use reddit_client::{About, CommentPage, RedditClient};

#[async_trait]
pub trait CommentSource: Send + Sync {
    /// One page of a subreddit's comment listing.
    async fn subreddit_page(&self, subreddit: &str, after: Option<&str>) -> Result<CommentPage>;

    /// One page of an author's comment history.
    async fn author_comments_page(&self, author: &str, after: Option<&str>)
        -> Result<CommentPage>;

    /// Account-level attributes for one author.
    async fn author_about(&self, author: &str) -> Result<About>;
}

#[async_trait]
impl CommentSource for RedditClient {
    async fn subreddit_page(&self, subreddit: &str, after: Option<&str>) -> Result<CommentPage> {
        Ok(self.subreddit_comments(subreddit, after).await?)
    }

    async fn author_comments_page(
        &self,
        author: &str,
        after: Option<&str>,
    ) -> Result<CommentPage> {
        Ok(self.author_comments(author, after).await?)
    }

    async fn author_about(&self, author: &str) -> Result<About> {
        Ok(self.author_about(author).await?)
    }
}
