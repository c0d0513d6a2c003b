pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::{About, Comment, CommentPage, Envelope, ListingData};

const BASE_URL: &str = "https://www.reddit.com";

/// The unauthenticated API throttles aggressively on default user agents.
const USER_AGENT: &str = "trawler/0.1 (training-data collector)";

/// Page size used when resolving recent author context.
const CONTEXT_PAGE_SIZE: u32 = 25;

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RedditClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (local fixture server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One page of a subreddit's comment listing. Pass the `after` cursor from
    /// the previous page to continue; `None` starts from the newest comments.
    pub async fn subreddit_comments(
        &self,
        subreddit: &str,
        after: Option<&str>,
    ) -> Result<CommentPage> {
        let url = format!("{}/r/{}/comments.json", self.base_url, subreddit);
        self.comment_listing(&url, after).await
    }

    /// One page of an author's comment history, paginated the same way.
    pub async fn author_comments(&self, author: &str, after: Option<&str>) -> Result<CommentPage> {
        let url = format!("{}/user/{}/comments.json", self.base_url, author);
        self.comment_listing(&url, after).await
    }

    /// Account-level profile attributes for one author.
    pub async fn author_about(&self, author: &str) -> Result<About> {
        let url = format!("{}/user/{}/about.json", self.base_url, author);
        tracing::debug!(author, "reddit: fetching profile");

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: Envelope<About> = resp.json().await?;
        Ok(envelope.data)
    }

    /// Resolve recent context for an author: scan the most recent page
    /// (≤ 25 items) and return the comments posted after `target_utc`,
    /// oldest first, capped at `max`.
    pub async fn recent_comments_after(
        &self,
        author: &str,
        target_utc: f64,
        max: usize,
    ) -> Result<Vec<Comment>> {
        let url = format!(
            "{}/user/{}/comments.json?limit={}",
            self.base_url, author, CONTEXT_PAGE_SIZE
        );
        let page = self.comment_listing(&url, None).await?;
        Ok(select_recent(page.comments, target_utc, max))
    }

    async fn comment_listing(&self, url: &str, after: Option<&str>) -> Result<CommentPage> {
        let mut request = self.client.get(url);
        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }

        tracing::debug!(url, after, "reddit: fetching comment listing");

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: Envelope<ListingData> = resp.json().await?;
        let comments = envelope
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect();

        Ok(CommentPage {
            comments,
            after: envelope.data.after,
        })
    }
}

/// Listings are newest-first; keep the items after `target_utc`, oldest first,
/// at most `max`.
fn select_recent(comments: Vec<Comment>, target_utc: f64, max: usize) -> Vec<Comment> {
    let mut recent: Vec<Comment> = comments
        .into_iter()
        .filter(|c| c.created_utc > target_utc)
        .collect();
    recent.reverse();
    recent.truncate(max);
    recent
}
