use serde::{Deserialize, Serialize};

/// Offline bot/troll label for an author. `None` everywhere a label is optional
/// means "not yet classified" — never to be conflated with a known human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Bot,
    Troll,
    Human,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Bot => "bot",
            Classification::Troll => "troll",
            Classification::Human => "human",
        }
    }
}

/// Canonical output record: whitelisted comment fields, author-level context,
/// the offline classification when one exists, and a snapshot of the author's
/// recent emitted records at enrichment time.
///
/// Immutable once constructed; this is the unit that flows through the
/// backpressure queue into the sinks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedComment {
    // Author context
    pub author_link_karma: Option<i64>,
    pub author_comment_karma: Option<i64>,
    pub author_created_at: f64,
    pub author_verified: Option<bool>,
    pub author_has_verified_email: Option<bool>,

    // Comment fields
    pub id: String,
    pub author: String,
    /// Sanitized: single-line, quote-free, bounded length.
    pub body: String,
    pub created_utc: f64,
    pub link_id: Option<String>,
    pub link_title: Option<String>,
    pub subreddit: Option<String>,
    pub subreddit_id: Option<String>,
    pub subreddit_type: Option<String>,
    pub score: Option<i64>,
    pub ups: Option<i64>,
    pub downs: Option<i64>,
    pub gilded: Option<i64>,
    pub controversiality: Option<i64>,
    pub num_comments: Option<i64>,
    pub num_reports: Option<i64>,
    pub over_18: Option<bool>,
    pub edited: f64,
    pub is_submitter: Option<bool>,
    pub no_follow: Option<bool>,
    pub archived: Option<bool>,
    pub quarantine: Option<bool>,
    pub likes: Option<bool>,
    pub banned_by: Option<String>,
    pub banned_at_utc: Option<f64>,
    pub approved_at_utc: Option<f64>,
    pub mod_reason_by: Option<String>,
    pub mod_reason_title: Option<String>,
    pub removal_reason: Option<String>,
    pub author_flair_type: Option<String>,
    pub author_flair_template_id: Option<String>,

    /// Offline label; `None` = not yet classified.
    pub classification: Option<Classification>,

    /// The author's window at enrichment time, oldest first. Entries carry no
    /// nested history of their own so record size stays bounded.
    pub recent_comments: Vec<EnrichedComment>,
}

impl EnrichedComment {
    /// Message key for the broker sink: `<parent>.<timestamp>`, which lets
    /// downstream compaction keep the latest record per thread position.
    pub fn message_key(&self) -> String {
        format!(
            "{}.{}",
            self.link_id.as_deref().unwrap_or("unknown"),
            self.created_utc as i64
        )
    }

    /// Copy with the window snapshot dropped; this is what goes into other
    /// records' windows.
    pub fn without_history(&self) -> EnrichedComment {
        let mut flat = self.clone();
        flat.recent_comments.clear();
        flat
    }
}
