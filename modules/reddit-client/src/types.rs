use serde::{Deserialize, Deserializer, Serialize};

// --- Listing envelope types ---

/// Outer wrapper every listing endpoint returns: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// One page of a paginated listing. `after` is the cursor for the next page;
/// `null` means the sequence is exhausted.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Envelope<Comment>>,
}

/// A single page of comments plus the cursor to the next one.
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub after: Option<String>,
}

// --- Comment ---

/// A comment as the listing endpoints return it. Fields not in this whitelist
/// are dropped at deserialization; everything here survives into training data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: String,
    pub body: Option<String>,
    #[serde(default)]
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
    /// The API sends `false` for unedited comments and an epoch float otherwise.
    #[serde(default, deserialize_with = "edited_timestamp")]
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
}

/// `edited` is `false | <epoch float>`; normalize false/absent to 0.
fn edited_timestamp<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

// --- Author profile ---

/// Account-level attributes from the about endpoint: `{"kind": "t2", "data": {...}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct About {
    #[serde(default)]
    pub name: String,
    pub link_karma: Option<i64>,
    pub comment_karma: Option<i64>,
    #[serde(default)]
    pub created_utc: f64,
    pub verified: Option<bool>,
    pub has_verified_email: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edited_false_becomes_zero() {
        let c: Comment = serde_json::from_str(r#"{"id":"abc","author":"x","edited":false}"#)
            .expect("comment should parse");
        assert_eq!(c.edited, 0.0);
    }

    #[test]
    fn edited_timestamp_preserved() {
        let c: Comment =
            serde_json::from_str(r#"{"id":"abc","author":"x","edited":1540511500.0}"#)
                .expect("comment should parse");
        assert_eq!(c.edited, 1540511500.0);
    }

    #[test]
    fn unknown_fields_dropped() {
        let c: Comment = serde_json::from_str(
            r#"{"id":"abc","author":"x","body":"hi","body_html":"<p>hi</p>","gildings":{}}"#,
        )
        .expect("comment should parse");
        assert_eq!(c.body.as_deref(), Some("hi"));
    }
}
