//! Builds the canonical output record from a raw comment, its author's
//! profile, the author's window snapshot, and the offline label.
//!
//! `enrich` is a pure function: identical inputs produce a byte-identical
//! serialized record. Downstream consumers assume single-line, quote-safe
//! text fields, so the body is sanitized here and nowhere else.

use reddit_client::{About, Comment};
use trawler_common::{Classification, EnrichedComment, TrawlerError};

/// Hard ceiling on body length, in characters.
pub const MAX_BODY_LEN: usize = 10_000;

pub fn enrich(
    raw: &Comment,
    profile: &About,
    window: Vec<EnrichedComment>,
    label: Option<Classification>,
) -> Result<EnrichedComment, TrawlerError> {
    if raw.author.is_empty() {
        return Err(TrawlerError::MalformedRecord(format!(
            "comment {} has no author",
            raw.id
        )));
    }
    if raw.id.is_empty() {
        return Err(TrawlerError::MalformedRecord(
            "comment has no id".to_string(),
        ));
    }

    Ok(EnrichedComment {
        author_link_karma: profile.link_karma,
        author_comment_karma: profile.comment_karma,
        author_created_at: profile.created_utc,
        author_verified: profile.verified,
        author_has_verified_email: profile.has_verified_email,
        id: raw.id.clone(),
        author: raw.author.clone(),
        body: sanitize_body(raw.body.as_deref()),
        created_utc: raw.created_utc,
        link_id: raw.link_id.clone(),
        link_title: raw.link_title.clone(),
        subreddit: raw.subreddit.clone(),
        subreddit_id: raw.subreddit_id.clone(),
        subreddit_type: raw.subreddit_type.clone(),
        score: raw.score,
        ups: raw.ups,
        downs: raw.downs,
        gilded: raw.gilded,
        controversiality: raw.controversiality,
        num_comments: raw.num_comments,
        num_reports: raw.num_reports,
        over_18: raw.over_18,
        edited: raw.edited,
        is_submitter: raw.is_submitter,
        no_follow: raw.no_follow,
        archived: raw.archived,
        quarantine: raw.quarantine,
        likes: raw.likes,
        banned_by: raw.banned_by.clone(),
        banned_at_utc: raw.banned_at_utc,
        approved_at_utc: raw.approved_at_utc,
        mod_reason_by: raw.mod_reason_by.clone(),
        mod_reason_title: raw.mod_reason_title.clone(),
        removal_reason: raw.removal_reason.clone(),
        author_flair_type: raw.author_flair_type.clone(),
        author_flair_template_id: raw.author_flair_template_id.clone(),
        classification: label,
        recent_comments: window,
    })
}

/// Single line, no quotes, bounded length. Newlines become spaces so word
/// boundaries survive.
fn sanitize_body(body: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };
    body.chars()
        .filter_map(|c| match c {
            '"' => None,
            '\n' | '\r' => Some(' '),
            other => Some(other),
        })
        .take(MAX_BODY_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> Comment {
        Comment {
            id: "e5qe8nb".into(),
            author: "a_user".into(),
            body: Some("plain text".into()),
            created_utc: 1540511500.0,
            link_id: Some("t3_9r0e2p".into()),
            score: Some(4),
            ..Default::default()
        }
    }

    fn profile() -> About {
        About {
            name: "a_user".into(),
            link_karma: Some(1200),
            comment_karma: Some(4000),
            created_utc: 1380000000.0,
            verified: Some(true),
            has_verified_email: Some(false),
        }
    }

    #[test]
    fn identical_inputs_yield_identical_bytes() {
        let a = enrich(&raw(), &profile(), vec![], Some(Classification::Bot)).unwrap();
        let b = enrich(&raw(), &profile(), vec![], Some(Classification::Bot)).unwrap();
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn merges_profile_fields() {
        let rec = enrich(&raw(), &profile(), vec![], None).unwrap();
        assert_eq!(rec.author_link_karma, Some(1200));
        assert_eq!(rec.author_comment_karma, Some(4000));
        assert_eq!(rec.author_created_at, 1380000000.0);
        assert_eq!(rec.author_verified, Some(true));
    }

    #[test]
    fn missing_label_stays_unknown() {
        let rec = enrich(&raw(), &profile(), vec![], None).unwrap();
        assert_eq!(rec.classification, None);
    }

    #[test]
    fn body_quotes_and_newlines_removed() {
        let mut comment = raw();
        comment.body = Some("he said \"hello\"\nand left\r\n".into());
        let rec = enrich(&comment, &profile(), vec![], None).unwrap();
        assert!(!rec.body.contains('"'));
        assert!(!rec.body.contains('\n'));
        assert!(!rec.body.contains('\r'));
        assert_eq!(rec.body, "he said hello and left  ");
    }

    #[test]
    fn body_truncated_to_ceiling() {
        let mut comment = raw();
        comment.body = Some("x".repeat(MAX_BODY_LEN + 50));
        let rec = enrich(&comment, &profile(), vec![], None).unwrap();
        assert_eq!(rec.body.chars().count(), MAX_BODY_LEN);
    }

    #[test]
    fn absent_body_becomes_empty() {
        let mut comment = raw();
        comment.body = None;
        let rec = enrich(&comment, &profile(), vec![], None).unwrap();
        assert_eq!(rec.body, "");
    }

    #[test]
    fn missing_author_is_malformed() {
        let mut comment = raw();
        comment.author = String::new();
        let err = enrich(&comment, &profile(), vec![], None).unwrap_err();
        assert!(matches!(err, TrawlerError::MalformedRecord(_)));
    }

    #[test]
    fn missing_id_is_malformed() {
        let mut comment = raw();
        comment.id = String::new();
        let err = enrich(&comment, &profile(), vec![], None).unwrap_err();
        assert!(matches!(err, TrawlerError::MalformedRecord(_)));
    }

    #[test]
    fn window_snapshot_carried_through() {
        let first = enrich(&raw(), &profile(), vec![], None).unwrap();
        let rec = enrich(&raw(), &profile(), vec![first.clone()], None).unwrap();
        assert_eq!(rec.recent_comments, vec![first]);
    }
}
