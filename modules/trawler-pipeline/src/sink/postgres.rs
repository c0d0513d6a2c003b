//! Postgres sink: one normalized row per enriched record, plus the JSON-blob
//! variant that stores a whole scraped profile as a single document.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use trawler_common::{Classification, EnrichedComment, TrawlerError};

use crate::relabel::LabelWriter;

use super::{ProfileStore, RecordSink};

const CREATE_TABLES: &str = r#"
CREATE EXTENSION IF NOT EXISTS "pgcrypto";

CREATE TABLE IF NOT EXISTS comments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    comment_id text,
    author text,
    body text,
    created_utc double precision,
    link_id text,
    link_title text,
    subreddit text,
    subreddit_id text,
    subreddit_type text,
    score bigint,
    ups bigint,
    downs bigint,
    gilded bigint,
    controversiality bigint,
    num_comments bigint,
    num_reports bigint,
    over_18 boolean,
    edited double precision,
    is_submitter boolean,
    no_follow boolean,
    archived boolean,
    quarantine boolean,
    likes boolean,
    banned_by text,
    banned_at_utc double precision,
    approved_at_utc double precision,
    mod_reason_by text,
    mod_reason_title text,
    removal_reason text,
    author_flair_type text,
    author_flair_template_id text,
    author_link_karma bigint,
    author_comment_karma bigint,
    author_created_at double precision,
    author_verified boolean,
    author_has_verified_email boolean,
    classification text,
    recent_comments jsonb
);

CREATE TABLE IF NOT EXISTS profiles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    data JSON
);
"#;

pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    /// Connect to Postgres. Fails fast: an unreachable database is a startup
    /// error, not something the running loop should encounter.
    pub async fn connect(database_url: &str) -> Result<Self, TrawlerError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await
            .map_err(|e| TrawlerError::Config(format!("cannot reach Postgres: {e}")))?;

        info!("Connected to Postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the comments and profiles tables if absent.
    pub async fn ensure_schema(&self) -> Result<(), TrawlerError> {
        sqlx::raw_sql(CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(|e| TrawlerError::Database(format!("schema creation failed: {e}")))?;
        Ok(())
    }

    /// JSON-blob variant: the whole scraped profile as one document.
    pub async fn insert_profile_document(&self, document: &serde_json::Value) -> Result<()> {
        sqlx::query("INSERT INTO profiles(data) VALUES($1)")
            .bind(document)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LabelWriter for PostgresSink {
    async fn apply_label(&self, author: &str, label: Classification) -> Result<u64> {
        let result = sqlx::query("UPDATE comments SET classification = $1 WHERE author = $2")
            .bind(label.as_str())
            .bind(author)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileStore for PostgresSink {
    async fn store_profile(&self, document: &serde_json::Value) -> Result<()> {
        self.insert_profile_document(document).await
    }
}

#[async_trait]
impl RecordSink for PostgresSink {
    async fn deliver(&self, record: &EnrichedComment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                comment_id, author, body, created_utc, link_id, link_title,
                subreddit, subreddit_id, subreddit_type, score, ups, downs,
                gilded, controversiality, num_comments, num_reports, over_18,
                edited, is_submitter, no_follow, archived, quarantine, likes,
                banned_by, banned_at_utc, approved_at_utc, mod_reason_by,
                mod_reason_title, removal_reason, author_flair_type,
                author_flair_template_id, author_link_karma,
                author_comment_karma, author_created_at, author_verified,
                author_has_verified_email, classification, recent_comments
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28, $29, $30, $31, $32, $33, $34, $35, $36, $37, $38
            )
            "#,
        )
        .bind(&record.id)
        .bind(&record.author)
        .bind(&record.body)
        .bind(record.created_utc)
        .bind(&record.link_id)
        .bind(&record.link_title)
        .bind(&record.subreddit)
        .bind(&record.subreddit_id)
        .bind(&record.subreddit_type)
        .bind(record.score)
        .bind(record.ups)
        .bind(record.downs)
        .bind(record.gilded)
        .bind(record.controversiality)
        .bind(record.num_comments)
        .bind(record.num_reports)
        .bind(record.over_18)
        .bind(record.edited)
        .bind(record.is_submitter)
        .bind(record.no_follow)
        .bind(record.archived)
        .bind(record.quarantine)
        .bind(record.likes)
        .bind(&record.banned_by)
        .bind(record.banned_at_utc)
        .bind(record.approved_at_utc)
        .bind(&record.mod_reason_by)
        .bind(&record.mod_reason_title)
        .bind(&record.removal_reason)
        .bind(&record.author_flair_type)
        .bind(&record.author_flair_template_id)
        .bind(record.author_link_karma)
        .bind(record.author_comment_karma)
        .bind(record.author_created_at)
        .bind(record.author_verified)
        .bind(record.author_has_verified_email)
        .bind(record.classification.map(|c| c.as_str()))
        .bind(serde_json::to_value(&record.recent_comments)?)
        .execute(&self.pool)
        .await?;

        debug!(comment_id = %record.id, author = %record.author, "Inserted comment row");
        Ok(())
    }
}
