//! Downstream sinks behind one trait so the queue worker, the controller,
//! and the tests all treat delivery the same way.

pub mod kafka;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use trawler_common::EnrichedComment;

pub use kafka::KafkaSink;
pub use postgres::PostgresSink;

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Deliver one enriched record. Errors are per-record: the caller logs
    /// and drops, it never aborts the stream.
    async fn deliver(&self, record: &EnrichedComment) -> Result<()>;
}

/// JSON-document storage for whole scraped profiles (backfill pass).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn store_profile(&self, document: &serde_json::Value) -> Result<()>;
}
