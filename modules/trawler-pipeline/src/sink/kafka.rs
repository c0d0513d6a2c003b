//! Kafka sink: one message per enriched record.
//!
//! Partition is fixed at 0 — no partitioning strategy is in play, and the
//! single-partition client preserves enqueue order. The key is
//! `<parent>.<timestamp>` so a compacted topic keeps the latest record per
//! thread position.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::client::ClientBuilder;
use rskafka::record::Record;
use tracing::{debug, info};

use trawler_common::{EnrichedComment, TrawlerError};

use super::RecordSink;

const PARTITION: i32 = 0;

pub struct KafkaSink {
    partition: PartitionClient,
    topic: String,
}

impl KafkaSink {
    /// Connect to the cluster and bind the topic's partition 0. Fails fast:
    /// an unreachable broker or missing topic is a startup error.
    pub async fn connect(brokers: &str, topic: &str) -> Result<Self, TrawlerError> {
        let bootstrap: Vec<String> = brokers.split(',').map(|b| b.trim().to_string()).collect();

        let client = ClientBuilder::new(bootstrap)
            .build()
            .await
            .map_err(|e| TrawlerError::Config(format!("cannot reach Kafka at {brokers}: {e}")))?;

        let partition = client
            .partition_client(topic, PARTITION, UnknownTopicHandling::Error)
            .await
            .map_err(|e| TrawlerError::Config(format!("topic {topic} unavailable: {e}")))?;

        info!(brokers, topic, "Connected to Kafka");

        Ok(Self {
            partition,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn deliver(&self, record: &EnrichedComment) -> Result<()> {
        let message = Record {
            key: Some(record.message_key().into_bytes()),
            value: Some(serde_json::to_vec(record)?),
            headers: BTreeMap::new(),
            timestamp: chrono::Utc::now(),
        };

        let offsets = self
            .partition
            .produce(vec![message], Compression::NoCompression)
            .await
            .map_err(|e| {
                TrawlerError::Publish(format!("produce to {} failed: {e}", self.topic))
            })?;

        debug!(
            topic = %self.topic,
            key = %record.message_key(),
            offset = offsets.first().copied().unwrap_or(-1),
            "Published record"
        );
        Ok(())
    }
}
