//! Labeled-author backfill: a finite pass over every author in the label
//! file, scraping their profile and full comment history into Postgres.
//!
//! Each author's history flows through the same pager (pacing, capped
//! backoff, explicit cursor loop) and the same backpressure queue as the
//! live pipeline. On top of the normalized rows, the whole scraped profile
//! is stored once as a JSON document.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};

use trawler_common::{Classification, EnrichedComment, LabelSet};

use crate::controller::check_cancelled_flag;
use crate::enrich::enrich;
use crate::pager::{PageOutcome, PageTarget, Pager, PassMode};
use crate::queue::BackpressureQueue;
use crate::sink::{ProfileStore, RecordSink};
use crate::source::CommentSource;
use crate::stats::TrawlStats;
use crate::window::SlidingWindowCache;

#[derive(Debug, Clone)]
pub struct BackfillSettings {
    pub pacing: Duration,
    pub queue_high_water: usize,
    pub queue_resume_at: usize,
    pub window_size: usize,
}

pub struct Backfill {
    source: Arc<dyn CommentSource>,
    sink: Arc<dyn RecordSink>,
    profiles: Arc<dyn ProfileStore>,
    labels: LabelSet,
    settings: BackfillSettings,
    cancelled: Arc<AtomicBool>,
}

impl Backfill {
    pub fn new(
        source: Arc<dyn CommentSource>,
        sink: Arc<dyn RecordSink>,
        profiles: Arc<dyn ProfileStore>,
        labels: LabelSet,
        settings: BackfillSettings,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            sink,
            profiles,
            labels,
            settings,
            cancelled,
        }
    }

    pub async fn run(self) -> Result<TrawlStats> {
        let authors: Vec<(String, Classification)> = self
            .labels
            .authors()
            .map(|(a, c)| (a.to_string(), c))
            .collect();
        info!(authors = authors.len(), "Backfill starting");

        let mut queue = BackpressureQueue::start(
            self.sink.clone(),
            self.settings.queue_high_water,
            self.settings.queue_resume_at,
        );
        let mut windows = SlidingWindowCache::new(self.settings.window_size);
        let mut stats = TrawlStats::default();

        let outcome = async {
            for (author, label) in &authors {
                check_cancelled_flag(&self.cancelled)?;
                self.scrape_author(author, *label, &queue, &mut windows, &mut stats)
                    .await?;
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;

        let (published, failed) = queue.close_and_join().await;
        stats.records_published = published;
        stats.publish_failures = failed;
        stats.authors_seen = authors.len() as u64;

        outcome?;
        info!("{stats}");
        Ok(stats)
    }

    /// Scrape one author. Fetch and enrichment failures skip the author or
    /// the record, never the pass; only cancellation propagates out.
    async fn scrape_author(
        &self,
        author: &str,
        label: Classification,
        queue: &BackpressureQueue,
        windows: &mut SlidingWindowCache,
        stats: &mut TrawlStats,
    ) -> Result<()> {
        let profile = match self.source.author_about(author).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(author, error = %e, "Profile fetch failed, skipping author");
                stats.records_skipped += 1;
                return Ok(());
            }
        };

        let mut pager = Pager::new(
            self.source.clone(),
            PageTarget::Author(author.to_string()),
            self.settings.pacing,
            PassMode::SinglePass,
        );

        let mut document_comments: Vec<EnrichedComment> = Vec::new();

        loop {
            check_cancelled_flag(&self.cancelled)?;
            let raw = match pager.next_page().await {
                Ok(PageOutcome::Page(records)) => {
                    stats.pages_fetched += 1;
                    records
                }
                Ok(PageOutcome::Retry) => {
                    stats.fetch_failures += 1;
                    continue;
                }
                Ok(PageOutcome::Exhausted) => break,
                Err(e) => {
                    warn!(author, error = %e, "History fetch gave up, moving to next author");
                    stats.fetch_failures += 1;
                    break;
                }
            };

            stats.records_seen += raw.len() as u64;
            for comment in raw {
                check_cancelled_flag(&self.cancelled)?;
                let window = windows.snapshot(author);
                let enriched = match enrich(&comment, &profile, window, Some(label)) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(author, error = %e, "Enrichment failed, dropping record");
                        stats.records_skipped += 1;
                        continue;
                    }
                };
                queue.push(enriched.clone());
                windows.append(author, &enriched);
                document_comments.push(enriched.without_history());
                stats.records_enriched += 1;
            }

            if queue.is_over_high_water() {
                stats.throttle_events += 1;
                info!(depth = queue.depth(), "Queue over high-water mark, pausing backfill");
                queue.drained().await;
            }
        }

        let comment_count = document_comments.len();
        let document = json!({
            "name": profile.name,
            "link_karma": profile.link_karma,
            "comment_karma": profile.comment_karma,
            "created_utc": profile.created_utc,
            "verified": profile.verified,
            "has_verified_email": profile.has_verified_email,
            "classification": label.as_str(),
            "comments": document_comments,
        });
        if let Err(e) = self.profiles.store_profile(&document).await {
            warn!(author, error = %e, "Profile document insert failed");
        }

        info!(
            author,
            comments = comment_count,
            label = label.as_str(),
            "Author backfilled"
        );
        Ok(())
    }
}
