//! Orchestrates the fetch → enrich → enqueue → drain cycle.
//!
//! The controller owns every piece of mutable state — cursor (via the
//! pager), windows, profile cache, stats — and runs them on one logical
//! task, so no locks guard them. Records within a batch are processed
//! strictly sequentially: author windows and sink ordering both depend on
//! it. The queue worker is the only concurrent flow, and the depth counter
//! is the only state it shares.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};
use uuid::Uuid;

use trawler_common::LabelSet;

use crate::enrich::enrich;
use crate::pager::{PageOutcome, PageTarget, Pager, PassMode};
use crate::profiles::ProfileResolver;
use crate::queue::BackpressureQueue;
use crate::sink::RecordSink;
use crate::source::CommentSource;
use crate::stats::TrawlStats;
use crate::window::SlidingWindowCache;

pub(crate) fn check_cancelled_flag(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::Relaxed) {
        info!("Trawl pass cancelled");
        anyhow::bail!("Trawl pass cancelled");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Fetching,
    Enriching,
    Enqueueing,
    Throttled,
    Done,
}

/// Knobs for one trawl pass.
#[derive(Debug, Clone)]
pub struct TrawlSettings {
    pub subreddit: String,
    pub mode: PassMode,
    pub pacing: Duration,
    pub queue_high_water: usize,
    pub queue_resume_at: usize,
    pub window_size: usize,
}

pub struct PipelineController {
    pager: Pager,
    mode: PassMode,
    profiles: ProfileResolver,
    windows: SlidingWindowCache,
    labels: LabelSet,
    queue: BackpressureQueue,
    cancelled: Arc<AtomicBool>,
    stats: TrawlStats,
    state: ControllerState,
    run_id: Uuid,
}

impl PipelineController {
    pub fn new(
        source: Arc<dyn CommentSource>,
        sink: Arc<dyn RecordSink>,
        labels: LabelSet,
        settings: TrawlSettings,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        let pager = Pager::new(
            source.clone(),
            PageTarget::Subreddit(settings.subreddit.clone()),
            settings.pacing,
            settings.mode,
        );
        let queue = BackpressureQueue::start(
            sink,
            settings.queue_high_water,
            settings.queue_resume_at,
        );
        Self {
            pager,
            mode: settings.mode,
            profiles: ProfileResolver::new(source),
            windows: SlidingWindowCache::new(settings.window_size),
            labels,
            queue,
            cancelled,
            stats: TrawlStats::default(),
            state: ControllerState::Idle,
            run_id: Uuid::new_v4(),
        }
    }

    /// Run the pass to completion (single pass) or until cancelled
    /// (continuous). The queue is always flushed and joined before stats are
    /// reported, even on error.
    pub async fn run(mut self) -> Result<TrawlStats> {
        info!(run_id = %self.run_id, mode = ?self.mode, "Trawl pass starting");

        let outcome = self.drive().await;

        let (published, failed) = self.queue.close_and_join().await;
        self.stats.records_published = published;
        self.stats.publish_failures = failed;
        self.stats.authors_seen = self.profiles.cached_count() as u64;

        outcome?;
        self.set_state(ControllerState::Done);
        info!(run_id = %self.run_id, "{}", self.stats);
        Ok(self.stats)
    }

    async fn drive(&mut self) -> Result<()> {
        loop {
            check_cancelled_flag(&self.cancelled)?;
            self.set_state(ControllerState::Fetching);

            let outcome = match self.pager.next_page().await {
                Ok(outcome) => outcome,
                Err(e) => match self.mode {
                    // Continuous streams degrade to a fresh retry cycle; the
                    // alarm is the log line.
                    PassMode::Continuous => {
                        tracing::error!(error = %e, "Fetch attempts exhausted, restarting cycle");
                        self.stats.fetch_failures += 1;
                        continue;
                    }
                    PassMode::SinglePass => return Err(e.into()),
                },
            };

            let raw = match outcome {
                PageOutcome::Page(records) => {
                    self.stats.pages_fetched += 1;
                    records
                }
                PageOutcome::Retry => {
                    self.stats.fetch_failures += 1;
                    continue;
                }
                PageOutcome::Exhausted => {
                    info!("Source exhausted, finishing pass");
                    return Ok(());
                }
            };

            self.stats.records_seen += raw.len() as u64;
            self.process_batch(raw).await?;

            if self.queue.is_over_high_water() {
                self.set_state(ControllerState::Throttled);
                self.stats.throttle_events += 1;
                info!(depth = self.queue.depth(), "Queue over high-water mark, pausing production");
                self.queue.drained().await;
                info!("Drain received, resuming");
            }
        }
    }

    /// Enrich and enqueue one page of raw records, strictly in order. Every
    /// failure here is per-record: skip it, keep the batch.
    async fn process_batch(&mut self, raw: Vec<reddit_client::Comment>) -> Result<()> {
        self.set_state(ControllerState::Enriching);
        for comment in raw {
            check_cancelled_flag(&self.cancelled)?;

            if comment.author.is_empty() || comment.id.is_empty() {
                debug!("Skipping record with missing identity fields");
                self.stats.records_skipped += 1;
                continue;
            }

            let profile = match self.profiles.resolve(&comment.author).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(author = %comment.author, error = %e, "Profile fetch failed, skipping record");
                    self.stats.records_skipped += 1;
                    continue;
                }
            };

            let label = self.labels.get(&comment.author);
            let window = self.windows.snapshot(&comment.author);

            let enriched = match enrich(&comment, &profile, window, label) {
                Ok(record) => record,
                Err(e) => {
                    warn!(id = %comment.id, error = %e, "Enrichment failed, dropping record");
                    self.stats.records_skipped += 1;
                    continue;
                }
            };

            self.set_state(ControllerState::Enqueueing);
            self.queue.push(enriched.clone());
            // Only now does the record join its author's window; the snapshot
            // it carried never includes itself.
            self.windows.append(&comment.author, &enriched);
            self.stats.records_enriched += 1;
            self.set_state(ControllerState::Enriching);
        }
        Ok(())
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    fn set_state(&mut self, next: ControllerState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "State transition");
            self.state = next;
        }
    }
}
