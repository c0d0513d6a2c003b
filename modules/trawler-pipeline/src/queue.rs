//! Bounded-by-convention work queue decoupling production (fetch + enrich)
//! from consumption (sink delivery).
//!
//! One worker task drains the channel, so publish order to the sink equals
//! enqueue order — required whenever the downstream participates in
//! positional pagination. Depth is the only state shared between producer
//! and consumer; it lives in an atomic counter.
//!
//! The drain event is an explicit awaited signal, not a reassigned callback:
//! the controller parks in `drained()` and the worker fires a `Notify` at
//! most once per threshold crossing (the `paused` flag arbitrates).
//!
//! Delivery is at-least-once to the worker: a sink failure on one item is
//! logged and the item dropped; subsequent items keep flowing.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use trawler_common::EnrichedComment;

use crate::sink::RecordSink;

pub struct BackpressureQueue {
    tx: Option<mpsc::UnboundedSender<EnrichedComment>>,
    worker: Option<JoinHandle<()>>,
    depth: Arc<AtomicUsize>,
    paused: Arc<AtomicBool>,
    drain: Arc<Notify>,
    delivered: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    high_water: usize,
    resume_at: usize,
}

impl BackpressureQueue {
    /// Spawn the worker and return the producer handle. `resume_at` must be
    /// below `high_water`; zero means full drain.
    pub fn start(sink: Arc<dyn RecordSink>, high_water: usize, resume_at: usize) -> Self {
        debug_assert!(resume_at < high_water.max(1));

        let (tx, mut rx) = mpsc::unbounded_channel::<EnrichedComment>();
        let depth = Arc::new(AtomicUsize::new(0));
        let paused = Arc::new(AtomicBool::new(false));
        let drain = Arc::new(Notify::new());
        let delivered = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicU64::new(0));

        let worker = {
            let depth = depth.clone();
            let paused = paused.clone();
            let drain = drain.clone();
            let delivered = delivered.clone();
            let failed = failed.clone();
            tokio::spawn(async move {
                while let Some(record) = rx.recv().await {
                    match sink.deliver(&record).await {
                        Ok(()) => {
                            delivered.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => {
                            // No in-queue retry: log, drop, keep draining.
                            warn!(id = %record.id, error = %e, "Sink delivery failed, dropping record");
                            failed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                    let remaining = depth.fetch_sub(1, Ordering::SeqCst) - 1;
                    if remaining <= resume_at
                        && paused
                            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                    {
                        debug!(remaining, "Queue drained to resume threshold");
                        drain.notify_one();
                    }
                }
            })
        };

        Self {
            tx: Some(tx),
            worker: Some(worker),
            depth,
            paused,
            drain,
            delivered,
            failed,
            high_water,
            resume_at,
        }
    }

    pub fn push(&self, record: EnrichedComment) {
        self.depth.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = &self.tx {
            if tx.send(record).is_err() {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                warn!("Queue worker gone, record dropped");
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_over_high_water(&self) -> bool {
        self.depth() > self.high_water
    }

    /// Park until the worker drains the queue to the resume threshold.
    /// Returns immediately if it is already there. The depth is re-checked
    /// after every wakeup: a permit left over from a crossing that raced the
    /// early-return path must not count as a drain.
    pub async fn drained(&self) {
        loop {
            self.paused.store(true, Ordering::SeqCst);
            if self.depth() <= self.resume_at {
                self.paused.store(false, Ordering::SeqCst);
                return;
            }
            self.drain.notified().await;
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    /// Close the producer side, let the worker flush everything still queued,
    /// and return (delivered, failed) totals.
    pub async fn close_and_join(&mut self) -> (u64, u64) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "Queue worker panicked");
            }
        }
        (self.delivered(), self.failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Sink that records deliveries; optionally gated on a semaphore and
    /// failing on scripted record ids.
    struct TestSink {
        seen: Mutex<Vec<String>>,
        gate: Option<Semaphore>,
        fail_ids: Vec<String>,
    }

    impl TestSink {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                gate: None,
                fail_ids: Vec::new(),
            }
        }

        fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl RecordSink for TestSink {
        async fn deliver(&self, record: &EnrichedComment) -> Result<()> {
            if let Some(gate) = &self.gate {
                let permit = gate.acquire().await?;
                permit.forget();
            }
            if self.fail_ids.contains(&record.id) {
                anyhow::bail!("scripted failure for {}", record.id);
            }
            self.seen.lock().unwrap().push(record.id.clone());
            Ok(())
        }
    }

    fn record(id: &str) -> EnrichedComment {
        EnrichedComment {
            id: id.to_string(),
            author: "poster".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn delivers_in_enqueue_order() {
        let sink = Arc::new(TestSink::new());
        let mut queue = BackpressureQueue::start(sink.clone(), 10, 0);
        for i in 0..5 {
            queue.push(record(&format!("c{i}")));
        }
        let (delivered, failed) = queue.close_and_join().await;
        assert_eq!(delivered, 5);
        assert_eq!(failed, 0);
        let seen = sink.seen.lock().unwrap();
        assert_eq!(*seen, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[tokio::test]
    async fn failed_item_does_not_block_the_rest() {
        let sink = Arc::new(TestSink {
            fail_ids: vec!["c1".to_string()],
            ..TestSink::new()
        });
        let mut queue = BackpressureQueue::start(sink.clone(), 10, 0);
        for i in 0..3 {
            queue.push(record(&format!("c{i}")));
        }
        let (delivered, failed) = queue.close_and_join().await;
        assert_eq!(delivered, 2);
        assert_eq!(failed, 1);
        let seen = sink.seen.lock().unwrap();
        assert_eq!(*seen, vec!["c0", "c2"]);
    }

    #[tokio::test]
    async fn depth_tracks_pushes_while_worker_is_blocked() {
        let sink = Arc::new(TestSink::gated());
        let queue = BackpressureQueue::start(sink.clone(), 5, 0);
        for i in 0..6 {
            queue.push(record(&format!("c{i}")));
        }
        assert_eq!(queue.depth(), 6);
        assert!(queue.is_over_high_water());
    }

    #[tokio::test]
    async fn drain_fires_after_full_drain() {
        let sink = Arc::new(TestSink::gated());
        let mut queue = BackpressureQueue::start(sink.clone(), 5, 0);
        for i in 0..6 {
            queue.push(record(&format!("c{i}")));
        }
        assert!(queue.is_over_high_water());

        sink.gate.as_ref().unwrap().add_permits(6);
        queue.drained().await;
        assert_eq!(queue.depth(), 0);

        let (delivered, _) = queue.close_and_join().await;
        assert_eq!(delivered, 6);
    }

    #[tokio::test]
    async fn drained_returns_immediately_when_already_below_resume() {
        let sink = Arc::new(TestSink::new());
        let mut queue = BackpressureQueue::start(sink.clone(), 5, 0);
        queue.push(record("c0"));
        let _ = queue.close_and_join().await;
        // Worker already drained everything; this must not hang.
        queue.drained().await;
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn stale_permit_does_not_count_as_drain() {
        let sink = Arc::new(TestSink::gated());
        let mut queue = BackpressureQueue::start(sink.clone(), 5, 0);

        // A permit can be left stored when a resume crossing races the
        // early-return path in drained(); it must not satisfy a later wait.
        queue.drain.notify_one();

        for i in 0..6 {
            queue.push(record(&format!("c{i}")));
        }
        assert!(queue.is_over_high_water());

        let release = {
            let sink = sink.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                sink.gate.as_ref().unwrap().add_permits(6);
            })
        };

        queue.drained().await;
        assert_eq!(queue.depth(), 0);

        release.await.unwrap();
        let (delivered, _) = queue.close_and_join().await;
        assert_eq!(delivered, 6);
    }

    #[tokio::test]
    async fn drain_fires_at_resume_threshold_not_before() {
        let sink = Arc::new(TestSink::gated());
        let mut queue = BackpressureQueue::start(sink.clone(), 3, 1);
        for i in 0..5 {
            queue.push(record(&format!("c{i}")));
        }

        // Release enough for the worker to reach the resume threshold (1).
        sink.gate.as_ref().unwrap().add_permits(4);
        queue.drained().await;
        assert!(queue.depth() <= 1);

        sink.gate.as_ref().unwrap().add_permits(1);
        let (delivered, _) = queue.close_and_join().await;
        assert_eq!(delivered, 5);
    }
}
