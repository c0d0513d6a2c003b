//! Retroactive relabeling: stamp the current label file onto rows that were
//! persisted before their author was classified.
//!
//! Ingest-time labeling only covers authors already in the file; when the
//! file grows, this pass catches the history up without re-scraping it.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use trawler_common::{Classification, LabelSet};

/// Storage that can stamp a classification onto an author's persisted rows.
#[async_trait]
pub trait LabelWriter: Send + Sync {
    /// Returns the number of rows updated.
    async fn apply_label(&self, author: &str, label: Classification) -> Result<u64>;
}

/// Apply every label in the set. A failure on one author is logged and the
/// rest still apply. Returns (authors updated, rows touched).
pub async fn relabel_all(store: &dyn LabelWriter, labels: &LabelSet) -> (u64, u64) {
    let mut authors = 0u64;
    let mut rows = 0u64;
    for (author, label) in labels.authors() {
        match store.apply_label(author, label).await {
            Ok(count) => {
                authors += 1;
                rows += count;
                info!(author, label = label.as_str(), rows = count, "Relabeled author");
            }
            Err(e) => {
                warn!(author, error = %e, "Relabel failed for author");
            }
        }
    }
    (authors, rows)
}
