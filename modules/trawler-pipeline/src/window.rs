//! Per-author rolling history of recently emitted records.
//!
//! Windows are created lazily on first sighting and live only in memory;
//! a process restart legitimately starts empty. A record joins its own
//! author's window only after it has been enriched and enqueued, so the
//! snapshot handed to the enricher never contains the record being built.

use std::collections::{HashMap, VecDeque};

use trawler_common::EnrichedComment;

pub struct SlidingWindowCache {
    capacity: usize,
    windows: HashMap<String, VecDeque<EnrichedComment>>,
}

impl SlidingWindowCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            windows: HashMap::new(),
        }
    }

    /// Owned copy of the author's window, oldest first. Later appends never
    /// mutate a snapshot already handed to the queue.
    pub fn snapshot(&self, author: &str) -> Vec<EnrichedComment> {
        self.windows
            .get(author)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append to the end of the author's window, evicting from the front once
    /// full. Entries are stored without their own nested history.
    pub fn append(&mut self, author: &str, record: &EnrichedComment) {
        if self.capacity == 0 {
            return;
        }
        let window = self.windows.entry(author.to_string()).or_default();
        while window.len() >= self.capacity {
            window.pop_front();
        }
        window.push_back(record.without_history());
    }

    pub fn len(&self, author: &str) -> usize {
        self.windows.get(author).map(|w| w.len()).unwrap_or(0)
    }
}
