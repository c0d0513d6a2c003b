//! Author profile resolution with a per-pass cache.
//!
//! Profiles are rarely-changing side input; one fetch per author per pass is
//! enough. Fetch failures are not cached, so a flaky author is retried the
//! next time one of their comments shows up.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use reddit_client::About;
use tracing::debug;

use crate::source::CommentSource;

pub struct ProfileResolver {
    source: Arc<dyn CommentSource>,
    cache: HashMap<String, About>,
}

impl ProfileResolver {
    pub fn new(source: Arc<dyn CommentSource>) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, author: &str) -> Result<About> {
        if let Some(profile) = self.cache.get(author) {
            return Ok(profile.clone());
        }
        let profile = self.source.author_about(author).await?;
        debug!(author, "Cached author profile");
        self.cache.insert(author.to_string(), profile.clone());
        Ok(profile)
    }

    /// Distinct authors successfully resolved this pass.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
