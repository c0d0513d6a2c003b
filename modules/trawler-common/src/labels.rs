//! Offline bot/troll labels, seeded once at startup from a delimited file.
//!
//! The file maps an author to TRUE/FALSE flags, one author per line:
//!
//! ```text
//! u/somebot,TRUE,FALSE
//! a_troll,FALSE,TRUE
//! regular_user,FALSE,FALSE
//! ```
//!
//! Column 2 is "is bot", column 3 is "is troll". Troll wins when both are set.
//! Authors absent from the file stay unclassified.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::TrawlerError;
use crate::types::Classification;

#[derive(Debug, Default, Clone)]
pub struct LabelSet {
    by_author: HashMap<String, Classification>,
}

impl LabelSet {
    /// Load labels from a delimited file. Lines that don't parse are skipped
    /// with a warning rather than failing the whole load.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrawlerError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| TrawlerError::Config(format!("cannot read {}: {e}", path.display())))?;

        let mut by_author = HashMap::new();
        for (lineno, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((author, label)) => {
                    by_author.insert(author, label);
                }
                None => {
                    tracing::warn!(line = lineno + 1, "Skipping unparseable label line");
                }
            }
        }

        tracing::info!(count = by_author.len(), path = %path.display(), "Loaded labels");
        Ok(Self { by_author })
    }

    pub fn get(&self, author: &str) -> Option<Classification> {
        self.by_author.get(author).copied()
    }

    pub fn authors(&self) -> impl Iterator<Item = (&str, Classification)> {
        self.by_author.iter().map(|(a, c)| (a.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }
}

impl FromIterator<(String, Classification)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (String, Classification)>>(iter: I) -> Self {
        Self {
            by_author: iter.into_iter().collect(),
        }
    }
}

/// Parse one `username,TRUE,FALSE` line. The username column sometimes carries
/// a `u/` or `/u/` prefix; the last path segment is the author.
fn parse_line(line: &str) -> Option<(String, Classification)> {
    let mut fields = line.split(',');
    let raw_author = fields.next()?.trim();
    let is_bot = fields.next().map(|f| f.trim() == "TRUE").unwrap_or(false);
    let is_troll = fields.next().map(|f| f.trim() == "TRUE").unwrap_or(false);

    let author = raw_author.rsplit('/').next()?.trim();
    if author.is_empty() {
        return None;
    }

    let label = if is_troll {
        Classification::Troll
    } else if is_bot {
        Classification::Bot
    } else {
        Classification::Human
    };

    Some((author.to_string(), label))
}
