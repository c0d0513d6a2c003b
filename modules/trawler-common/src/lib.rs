pub mod config;
pub mod error;
pub mod labels;
pub mod types;

pub use config::Config;
pub use error::TrawlerError;
pub use labels::LabelSet;
pub use types::{Classification, EnrichedComment};
