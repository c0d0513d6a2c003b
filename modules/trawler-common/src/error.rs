use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrawlerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
