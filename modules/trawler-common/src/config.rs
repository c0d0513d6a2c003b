use std::env;

/// Inter-fetch pacing bounds; values outside are clamped, not rejected.
const MIN_PACING_MS: u64 = 500;
const MAX_PACING_MS: u64 = 5_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Source
    pub subreddit: String,
    pub pacing_ms: u64,

    // Postgres
    pub database_url: String,

    // Kafka
    pub kafka_url: String,
    pub kafka_topic: String,

    // Labels
    pub labels_path: String,

    // Flow control
    pub queue_high_water: usize,
    pub queue_resume_at: usize,
    pub window_size: usize,
}

impl Config {
    /// Config for the continuous stream pass (Kafka sink, no database).
    /// Panics with a clear message if required vars are missing.
    pub fn stream_from_env() -> Self {
        Self {
            subreddit: env::var("SUBREDDIT").unwrap_or_else(|_| "politics".to_string()),
            pacing_ms: numeric_env("PACING_MS", 1000).clamp(MIN_PACING_MS, MAX_PACING_MS),
            database_url: String::new(),
            kafka_url: required_env("KAFKA_URL"),
            kafka_topic: env::var("KAFKA_TOPIC")
                .unwrap_or_else(|_| "reddit-comments".to_string()),
            labels_path: env::var("LABELS_PATH").unwrap_or_else(|_| "bots.csv".to_string()),
            queue_high_water: numeric_env("QUEUE_HIGH_WATER", 99),
            queue_resume_at: numeric_env("QUEUE_RESUME_AT", 0),
            window_size: numeric_env("WINDOW_SIZE", 20),
        }
    }

    /// Config for the finite export pass (Postgres sink, no Kafka).
    pub fn export_from_env() -> Self {
        Self {
            subreddit: env::var("SUBREDDIT").unwrap_or_else(|_| "politics".to_string()),
            pacing_ms: numeric_env("PACING_MS", 1000).clamp(MIN_PACING_MS, MAX_PACING_MS),
            database_url: required_env("DATABASE_URL"),
            kafka_url: String::new(),
            kafka_topic: String::new(),
            labels_path: env::var("LABELS_PATH").unwrap_or_else(|_| "bots.csv".to_string()),
            queue_high_water: numeric_env("QUEUE_HIGH_WATER", 99),
            queue_resume_at: numeric_env("QUEUE_RESUME_AT", 0),
            window_size: numeric_env("WINDOW_SIZE", 20),
        }
    }

    /// Config for the labeled-author backfill pass (Postgres sink).
    pub fn backfill_from_env() -> Self {
        Self::export_from_env()
    }

    /// Log the non-secret parts of the configuration at startup.
    pub fn log_redacted(&self) {
        tracing::info!(
            subreddit = %self.subreddit,
            pacing_ms = self.pacing_ms,
            labels_path = %self.labels_path,
            queue_high_water = self.queue_high_water,
            queue_resume_at = self.queue_resume_at,
            window_size = self.window_size,
            has_database = !self.database_url.is_empty(),
            has_kafka = !self.kafka_url.is_empty(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn numeric_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number")),
        Err(_) => default,
    }
}
