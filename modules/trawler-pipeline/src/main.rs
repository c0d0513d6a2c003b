use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reddit_client::RedditClient;
use trawler_common::{Config, LabelSet};
use trawler_pipeline::{
    relabel_all, Backfill, BackfillSettings, KafkaSink, PassMode, PipelineController,
    PostgresSink, RecordSink, TrawlSettings,
};

#[derive(Parser)]
#[command(name = "trawler", about = "Reddit comment ingestion for bot-detection training data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Continuously stream subreddit comments to Kafka.
    Stream,
    /// One finite pass over a subreddit into Postgres.
    Export,
    /// Scrape every labeled author's history into Postgres.
    Backfill,
    /// Apply the label file to comments already stored in Postgres.
    Relabel,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trawler=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Flip the cancellation flag on Ctrl-C; every suspension point in the
    // pipeline checks it.
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, cancelling");
                cancelled.store(true, Ordering::Relaxed);
            }
        });
    }

    match cli.command {
        Command::Stream => {
            let config = Config::stream_from_env();
            config.log_redacted();

            let labels = load_labels_optional(&config.labels_path);
            let sink = KafkaSink::connect(&config.kafka_url, &config.kafka_topic).await?;

            let controller = PipelineController::new(
                Arc::new(RedditClient::new()),
                Arc::new(sink) as Arc<dyn RecordSink>,
                labels,
                settings_from(&config, PassMode::Continuous),
                cancelled,
            );
            let stats = controller.run().await?;
            info!("Stream pass finished. {stats}");
        }
        Command::Export => {
            let config = Config::export_from_env();
            config.log_redacted();

            let labels = load_labels_optional(&config.labels_path);
            let sink = PostgresSink::connect(&config.database_url).await?;
            sink.ensure_schema().await?;

            let controller = PipelineController::new(
                Arc::new(RedditClient::new()),
                Arc::new(sink) as Arc<dyn RecordSink>,
                labels,
                settings_from(&config, PassMode::SinglePass),
                cancelled,
            );
            let stats = controller.run().await?;
            info!("Export pass finished. {stats}");
        }
        Command::Backfill => {
            let config = Config::backfill_from_env();
            config.log_redacted();

            // The label file drives this pass; missing it is fatal.
            let labels = LabelSet::from_path(&config.labels_path)?;
            let sink = Arc::new(PostgresSink::connect(&config.database_url).await?);
            sink.ensure_schema().await?;

            let backfill = Backfill::new(
                Arc::new(RedditClient::new()),
                sink.clone(),
                sink,
                labels,
                BackfillSettings {
                    pacing: Duration::from_millis(config.pacing_ms),
                    queue_high_water: config.queue_high_water,
                    queue_resume_at: config.queue_resume_at,
                    window_size: config.window_size,
                },
                cancelled,
            );
            let stats = backfill.run().await?;
            info!("Backfill finished. {stats}");
        }
        Command::Relabel => {
            let config = Config::export_from_env();
            config.log_redacted();

            let labels = LabelSet::from_path(&config.labels_path)?;
            let sink = PostgresSink::connect(&config.database_url).await?;

            let (authors, rows) = relabel_all(&sink, &labels).await;
            info!(authors, rows, "Relabel finished");
        }
    }

    Ok(())
}

fn settings_from(config: &Config, mode: PassMode) -> TrawlSettings {
    TrawlSettings {
        subreddit: config.subreddit.clone(),
        mode,
        pacing: Duration::from_millis(config.pacing_ms),
        queue_high_water: config.queue_high_water,
        queue_resume_at: config.queue_resume_at,
        window_size: config.window_size,
    }
}

/// Subreddit passes only use labels as an optional seed; a missing file just
/// means every author stays unclassified.
fn load_labels_optional(path: &str) -> LabelSet {
    match LabelSet::from_path(path) {
        Ok(labels) => labels,
        Err(e) => {
            warn!(path, error = %e, "No label file loaded, authors stay unclassified");
            LabelSet::default()
        }
    }
}
