/// Counters from one trawl pass.
#[derive(Debug, Default, Clone)]
pub struct TrawlStats {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub records_seen: u64,
    pub records_enriched: u64,
    pub records_skipped: u64,
    pub records_published: u64,
    pub publish_failures: u64,
    pub throttle_events: u64,
    pub authors_seen: u64,
}

impl std::fmt::Display for TrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Trawl Pass Complete ===")?;
        writeln!(f, "Pages fetched:      {}", self.pages_fetched)?;
        writeln!(f, "Fetch failures:     {}", self.fetch_failures)?;
        writeln!(f, "Records seen:       {}", self.records_seen)?;
        writeln!(f, "Records enriched:   {}", self.records_enriched)?;
        writeln!(f, "Records skipped:    {}", self.records_skipped)?;
        writeln!(f, "Records published:  {}", self.records_published)?;
        writeln!(f, "Publish failures:   {}", self.publish_failures)?;
        writeln!(f, "Throttle events:    {}", self.throttle_events)?;
        writeln!(f, "Authors seen:       {}", self.authors_seen)?;
        Ok(())
    }
}
