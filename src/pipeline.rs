//! One capture run: load, fetch, extract, reconcile, rank, save.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::AppConfig;
use crate::extract::{Extractor, PatternLibrary};
use crate::models::Listing;
use crate::rank::Ranker;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::report::DatasetSummary;
use crate::sources::{ListingSource, RawListing};
use crate::store::DatasetStore;

#[derive(Debug)]
pub struct RunOutcome {
    pub fetched: usize,
    pub extracted: usize,
    pub rejected: usize,
    pub reconcile: ReconcileReport,
    pub summary: DatasetSummary,
    pub records: Vec<Listing>,
}

/// Run one capture. Every source must succeed before anything is written.
pub async fn run_capture(
    config: &AppConfig,
    sources: &[Box<dyn ListingSource>],
    store: &dyn DatasetStore,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    let prior = store.load().await.context("Failed to load dataset")?;
    info!("📂 {} stored listings ({} active)", prior.len(), prior.active_count());

    let mut raws: Vec<RawListing> = Vec::new();
    for source in sources {
        let fetched = source
            .fetch()
            .await
            .with_context(|| format!("Source {} failed", source.source_name()))?;
        info!("🔎 {}: {} raw listings", source.source_name(), fetched.len());
        raws.extend(fetched);
    }

    let patterns = PatternLibrary::standard();
    let batch = Extractor::new(config, &patterns, now).extract_all(&raws);
    info!(
        "🧩 Extracted {} listings ({} blocks rejected)",
        batch.listings.len(),
        batch.rejected
    );
    let extracted = batch.listings.len();

    let (next, reconcile_report) = reconcile(prior, batch.listings, now);
    let records = Ranker::from_config(config).rank(next);

    store.save(&records).await.context("Failed to save dataset")?;

    let summary = DatasetSummary::from_records(&records);
    Ok(RunOutcome {
        fetched: raws.len(),
        extracted,
        rejected: batch.rejected,
        reconcile: reconcile_report,
        summary,
        records,
    })
}
