use super::{ListingSource, RawListing};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Raw listings read from a JSON array of `{tracked_vehicle, raw_text}` objects
pub struct JsonBatchSource {
    path: PathBuf,
}

impl JsonBatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for JsonBatchSource {
    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read batch {}", self.path.display()))?;
        let raws: Vec<RawListing> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse batch {}", self.path.display()))?;

        info!("Loaded {} raw listings from {}", raws.len(), self.path.display());
        Ok(raws)
    }

    fn source_name(&self) -> &'static str {
        "json-batch"
    }
}
