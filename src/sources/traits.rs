use super::RawListing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for every place raw listing text can come from.
/// A failing source aborts the run before anything is persisted.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the raw text blocks of one capture run
    async fn fetch(&self) -> Result<Vec<RawListing>>;

    /// Get the name of the source, used in logs
    fn source_name(&self) -> &'static str;
}
