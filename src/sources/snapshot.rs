use super::{ListingSource, RawListing, SnapshotParams};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Listing cards parsed out of a saved search results page
pub struct HtmlSnapshotSource {
    tracked_vehicle: String,
    path: PathBuf,
    params: SnapshotParams,
}

impl HtmlSnapshotSource {
    pub fn new(tracked_vehicle: &str, path: impl Into<PathBuf>) -> Self {
        Self::with_params(tracked_vehicle, path, SnapshotParams::default())
    }

    pub fn with_params(
        tracked_vehicle: &str,
        path: impl Into<PathBuf>,
        params: SnapshotParams,
    ) -> Self {
        Self {
            tracked_vehicle: tracked_vehicle.to_string(),
            path: path.into(),
            params,
        }
    }

    /// Visible text of each card, one line per non-empty text node
    pub fn parse_cards(&self, html: &str) -> Result<Vec<RawListing>> {
        let document = Html::parse_document(html);
        let card_selector = Selector::parse(&self.params.card_selector)
            .map_err(|e| anyhow!("Invalid card selector {:?}: {}", self.params.card_selector, e))?;

        let cards: Vec<_> = document.select(&card_selector).collect();
        info!("Found {} listing cards for {}", cards.len(), self.tracked_vehicle);
        if cards.len() > self.params.max_cards {
            debug!("Keeping the first {} cards", self.params.max_cards);
        }

        let raws: Vec<RawListing> = cards
            .iter()
            .take(self.params.max_cards)
            .map(|card| {
                let text = card
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                RawListing::new(&self.tracked_vehicle, &text)
            })
            .filter(|raw| !raw.raw_text.is_empty())
            .collect();

        if raws.is_empty() {
            warn!("No listing text found in {}", self.path.display());
        }
        Ok(raws)
    }
}

#[async_trait]
impl ListingSource for HtmlSnapshotSource {
    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        self.parse_cards(&html)
    }

    fn source_name(&self) -> &'static str {
        "html-snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="tm-motors-tier-one-search-card__listing-details-container">
            <div>2016 Toyota 86 GT</div>
            <span>Auckland</span>
            <span> </span>
            <div>$21,000</div>
        </div>
        <div class="tm-motors-tier-one-search-card__listing-details-container">
            <div>2014 Toyota 86</div><div>Hamilton</div>
        </div>
        <div class="unrelated">Sponsored</div>
    </body></html>"#;

    #[test]
    fn test_card_text_joined_by_lines() {
        let source = HtmlSnapshotSource::new("Toyota 86", "page.html");
        let raws = source.parse_cards(PAGE).unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(raws[0].tracked_vehicle, "Toyota 86");
        assert_eq!(raws[0].raw_text, "2016 Toyota 86 GT\nAuckland\n$21,000");
        assert_eq!(raws[1].raw_text, "2014 Toyota 86\nHamilton");
    }

    #[test]
    fn test_card_limit() {
        let params = SnapshotParams {
            max_cards: 1,
            ..SnapshotParams::default()
        };
        let source = HtmlSnapshotSource::with_params("Toyota 86", "page.html", params);
        assert_eq!(source.parse_cards(PAGE).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let params = SnapshotParams {
            card_selector: "[[".to_string(),
            ..SnapshotParams::default()
        };
        let source = HtmlSnapshotSource::with_params("Toyota 86", "page.html", params);
        assert!(source.parse_cards(PAGE).is_err());
    }

    #[tokio::test]
    async fn test_missing_snapshot_fails() {
        let source = HtmlSnapshotSource::new("Toyota 86", "/nonexistent/page.html");
        assert!(source.fetch().await.is_err());
    }
}
