//! Tracks used-car listings for a handful of vehicles across capture runs:
//! raw listing text is parsed into records, merged into a persistent dataset
//! and ranked by desirability and recency.

pub mod categorize;
pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod reconcile;
pub mod report;
pub mod search;
pub mod sources;
pub mod store;
pub mod temporal;

pub use config::AppConfig;
pub use error::StoreError;
pub use models::{Dataset, Listing};
pub use pipeline::{run_capture, RunOutcome};
