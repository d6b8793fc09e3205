//! Where raw listing text comes from. Fetching over the network is out of
//! scope; sources read what a browser session already captured.

pub mod batch;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use batch::JsonBatchSource;
pub use snapshot::HtmlSnapshotSource;
pub use traits::ListingSource;
pub use types::{RawListing, SnapshotParams};
