use sha2::{Digest, Sha256};

/// Width of a listing id in hex characters
pub const ID_LEN: usize = 12;

/// Stable listing id from the fields that identify an ad across runs.
///
/// The capture date is not part of the input, so a re-captured ad keeps its id.
pub fn assign_id(title: &str, location: Option<&str>, year: Option<i32>) -> String {
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    let key = format!("{}_{}_{}", title, location.unwrap_or_default(), year);

    let digest = Sha256::digest(key.as_bytes());
    hex::encode_upper(&digest[..ID_LEN / 2])
}
