//! Content-addressed evidence identifiers.
//!
//! IDs have the form `{prefix}-{hash12}` where `hash12` is the first 12 hex
//! characters of `sha256(parts.join(":"))`. The same evidence collected twice
//! always gets the same ID.

use sha2::{Digest, Sha256};

/// Separator placed between parts before hashing.
pub const ID_SEPARATOR: &str = ":";

/// Number of hex characters kept from the digest.
pub const ID_HASH_LEN: usize = 12;

/// Compute a deterministic evidence ID
///
/// # Arguments
/// * `prefix` - Short type tag such as `push`, `commit` or `ioc`
/// * `parts` - Ordered identifying values; order matters
///
/// # Returns
/// * String in format "prefix-0123456789ab"
pub fn generate_id<I, S>(prefix: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let content = parts
        .into_iter()
        .map(|part| part.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(ID_SEPARATOR);

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}-{}", prefix, &digest[..ID_HASH_LEN])
}

/// Compute SHA256 hash of a byte slice, returning hex string with prefix
///
/// # Returns
/// * String in format "sha256:abc123..."
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
