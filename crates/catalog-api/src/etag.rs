//! Strong ETags for image assets.
//!
//! An asset's ETag is the SHA-256 of its bytes, so it is stable across
//! restarts and changes only if the stored bytes do.

use sha2::{Digest, Sha256};

/// Quoted hex SHA-256 of `bytes`.
pub fn compute_etag(bytes: &[u8]) -> String {
  let hash = Sha256::digest(bytes);
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak (`W/`) validators, and bare
/// unquoted tags, which some clients send.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let bare = etag.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate
        .strip_prefix("W/")
        .unwrap_or(candidate)
        .trim_matches('"')
        == bare
  })
}
