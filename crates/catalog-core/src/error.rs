//! The error taxonomy shared by every catalog crate.
//!
//! Leaf crates (imaging, store, render) define their own error enums and
//! convert into this one at the service boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("article number {0:?} already exists")]
  DuplicateArticleNumber(String),

  #[error("item not found: {0}")]
  NotFound(String),

  #[error("invalid item: {0}")]
  InvalidItem(String),

  #[error("invalid image format: {0}")]
  InvalidImageFormat(String),

  #[error("malformed encoded asset: {0}")]
  Decode(#[from] base64::DecodeError),

  #[error("render error: {0}")]
  Render(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A blocking image or render job panicked or was cancelled.
  #[error("worker task failed: {0}")]
  Task(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
