//! Error type for `catalog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("article number {0:?} already exists")]
  DuplicateArticleNumber(String),

  #[error("item not found: {0}")]
  NotFound(String),

  /// A stored asset could not be turned back into image bytes. This is
  /// corrupt data on the server side, so it surfaces as a storage failure.
  #[error("stored asset: {0}")]
  Asset(#[source] catalog_core::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("item {0} has only one of photo and thumbnail")]
  IncompleteAssets(i64),

  #[error("legacy row {article_number:?} could not be upgraded: {reason}")]
  LegacyRow {
    article_number: String,
    reason:         String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for catalog_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::DuplicateArticleNumber(a) => Self::DuplicateArticleNumber(a),
      Error::NotFound(a) => Self::NotFound(a),
      other => Self::Storage(Box::new(other)),
    }
  }
}
