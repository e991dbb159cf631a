//! Error types for the catalog renderer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid page layout: {0}")]
  InvalidLayout(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for catalog_core::Error {
  fn from(e: Error) -> Self { Self::Render(e.to_string()) }
}
