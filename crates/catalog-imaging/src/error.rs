//! Error types for the imaging pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input is empty, not a raster image, or in a format we do not accept.
  #[error("invalid image format: {0}")]
  InvalidImageFormat(String),

  #[error("could not encode image: {0}")]
  Encode(#[source] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for catalog_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::InvalidImageFormat(msg) => Self::InvalidImageFormat(msg),
      Error::Encode(e) => Self::InvalidImageFormat(e.to_string()),
    }
  }
}
