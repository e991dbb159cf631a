//! Normalization of uploaded images.

use tracing::debug;

use crate::{EncodedImage, ImagingConfig, Result, raster};

/// Decodes an upload, flattens transparency, bounds its longer edge, and
/// re-encodes it as JPEG at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct ImageIngestor {
  max_edge: u32,
  quality:  u8,
}

impl ImageIngestor {
  pub fn new(config: &ImagingConfig) -> Self {
    Self {
      max_edge: config.photo_max_edge,
      quality:  config.jpeg_quality,
    }
  }

  /// Produce the normalized photo for `raw`.
  ///
  /// Fails with [`crate::Error::InvalidImageFormat`] if `raw` is not a
  /// supported raster image. The output is always an opaque JPEG whose
  /// longer edge is at most the configured ceiling; smaller inputs keep
  /// their dimensions.
  pub fn ingest(&self, raw: &[u8]) -> Result<EncodedImage> {
    let img = raster::decode(raw)?;
    debug!(
      original_width = img.width(),
      original_height = img.height(),
      has_alpha = img.color().has_alpha(),
      "Normalizing upload"
    );

    let bounded = raster::bound(raster::flatten(&img), self.max_edge);
    let encoded = raster::encode_jpeg(&bounded, self.quality)?;

    debug!(
      width = encoded.width,
      height = encoded.height,
      size = encoded.data.len(),
      "Photo normalized"
    );
    Ok(encoded)
  }
}

#[cfg(test)]
mod tests {
  use image::{GenericImageView, ImageFormat};

  use super::*;
  use crate::{Error, fixtures};

  fn ingestor() -> ImageIngestor { ImageIngestor::new(&ImagingConfig::default()) }

  #[test]
  fn wide_jpeg_is_scaled_to_800() {
    let out = ingestor().ingest(&fixtures::jpeg(900, 600)).unwrap();
    assert_eq!((out.width, out.height), (800, 533));

    let decoded = image::load_from_memory(&out.data).unwrap();
    assert_eq!(decoded.dimensions(), (800, 533));
  }

  #[test]
  fn tall_image_is_bounded_on_its_longer_edge() {
    let out = ingestor().ingest(&fixtures::png(600, 1200)).unwrap();
    assert_eq!((out.width, out.height), (400, 800));
  }

  #[test]
  fn small_image_keeps_its_size() {
    let out = ingestor().ingest(&fixtures::png(640, 480)).unwrap();
    assert_eq!((out.width, out.height), (640, 480));
    assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::Jpeg);
  }

  #[test]
  fn transparency_is_flattened_onto_white() {
    let raw = fixtures::encode(&fixtures::rgba(16, 16, [255, 0, 0, 0]), ImageFormat::Png);
    let out = ingestor().ingest(&raw).unwrap();

    let decoded = image::load_from_memory(&out.data).unwrap();
    assert!(!decoded.color().has_alpha());
    let px = decoded.to_rgb8().get_pixel(8, 8).0;
    assert!(px.iter().all(|&c| c >= 245), "expected white, got {px:?}");
  }

  #[test]
  fn gif_uploads_are_accepted() {
    let raw = fixtures::encode(&fixtures::rgba(40, 20, [0, 0, 255, 255]), ImageFormat::Gif);
    let out = ingestor().ingest(&raw).unwrap();
    assert_eq!((out.width, out.height), (40, 20));
  }

  #[test]
  fn non_image_bytes_are_rejected() {
    let err = ingestor().ingest(b"%PDF-1.7 not a raster").unwrap_err();
    assert!(matches!(err, Error::InvalidImageFormat(_)));
  }

  #[test]
  fn truncated_image_is_rejected() {
    let raw = fixtures::jpeg(64, 64);
    let err = ingestor().ingest(&raw[..24]).unwrap_err();
    assert!(matches!(err, Error::InvalidImageFormat(_)));
  }

  #[test]
  fn input_is_not_mutated() {
    let raw = fixtures::png(20, 20);
    let copy = raw.clone();
    ingestor().ingest(&raw).unwrap();
    assert_eq!(raw, copy);
  }
}
