//! Thumbnail derivation from normalized photos.

use tracing::debug;

use crate::{EncodedImage, ImagingConfig, Result, raster};

/// Derives a small JPEG from a normalized photo.
///
/// Thumbnails are always cut from the normalized photo, so their format and
/// quality do not depend on what was uploaded. The generator still decodes
/// and flattens defensively so it can be used on its own.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailGenerator {
  max_edge: u32,
  quality:  u8,
}

impl ThumbnailGenerator {
  pub fn new(config: &ImagingConfig) -> Self {
    Self {
      max_edge: config.thumbnail_max_edge,
      quality:  config.jpeg_quality,
    }
  }

  /// Generate the thumbnail for `photo`. Fails with
  /// [`crate::Error::InvalidImageFormat`] on empty or undecodable input.
  pub fn generate(&self, photo: &[u8]) -> Result<EncodedImage> {
    let img = raster::decode(photo)?;
    let bounded = raster::bound(raster::flatten(&img), self.max_edge);
    let encoded = raster::encode_jpeg(&bounded, self.quality)?;

    debug!(
      width = encoded.width,
      height = encoded.height,
      size = encoded.data.len(),
      "Thumbnail generated"
    );
    Ok(encoded)
  }
}

#[cfg(test)]
mod tests {
  use image::GenericImageView;

  use super::*;
  use crate::{Error, fixtures};

  fn generator() -> ThumbnailGenerator {
    ThumbnailGenerator::new(&ImagingConfig::default())
  }

  #[test]
  fn longer_edge_is_bounded_and_aspect_kept() {
    let out = generator().generate(&fixtures::jpeg(800, 533)).unwrap();
    assert_eq!((out.width, out.height), (100, 67));

    let in_ratio = 800.0 / 533.0;
    let out_ratio = f64::from(out.width) / f64::from(out.height);
    assert!((in_ratio - out_ratio).abs() < 0.02, "{in_ratio} vs {out_ratio}");
  }

  #[test]
  fn portrait_photo() {
    let out = generator().generate(&fixtures::jpeg(450, 800)).unwrap();
    assert_eq!((out.width, out.height), (56, 100));
    let decoded = image::load_from_memory(&out.data).unwrap();
    assert_eq!(decoded.dimensions(), (56, 100));
  }

  #[test]
  fn small_photo_is_not_upscaled() {
    let out = generator().generate(&fixtures::jpeg(60, 40)).unwrap();
    assert_eq!((out.width, out.height), (60, 40));
  }

  #[test]
  fn empty_input_is_rejected() {
    assert!(matches!(
      generator().generate(&[]),
      Err(Error::InvalidImageFormat(_))
    ));
  }

  #[test]
  fn garbage_input_is_rejected() {
    assert!(matches!(
      generator().generate(&[0x13, 0x37, 0x00, 0x42]),
      Err(Error::InvalidImageFormat(_))
    ));
  }
}
