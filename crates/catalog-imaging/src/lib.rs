//! Image pipeline for catalog items.
//!
//! Turns an uploaded image into the two derived assets an item stores: a
//! normalized photo and a thumbnail cut from that photo. Pure synchronous and
//! CPU-bound; async callers should run it under `spawn_blocking`.
//!
//! ```text
//! raw bytes ──▶ ImageIngestor ──▶ photo ──▶ ThumbnailGenerator ──▶ thumbnail
//!               (decode, flatten,            (decode, bound to
//!                bound to 800 px, JPEG)       100 px, JPEG)
//! ```

pub mod error;
mod ingest;
mod raster;
mod thumbnail;

pub use error::{Error, Result};
pub use ingest::ImageIngestor;
pub use thumbnail::ThumbnailGenerator;

use catalog_core::item::ItemImages;

/// Longer-edge ceiling for normalized photos, in pixels.
pub const PHOTO_MAX_EDGE: u32 = 800;
/// Longer-edge ceiling for thumbnails, in pixels.
pub const THUMBNAIL_MAX_EDGE: u32 = 100;
/// Quality used for every JPEG the pipeline writes.
pub const JPEG_QUALITY: u8 = 85;

/// Size ceilings and encoder quality for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagingConfig {
  pub photo_max_edge:     u32,
  pub thumbnail_max_edge: u32,
  /// JPEG quality, 1–100.
  pub jpeg_quality:       u8,
}

impl Default for ImagingConfig {
  fn default() -> Self {
    Self {
      photo_max_edge:     PHOTO_MAX_EDGE,
      thumbnail_max_edge: THUMBNAIL_MAX_EDGE,
      jpeg_quality:       JPEG_QUALITY,
    }
  }
}

/// A JPEG produced by the pipeline, with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
  pub data:   Vec<u8>,
  pub width:  u32,
  pub height: u32,
}

/// Both derived assets of one upload.
#[derive(Debug, Clone)]
pub struct DerivedImages {
  pub photo:     EncodedImage,
  pub thumbnail: EncodedImage,
}

impl From<DerivedImages> for ItemImages {
  fn from(d: DerivedImages) -> Self {
    ItemImages {
      photo:     d.photo.data,
      thumbnail: d.thumbnail.data,
    }
  }
}

/// Run the full pipeline: normalize `raw`, then derive the thumbnail from
/// the normalized photo (never from `raw`).
pub fn derive_images(raw: &[u8], config: &ImagingConfig) -> Result<DerivedImages> {
  let photo = ImageIngestor::new(config).ingest(raw)?;
  let thumbnail = ThumbnailGenerator::new(config).generate(&photo.data)?;
  Ok(DerivedImages { photo, thumbnail })
}

#[cfg(test)]
pub(crate) mod fixtures {
  use std::io::Cursor;

  use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

  /// A gradient so resampling has something to chew on.
  pub fn rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
      Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
  }

  pub fn rgba(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
  }

  pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
  }

  pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&rgb(width, height), ImageFormat::Jpeg)
  }

  pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&rgb(width, height), ImageFormat::Png)
  }
}
