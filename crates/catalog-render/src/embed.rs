//! Preparing stored photos for embedding as PDF image XObjects.

use std::io::Cursor;

use catalog_imaging::{ImageIngestor, ImagingConfig};
use image::{ColorType, ImageDecoder, ImageFormat, codecs::jpeg::JpegDecoder};
use tracing::debug;

/// Colour space of an embedded DCT stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
  Gray,
  Rgb,
}

/// A JPEG ready to be written verbatim as a `DCTDecode` stream.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
  pub data:   Vec<u8>,
  pub width:  u32,
  pub height: u32,
  pub color:  ColorSpace,
}

/// Read the header of a baseline JPEG. `None` if `bytes` is not a JPEG whose
/// stream a PDF reader can decode as-is.
fn passthrough(bytes: &[u8]) -> Option<EmbeddedImage> {
  if image::guess_format(bytes).ok()? != ImageFormat::Jpeg {
    return None;
  }
  let decoder = JpegDecoder::new(Cursor::new(bytes)).ok()?;
  let (width, height) = decoder.dimensions();
  let color = match decoder.color_type() {
    ColorType::L8 => ColorSpace::Gray,
    ColorType::Rgb8 => ColorSpace::Rgb,
    _ => return None,
  };
  if width == 0 || height == 0 {
    return None;
  }
  Some(EmbeddedImage {
    data: bytes.to_vec(),
    width,
    height,
    color,
  })
}

/// Turn a stored photo into something embeddable.
///
/// JPEGs are passed through untouched. Anything else (legacy PNG or GIF
/// photos, CMYK JPEGs) is normalized to an RGB JPEG in memory. Returns an
/// error message when the bytes cannot be decoded at all.
pub fn prepare(photo: &[u8], imaging: &ImagingConfig) -> Result<EmbeddedImage, String> {
  if let Some(image) = passthrough(photo) {
    return Ok(image);
  }

  let normalized = ImageIngestor::new(imaging)
    .ingest(photo)
    .map_err(|e| e.to_string())?;
  debug!(
    width = normalized.width,
    height = normalized.height,
    "Re-encoded stored photo for embedding"
  );
  Ok(EmbeddedImage {
    data:   normalized.data,
    width:  normalized.width,
    height: normalized.height,
    color:  ColorSpace::Rgb,
  })
}

/// Size of a `width × height` image scaled to fit a `side`-point square,
/// keeping its aspect ratio. Never scales past the box in either direction.
pub fn fit_box(width: u32, height: u32, side: f32) -> (f32, f32) {
  let (w, h) = (width as f32, height as f32);
  let scale = side / w.max(h);
  (w * scale, h * scale)
}
