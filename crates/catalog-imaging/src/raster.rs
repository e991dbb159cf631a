//! Decode, flatten, resample, and encode helpers shared by the ingestor and
//! the thumbnail generator.

use image::{
  DynamicImage, ImageFormat, Rgb, RgbImage, codecs::jpeg::JpegEncoder,
  imageops::FilterType,
};

use crate::{EncodedImage, Error, Result};

/// Decode `bytes`, accepting only the raster formats the catalog supports.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
  if bytes.is_empty() {
    return Err(Error::InvalidImageFormat("empty input".into()));
  }

  let format = image::guess_format(bytes)
    .map_err(|_| Error::InvalidImageFormat("unrecognised image data".into()))?;

  match format {
    ImageFormat::Jpeg
    | ImageFormat::Png
    | ImageFormat::Gif
    | ImageFormat::WebP
    | ImageFormat::Bmp => {}
    other => {
      return Err(Error::InvalidImageFormat(format!(
        "unsupported format {other:?}"
      )));
    }
  }

  let img = image::load_from_memory_with_format(bytes, format)
    .map_err(|e| Error::InvalidImageFormat(e.to_string()))?;

  if img.width() == 0 || img.height() == 0 {
    return Err(Error::InvalidImageFormat("image has no pixels".into()));
  }
  Ok(img)
}

/// Drop the alpha channel by compositing onto opaque white. Images without
/// alpha are only converted to 8-bit RGB.
pub fn flatten(img: &DynamicImage) -> RgbImage {
  if !img.color().has_alpha() {
    return img.to_rgb8();
  }

  let rgba = img.to_rgba8();
  RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
    let [r, g, b, a] = rgba.get_pixel(x, y).0;
    Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
  })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
  let (c, a) = (u16::from(channel), u16::from(alpha));
  ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Dimensions that fit `width × height` inside a `max_edge` square while
/// keeping the aspect ratio. Never upscales; never returns a zero edge. A
/// `max_edge` of zero is treated as one.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
  let max_edge = max_edge.max(1);
  let longer = width.max(height);
  if longer <= max_edge {
    return (width, height);
  }
  let scale = f64::from(max_edge) / f64::from(longer);
  let scaled = |edge: u32| ((f64::from(edge) * scale).round() as u32).clamp(1, max_edge);
  (scaled(width), scaled(height))
}

/// Shrink `img` so its longer edge is at most `max_edge`, using Lanczos3.
pub fn bound(img: RgbImage, max_edge: u32) -> RgbImage {
  let (w, h) = img.dimensions();
  let (new_w, new_h) = fit_within(w, h, max_edge);
  if (new_w, new_h) == (w, h) {
    return img;
  }
  image::imageops::resize(&img, new_w, new_h, FilterType::Lanczos3)
}

/// Encode as baseline JPEG at `quality`.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<EncodedImage> {
  let mut data = Vec::new();
  img
    .write_with_encoder(JpegEncoder::new_with_quality(&mut data, quality))
    .map_err(Error::Encode)?;

  Ok(EncodedImage {
    data,
    width: img.width(),
    height: img.height(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fit_within_landscape() {
    assert_eq!(fit_within(900, 600, 800), (800, 533));
    assert_eq!(fit_within(1200, 800, 100), (100, 67));
  }

  #[test]
  fn fit_within_portrait_and_square() {
    assert_eq!(fit_within(600, 1200, 800), (400, 800));
    assert_eq!(fit_within(1000, 1000, 100), (100, 100));
  }

  #[test]
  fn fit_within_never_upscales() {
    assert_eq!(fit_within(640, 480, 800), (640, 480));
    assert_eq!(fit_within(800, 10, 800), (800, 10));
  }

  #[test]
  fn fit_within_keeps_degenerate_edges_visible() {
    assert_eq!(fit_within(5000, 1, 100), (100, 1));
  }

  #[test]
  fn fit_within_zero_edge_does_not_panic() {
    assert_eq!(fit_within(640, 480, 0), (1, 1));
    assert_eq!(fit_within(1, 1, 0), (1, 1));
  }

  #[test]
  fn over_white_blends_linearly() {
    assert_eq!(over_white(0, 255), 0);
    assert_eq!(over_white(0, 0), 255);
    assert_eq!(over_white(200, 255), 200);
    assert_eq!(over_white(0, 128), 127);
  }

  #[test]
  fn decode_rejects_non_images() {
    assert!(matches!(decode(b""), Err(Error::InvalidImageFormat(_))));
    assert!(matches!(
      decode(b"definitely not an image"),
      Err(Error::InvalidImageFormat(_))
    ));
  }
}
