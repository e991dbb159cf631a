//! Printable catalog renderer.
//!
//! Lays an ordered item sequence out as fixed-height rows on A4 pages and
//! writes the result as a PDF. Each row shows the item's photo (or a "No
//! photo" frame) next to its name, article number, size and weight. Pure
//! synchronous and CPU-bound; async callers should run it under
//! `spawn_blocking`.
//!
//! ```no_run
//! use catalog_render::{RenderOptions, render};
//!
//! let items = Vec::new();
//! let doc = render(&items, &RenderOptions::new(chrono::Utc::now().date_naive())).unwrap();
//! std::fs::write(&doc.filename, &doc.bytes).unwrap();
//! ```

mod document;
mod embed;
pub mod error;
pub mod layout;
mod text;

use catalog_core::item::Item;
use catalog_imaging::ImagingConfig;
use chrono::NaiveDate;
pub use error::{Error, Result};
pub use layout::{Layout, PagePlan, RowPlacement, paginate};
use tracing::info;

pub const CONTENT_TYPE: &str = "application/pdf";

/// Title written into the document metadata unless overridden.
pub const DEFAULT_TITLE: &str = "Inventory Catalog";

// ─── Public types ────────────────────────────────────────────────────────────

/// Knobs for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
  pub title:   String,
  /// Stamped into the filename and the document's creation date.
  pub date:    NaiveDate,
  pub layout:  Layout,
  /// Used when a stored photo has to be re-encoded before embedding.
  pub imaging: ImagingConfig,
}

impl RenderOptions {
  pub fn new(date: NaiveDate) -> Self {
    Self {
      title: DEFAULT_TITLE.to_owned(),
      date,
      layout: Layout::default(),
      imaging: ImagingConfig::default(),
    }
  }
}

/// A rendered catalog, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
  pub bytes:        Vec<u8>,
  /// `catalog-YYYY-MM-DD.pdf`
  pub filename:     String,
  pub content_type: &'static str,
  pub page_count:   usize,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// `catalog-YYYY-MM-DD.pdf` for `date`.
pub fn filename_for(date: NaiveDate) -> String {
  format!("catalog-{}.pdf", date.format("%Y-%m-%d"))
}

/// Render `items`, in order, one row each.
///
/// The catalog embeds each item's full normalized photo rather than its
/// thumbnail. An empty sequence renders a single page carrying only the
/// footer.
pub fn render(items: &[Item], options: &RenderOptions) -> Result<CatalogDocument> {
  options.layout.validate()?;

  let pages = paginate(items.len(), &options.layout);
  let bytes = document::write(items, &pages, options);

  info!(
    items = items.len(),
    pages = pages.len(),
    bytes = bytes.len(),
    "Catalog rendered"
  );

  Ok(CatalogDocument {
    bytes,
    filename: filename_for(options.date),
    content_type: CONTENT_TYPE,
    page_count: pages.len(),
  })
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use catalog_core::item::ItemImages;
  use chrono::Utc;
  use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

  use super::*;

  fn date() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 3, 14).unwrap() }

  fn item(i: usize, images: Option<ItemImages>) -> Item {
    Item {
      id: i as i64 + 1,
      article_number: format!("ART-{i:04}"),
      name: format!("Widget {i:04}"),
      size_in_mm: 40.0,
      weight_in_g: 12.5,
      created_at: Utc::now(),
      images,
    }
  }

  fn encoded(format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([10, 120, 200])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
  }

  fn images(format: ImageFormat) -> Option<ItemImages> {
    Some(ItemImages {
      photo:     encoded(format),
      thumbnail: encoded(ImageFormat::Jpeg),
    })
  }

  fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
  }

  #[test]
  fn empty_catalog_is_one_page() {
    let doc = render(&[], &RenderOptions::new(date())).unwrap();
    assert_eq!(doc.page_count, 1);
    assert!(doc.bytes.starts_with(b"%PDF-"));
    assert_eq!(occurrences(&doc.bytes, b"/Count 1"), 1);
    assert_eq!(occurrences(&doc.bytes, b"(Page 1 of 1)"), 1);
  }

  #[test]
  fn page_count_follows_rows_per_page() {
    let items: Vec<_> = (0..13).map(|i| item(i, None)).collect();
    let doc = render(&items, &RenderOptions::new(date())).unwrap();
    assert_eq!(doc.page_count, 3);
    assert_eq!(occurrences(&doc.bytes, b"/Count 3"), 1);
    assert_eq!(occurrences(&doc.bytes, b"(Page 3 of 3)"), 1);
  }

  #[test]
  fn fractional_row_height_keeps_full_pages() {
    let mut options = RenderOptions::new(date());
    options.layout.row_height = options.layout.content_height() / 7.0;
    let per_page = options.layout.rows_per_page();

    let items: Vec<_> = (0..21).map(|i| item(i, None)).collect();
    let doc = render(&items, &options).unwrap();
    assert_eq!(doc.page_count, 21_usize.div_ceil(per_page));
    let last = format!("(Page {0} of {0})", doc.page_count);
    assert_eq!(occurrences(&doc.bytes, last.as_bytes()), 1);
  }

  #[test]
  fn every_item_appears_exactly_once() {
    let items: Vec<_> = (0..20).map(|i| item(i, None)).collect();
    let doc = render(&items, &RenderOptions::new(date())).unwrap();
    for i in 0..20 {
      let needle = format!("(Widget {i:04})");
      assert_eq!(occurrences(&doc.bytes, needle.as_bytes()), 1, "{needle}");
    }
  }

  #[test]
  fn jpeg_photos_are_embedded_as_dct_streams() {
    let items = vec![item(0, images(ImageFormat::Jpeg)), item(1, images(ImageFormat::Png))];
    let doc = render(&items, &RenderOptions::new(date())).unwrap();
    assert_eq!(occurrences(&doc.bytes, b"/DCTDecode"), 2);
    assert_eq!(occurrences(&doc.bytes, b"(No photo)"), 0);
  }

  #[test]
  fn missing_or_broken_photos_get_a_placeholder() {
    let broken = Some(ItemImages {
      photo:     b"not an image".to_vec(),
      thumbnail: b"nor this".to_vec(),
    });
    let items = vec![item(0, None), item(1, broken)];
    let doc = render(&items, &RenderOptions::new(date())).unwrap();
    assert_eq!(doc.page_count, 1);
    assert_eq!(occurrences(&doc.bytes, b"(No photo)"), 2);
    assert_eq!(occurrences(&doc.bytes, b"/DCTDecode"), 0);
  }

  #[test]
  fn document_carries_title_and_dated_filename() {
    let doc = render(&[item(0, None)], &RenderOptions::new(date())).unwrap();
    assert_eq!(doc.filename, "catalog-2026-03-14.pdf");
    assert_eq!(doc.content_type, "application/pdf");
    assert_eq!(occurrences(&doc.bytes, b"(Inventory Catalog)"), 1);
  }

  #[test]
  fn invalid_layout_is_rejected() {
    let mut options = RenderOptions::new(date());
    options.layout.row_height = 2000.0;
    assert!(matches!(render(&[], &options), Err(Error::InvalidLayout(_))));
  }
}
