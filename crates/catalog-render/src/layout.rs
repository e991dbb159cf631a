//! Page geometry and row pagination.
//!
//! All lengths are PDF points (1/72 inch) with the origin at the bottom-left
//! corner of the page.

use crate::{Error, Result};

/// A4 portrait.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// Fixed page geometry for one catalog document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
  pub page_width:  f32,
  pub page_height: f32,
  /// Applied on all four sides. The footer is drawn inside the bottom
  /// margin, so it never competes with rows for content height.
  pub margin:      f32,
  /// Height of one item row, including its padding.
  pub row_height:  f32,
  /// Gap between the row edge and its image box / text block.
  pub padding:     f32,
}

impl Default for Layout {
  fn default() -> Self {
    Self {
      page_width:  A4_WIDTH,
      page_height: A4_HEIGHT,
      margin:      36.0,
      row_height:  120.0,
      padding:     8.0,
    }
  }
}

impl Layout {
  /// Usable height between the top and bottom margins.
  pub fn content_height(&self) -> f32 { self.page_height - 2.0 * self.margin }

  pub fn content_width(&self) -> f32 { self.page_width - 2.0 * self.margin }

  /// Rows that fit on one page: `floor(C / H)`.
  pub fn rows_per_page(&self) -> usize {
    (self.content_height() / self.row_height).floor() as usize
  }

  /// Side length of the square image box at the left of each row.
  pub fn image_box(&self) -> f32 { self.row_height - 2.0 * self.padding }

  /// Reject geometry that cannot hold a single row.
  pub fn validate(&self) -> Result<()> {
    let finite = [
      self.page_width,
      self.page_height,
      self.margin,
      self.row_height,
      self.padding,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
      return Err(Error::InvalidLayout("non-finite dimension".into()));
    }
    if self.margin < 0.0 || self.padding < 0.0 {
      return Err(Error::InvalidLayout("negative margin or padding".into()));
    }
    if self.image_box() <= 0.0 {
      return Err(Error::InvalidLayout(
        "row height leaves no room for the image box".into(),
      ));
    }
    if self.content_width() <= self.row_height {
      return Err(Error::InvalidLayout("page too narrow for a row".into()));
    }
    if self.rows_per_page() == 0 {
      return Err(Error::InvalidLayout(format!(
        "row height {} exceeds content height {}",
        self.row_height,
        self.content_height()
      )));
    }
    Ok(())
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Where one item's row goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
  /// Index into the rendered item sequence.
  pub item: usize,
  /// Y coordinate of the row's top edge.
  pub top:  f32,
}

/// The rows of one page, top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
  pub rows: Vec<RowPlacement>,
}

/// Assign `count` rows to pages.
///
/// Each page takes exactly [`Layout::rows_per_page`] rows. Row `i` lands on
/// page `i / per_page`, in slot `i % per_page` counted down from the top
/// margin, so placement never depends on accumulated float error. An empty
/// sequence still yields a single (empty) page.
pub fn paginate(count: usize, layout: &Layout) -> Vec<PagePlan> {
  let top = layout.page_height - layout.margin;
  let per_page = layout.rows_per_page().max(1);

  let mut pages = vec![PagePlan::default(); count.div_ceil(per_page).max(1)];
  for item in 0..count {
    let slot = item % per_page;
    pages[item / per_page].rows.push(RowPlacement {
      item,
      top: top - slot as f32 * layout.row_height,
    });
  }

  pages
}
