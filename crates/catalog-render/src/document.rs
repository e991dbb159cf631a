//! PDF assembly with `pdf-writer`.
//!
//! Object layout: catalog, page tree, two standard Type1 fonts, document
//! info, then per page a page object and one content stream, and per
//! embeddable photo one image XObject.

use catalog_core::item::Item;
use chrono::Datelike as _;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::warn;

use crate::{
  RenderOptions,
  embed::{self, ColorSpace, EmbeddedImage},
  layout::{Layout, PagePlan, RowPlacement},
  text,
};

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

const NAME_SIZE: f32 = 13.0;
const DETAIL_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 9.0;
const LINE_GAP: f32 = 16.0;

/// Image XObject resource name for the item at `index`.
fn image_name(index: usize) -> String { format!("Im{index}") }

struct Refs {
  next: Ref,
}

impl Refs {
  fn new() -> Self { Self { next: Ref::new(1) } }

  fn bump(&mut self) -> Ref { self.next.bump() }
}

/// Write the full document and return its bytes.
pub fn write(items: &[Item], pages: &[PagePlan], options: &RenderOptions) -> Vec<u8> {
  let layout = &options.layout;
  let mut refs = Refs::new();
  let catalog_id = refs.bump();
  let tree_id = refs.bump();
  let regular_id = refs.bump();
  let bold_id = refs.bump();
  let info_id = refs.bump();

  // Prepare every photo up front so a page only references images that were
  // actually written.
  let images: Vec<Option<(Ref, EmbeddedImage)>> = items
    .iter()
    .map(|item| {
      let photo = item.photo()?;
      match embed::prepare(photo, &options.imaging) {
        Ok(image) => Some((refs.bump(), image)),
        Err(reason) => {
          warn!(
            article_number = %item.article_number,
            %reason,
            "Stored photo cannot be embedded; drawing placeholder"
          );
          None
        }
      }
    })
    .collect();

  let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (refs.bump(), refs.bump())).collect();

  let mut pdf = Pdf::new();
  pdf.catalog(catalog_id).pages(tree_id);
  pdf
    .pages(tree_id)
    .kids(page_ids.iter().map(|(page, _)| *page))
    .count(page_ids.len() as i32);

  for (id, base) in [(regular_id, Name(b"Helvetica")), (bold_id, Name(b"Helvetica-Bold"))] {
    pdf
      .type1_font(id)
      .base_font(base)
      .encoding_predefined(Name(b"WinAnsiEncoding"));
  }

  let created = Date::new(options.date.year() as u16)
    .month(options.date.month() as u8)
    .day(options.date.day() as u8);
  pdf
    .document_info(info_id)
    .title(TextStr(&options.title))
    .producer(TextStr(concat!("catalog-render ", env!("CARGO_PKG_VERSION"))))
    .creation_date(created);

  let total = pages.len();
  for (index, (plan, (page_id, content_id))) in pages.iter().zip(&page_ids).enumerate() {
    let mut page = pdf.page(*page_id);
    page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height));
    page.parent(tree_id);
    page.contents(*content_id);

    let mut resources = page.resources();
    let mut fonts = resources.fonts();
    fonts.pair(REGULAR, regular_id);
    fonts.pair(BOLD, bold_id);
    fonts.finish();

    let mut x_objects = resources.x_objects();
    for row in &plan.rows {
      if let Some((image_id, _)) = &images[row.item] {
        let name = image_name(row.item);
        x_objects.pair(Name(name.as_bytes()), *image_id);
      }
    }
    x_objects.finish();
    resources.finish();
    page.finish();

    let mut content = Content::new();
    for row in &plan.rows {
      let image = images[row.item].as_ref().map(|(_, image)| image);
      draw_row(&mut content, layout, row, &items[row.item], image);
    }
    draw_footer(&mut content, layout, index + 1, total);
    pdf.stream(*content_id, &content.finish());
  }

  for (image_id, image) in images.iter().flatten() {
    let mut xobject = pdf.image_xobject(*image_id, &image.data);
    xobject.filter(Filter::DctDecode);
    xobject.width(image.width as i32);
    xobject.height(image.height as i32);
    match image.color {
      ColorSpace::Gray => xobject.color_space().device_gray(),
      ColorSpace::Rgb => xobject.color_space().device_rgb(),
    };
    xobject.bits_per_component(8);
    xobject.finish();
  }

  pdf.finish()
}

fn show(content: &mut Content, font: Name<'_>, size: f32, x: f32, y: f32, s: &str) {
  content.begin_text();
  content.set_font(font, size);
  content.next_line(x, y);
  content.show(Str(&text::win_ansi(s)));
  content.end_text();
}

fn draw_row(
  content: &mut Content,
  layout: &Layout,
  row: &RowPlacement,
  item: &Item,
  image: Option<&EmbeddedImage>,
) {
  let left = layout.margin;
  let side = layout.image_box();
  let box_x = left + layout.padding;
  let box_y = row.top - layout.padding - side;

  match image {
    Some(image) => {
      let (w, h) = embed::fit_box(image.width, image.height, side);
      let x = box_x + (side - w) / 2.0;
      let y = box_y + (side - h) / 2.0;
      content.save_state();
      content.transform([w, 0.0, 0.0, h, x, y]);
      content.x_object(Name(image_name(row.item).as_bytes()));
      content.restore_state();
    }
    None => {
      content.save_state();
      content.set_stroke_gray(0.6);
      content.set_line_width(0.75);
      content.rect(box_x, box_y, side, side);
      content.stroke();
      content.restore_state();
      content.set_fill_gray(0.45);
      let label = "No photo";
      let label_x = box_x + (side - text::approx_width(label, DETAIL_SIZE)) / 2.0;
      let label_y = box_y + side / 2.0 - DETAIL_SIZE / 3.0;
      show(content, REGULAR, DETAIL_SIZE, label_x, label_y, label);
      content.set_fill_gray(0.0);
    }
  }

  let text_x = box_x + side + 2.0 * layout.padding;
  let text_width = layout.page_width - layout.margin - text_x;
  let mut y = row.top - layout.padding - NAME_SIZE;

  let name = text::truncate_to_width(&item.name, NAME_SIZE, text_width);
  show(content, BOLD, NAME_SIZE, text_x, y, &name);
  for line in [
    format!("Article number: {}", item.article_number),
    format!("Size: {} mm", text::measurement(item.size_in_mm)),
    format!("Weight: {} g", text::measurement(item.weight_in_g)),
  ] {
    y -= LINE_GAP;
    let line = text::truncate_to_width(&line, DETAIL_SIZE, text_width);
    show(content, REGULAR, DETAIL_SIZE, text_x, y, &line);
  }

  // Separator along the bottom edge of the row.
  let bottom = row.top - layout.row_height;
  content.save_state();
  content.set_stroke_gray(0.85);
  content.set_line_width(0.5);
  content.move_to(left, bottom);
  content.line_to(layout.page_width - layout.margin, bottom);
  content.stroke();
  content.restore_state();
}

fn draw_footer(content: &mut Content, layout: &Layout, page: usize, total: usize) {
  let label = format!("Page {page} of {total}");
  let x = (layout.page_width - text::approx_width(&label, FOOTER_SIZE)) / 2.0;
  let y = layout.margin / 2.0 - FOOTER_SIZE / 3.0;
  content.set_fill_gray(0.3);
  show(content, REGULAR, FOOTER_SIZE, x, y, &label);
  content.set_fill_gray(0.0);
}
