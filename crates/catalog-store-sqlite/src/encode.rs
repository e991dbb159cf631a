//! Encoding and decoding helpers between catalog domain types and the values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Image assets are stored as
//! blobs tagged with their [`AssetEncoding`]; decoding always goes through
//! [`codec::decode_stored`] so either storage generation reads back as raw
//! image bytes.

use catalog_core::{
  codec::{self, AssetEncoding},
  item::{Item, ItemImages, ItemSummary},
};
use chrono::{DateTime, Utc};
use rusqlite::{Row, types::ValueRef};

use crate::{
  Error, Result,
  schema::{PHOTO, THUMBNAIL},
};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Assets ──────────────────────────────────────────────────────────────────

/// Read a text or blob column as bytes; `NULL` reads as `None`.
///
/// Legacy rows keep images in TEXT columns, so a plain `Vec<u8>` read would
/// reject them.
pub fn asset_bytes(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<u8>>> {
  match row.get_ref(idx)? {
    ValueRef::Null => Ok(None),
    ValueRef::Text(b) | ValueRef::Blob(b) => Ok(Some(b.to_vec())),
    other => Err(rusqlite::Error::InvalidColumnType(
      idx,
      "asset data".to_owned(),
      other.data_type(),
    )),
  }
}

fn decode_asset(encoding: Option<&str>, data: Vec<u8>) -> Result<Vec<u8>> {
  let tag = encoding.and_then(AssetEncoding::parse);
  codec::decode_stored(tag, data).map_err(Error::Asset)
}

/// Raw values from one `item_assets` row.
pub struct RawAsset {
  pub kind:     String,
  pub encoding: Option<String>,
  pub data:     Vec<u8>,
}

impl RawAsset {
  /// Maps `SELECT kind, encoding, data`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kind:     row.get(0)?,
      encoding: row.get(1)?,
      data:     asset_bytes(row, 2)?.unwrap_or_default(),
    })
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every item read, in this order.
pub const ITEM_COLUMNS: &str =
  "i.id, i.article_number, i.name, i.size_in_mm, i.weight_in_g, i.created_at";

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub id:             i64,
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  pub created_at:     String,
}

impl RawItem {
  /// Maps the leading [`ITEM_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      article_number: row.get(1)?,
      name:           row.get(2)?,
      size_in_mm:     row.get(3)?,
      weight_in_g:    row.get(4)?,
      created_at:     row.get(5)?,
    })
  }

  pub fn into_item(self, assets: Vec<RawAsset>) -> Result<Item> {
    let mut photo = None;
    let mut thumbnail = None;
    for asset in assets {
      let bytes = decode_asset(asset.encoding.as_deref(), asset.data)?;
      match asset.kind.as_str() {
        PHOTO => photo = Some(bytes),
        THUMBNAIL => thumbnail = Some(bytes),
        _ => {}
      }
    }

    let images = match (photo, thumbnail) {
      (Some(photo), Some(thumbnail)) => Some(ItemImages { photo, thumbnail }),
      (None, None) => None,
      _ => return Err(Error::IncompleteAssets(self.id)),
    };

    Ok(Item {
      id: self.id,
      article_number: self.article_number,
      name: self.name,
      size_in_mm: self.size_in_mm,
      weight_in_g: self.weight_in_g,
      created_at: decode_dt(&self.created_at)?,
      images,
    })
  }
}

/// An `items` row joined with its thumbnail asset, if any.
pub struct RawSummary {
  pub item:               RawItem,
  pub thumbnail_encoding: Option<String>,
  pub thumbnail:          Option<Vec<u8>>,
}

impl RawSummary {
  /// Maps [`ITEM_COLUMNS`] followed by `a.encoding, a.data`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item:               RawItem::from_row(row)?,
      thumbnail_encoding: row.get(6)?,
      thumbnail:          asset_bytes(row, 7)?,
    })
  }

  pub fn into_summary(self) -> Result<ItemSummary> {
    let thumbnail = self
      .thumbnail
      .map(|data| decode_asset(self.thumbnail_encoding.as_deref(), data))
      .transpose()?;
    let item = self.item;

    Ok(ItemSummary {
      id: item.id,
      article_number: item.article_number,
      name: item.name,
      size_in_mm: item.size_in_mm,
      weight_in_g: item.weight_in_g,
      created_at: decode_dt(&item.created_at)?,
      thumbnail,
    })
  }
}
