//! Upgrade path for the first storage generation.
//!
//! The legacy `item` table keys rows by article number, keeps sizes in inches
//! and weights as free text, and holds both images as base64 TEXT:
//!
//! ```sql
//! CREATE TABLE item (
//!   article_number VARCHAR(100) PRIMARY KEY,
//!   name           VARCHAR(100) NOT NULL,
//!   size_in_inches VARCHAR(100),
//!   weight         VARCHAR(100),
//!   photo          TEXT,
//!   thumbnail      TEXT
//! );
//! ```
//!
//! [`upgrade`] copies every row into `items` / `item_assets` in a single
//! transaction and renames the table to `item_legacy_archive`, so the
//! original text survives and no row is ever imported twice.

use catalog_core::codec::{self, AssetEncoding};
use catalog_imaging::{ImagingConfig, ThumbnailGenerator};
use chrono::Utc;
use rusqlite::{Connection, types::Value};
use tracing::warn;

use crate::{
  Error, Result,
  encode::encode_dt,
  schema::{PHOTO, THUMBNAIL},
};

pub const MM_PER_INCH: f64 = 25.4;

/// Name the legacy table is moved to once its rows have been upgraded.
pub const ARCHIVE_TABLE: &str = "item_legacy_archive";

/// One row of the legacy table, as stored.
struct LegacyItem {
  article_number: String,
  name:           String,
  size_in_inches: Value,
  weight:         Value,
  photo:          Option<Vec<u8>>,
  thumbnail:      Option<Vec<u8>>,
}

/// Whether `conn` still holds an un-upgraded legacy `item` table.
pub fn needs_upgrade(conn: &Connection) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS(
       SELECT 1 FROM pragma_table_info('item') WHERE name = 'size_in_inches'
     )",
    [],
    |row| row.get(0),
  )
}

/// Parse a legacy measurement. `NULL` and blank text read as `0`.
fn measurement(value: &Value) -> std::result::Result<f64, String> {
  match value {
    Value::Null => Ok(0.0),
    Value::Integer(i) => Ok(*i as f64),
    Value::Real(r) => Ok(*r),
    Value::Text(s) if s.trim().is_empty() => Ok(0.0),
    Value::Text(s) => s
      .trim()
      .parse::<f64>()
      .ok()
      .filter(|v| v.is_finite())
      .ok_or_else(|| format!("unparseable measurement {s:?}")),
    Value::Blob(_) => Err("measurement stored as blob".to_owned()),
  }
}

/// Tag a legacy asset by probing it, and check that it decodes under that
/// tag. Assets are stored verbatim, so a value that fails here would fail on
/// every later read.
fn checked_tag(bytes: &[u8]) -> std::result::Result<AssetEncoding, String> {
  let tag = codec::probe(bytes);
  codec::decode_stored(Some(tag), bytes.to_vec())
    .map(|_| tag)
    .map_err(|e| e.to_string())
}

/// Move all legacy rows into the current tables.
///
/// The outer `Result` carries SQLite failures; the inner one carries row
/// validation failures. Either way nothing is committed unless every row
/// converts. Returns the number of rows moved, `0` when there was no legacy
/// table.
pub fn upgrade(conn: &mut Connection) -> rusqlite::Result<Result<usize>> {
  if !needs_upgrade(conn)? {
    return Ok(Ok(0));
  }

  let tx = conn.transaction()?;

  let rows = {
    let mut stmt = tx.prepare(
      "SELECT article_number, name, size_in_inches, weight, photo, thumbnail
       FROM item ORDER BY rowid",
    )?;
    stmt
      .query_map([], |row| {
        Ok(LegacyItem {
          article_number: row.get(0)?,
          name:           row.get(1)?,
          size_in_inches: row.get(2)?,
          weight:         row.get(3)?,
          photo:          crate::encode::asset_bytes(row, 4)?,
          thumbnail:      crate::encode::asset_bytes(row, 5)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let thumbnails = ThumbnailGenerator::new(&ImagingConfig::default());
  let created_at = encode_dt(Utc::now());
  let count = rows.len();

  for row in rows {
    let fail = |reason: String| Error::LegacyRow {
      article_number: row.article_number.clone(),
      reason,
    };

    let size_in_mm = match measurement(&row.size_in_inches) {
      Ok(inches) => inches * MM_PER_INCH,
      Err(reason) => return Ok(Err(fail(reason))),
    };
    // Legacy weights carry no unit; they are taken as grams.
    let weight_in_g = match measurement(&row.weight) {
      Ok(g) => g,
      Err(reason) => return Ok(Err(fail(reason))),
    };

    let assets = match (row.photo, row.thumbnail) {
      (Some(photo), Some(thumbnail)) => {
        let tags = checked_tag(&photo)
          .map_err(|reason| format!("photo: {reason}"))
          .and_then(|p| {
            checked_tag(&thumbnail)
              .map(|t| (p, t))
              .map_err(|reason| format!("thumbnail: {reason}"))
          });
        match tags {
          Ok((photo_tag, thumb_tag)) => {
            vec![(PHOTO, photo_tag, photo), (THUMBNAIL, thumb_tag, thumbnail)]
          }
          Err(reason) => return Ok(Err(fail(reason))),
        }
      }
      (Some(photo), None) => {
        let tag = codec::probe(&photo);
        let generated = codec::decode_stored(Some(tag), photo.clone())
          .map_err(|e| e.to_string())
          .and_then(|raw| thumbnails.generate(&raw).map_err(|e| e.to_string()));
        match generated {
          Ok(thumb) => vec![
            (PHOTO, tag, photo),
            (THUMBNAIL, AssetEncoding::Binary, thumb.data),
          ],
          Err(reason) => return Ok(Err(fail(format!("photo: {reason}")))),
        }
      }
      (None, Some(_)) => {
        warn!(
          article_number = %row.article_number,
          "Legacy row has a thumbnail but no photo; importing without images"
        );
        Vec::new()
      }
      (None, None) => Vec::new(),
    };

    let insert = tx.execute(
      "INSERT INTO items (article_number, name, size_in_mm, weight_in_g, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![row.article_number, row.name, size_in_mm, weight_in_g, created_at],
    );
    match insert {
      Ok(_) => {}
      Err(e) if crate::store::is_unique_violation(&e) => {
        return Ok(Err(Error::DuplicateArticleNumber(row.article_number)));
      }
      Err(e) => return Err(e),
    }
    let id = tx.last_insert_rowid();

    for (kind, encoding, data) in assets {
      tx.execute(
        "INSERT INTO item_assets (item_id, kind, encoding, data) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, kind, encoding.as_str(), data],
      )?;
    }
  }

  tx.execute_batch(&format!("ALTER TABLE item RENAME TO {ARCHIVE_TABLE}"))?;
  tx.commit()?;
  Ok(Ok(count))
}
