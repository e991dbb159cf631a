//! [`SqliteStore`]: the SQLite implementation of [`ItemStore`].

use std::{collections::HashMap, path::Path};

use catalog_core::{
  codec::AssetEncoding,
  item::{Item, ItemId, ItemSummary, NewItem},
  store::{ItemQuery, ItemStore, Page, PageRequest},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::info;

use crate::{
  Error, Result,
  encode::{ITEM_COLUMNS, RawAsset, RawItem, RawSummary, encode_dt},
  legacy,
  schema::{PHOTO, SCHEMA, THUMBNAIL},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, initialise the schema, and upgrade
  /// any legacy rows.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  /// Wrap an already-open connection, initialising it like [`Self::open`].
  pub async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    store.upgrade_legacy().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Move rows from the legacy `item` table into the current tables. A no-op
  /// when there is nothing to upgrade. Returns the number of rows moved.
  pub async fn upgrade_legacy(&self) -> Result<usize> {
    let upgraded = self
      .conn
      .call(|conn| Ok(legacy::upgrade(conn)?))
      .await??;
    if upgraded > 0 {
      info!(rows = upgraded, "Upgraded legacy catalog rows");
    }
    Ok(upgraded)
  }

  /// Insert an item and its assets in one transaction, relying solely on the
  /// unique index to reject duplicates. [`ItemStore::create`] runs the
  /// pre-check first.
  pub(crate) async fn insert_item(&self, item: NewItem) -> Result<Item> {
    let article_number = item.article_number.clone();
    let created_at = Utc::now();
    let created_at_str = encode_dt(created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let insert = tx.execute(
          "INSERT INTO items (article_number, name, size_in_mm, weight_in_g, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            item.article_number,
            item.name,
            item.size_in_mm,
            item.weight_in_g,
            created_at_str,
          ],
        );
        match insert {
          Ok(_) => {}
          // Dropping `tx` rolls the transaction back.
          Err(e) if is_unique_violation(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();

        if let Some(images) = &item.images {
          let mut stmt = tx.prepare(
            "INSERT INTO item_assets (item_id, kind, encoding, data)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for (kind, data) in [(PHOTO, &images.photo), (THUMBNAIL, &images.thumbnail)] {
            stmt.execute(rusqlite::params![
              id,
              kind,
              AssetEncoding::Binary.as_str(),
              data
            ])?;
          }
        }

        tx.commit()?;

        Ok(Some(Item {
          id,
          article_number: item.article_number,
          name: item.name,
          size_in_mm: item.size_in_mm,
          weight_in_g: item.weight_in_g,
          created_at,
          images: item.images,
        }))
      })
      .await?;

    let item = inserted.ok_or(Error::DuplicateArticleNumber(article_number))?;
    info!(id = item.id, article_number = %item.article_number, "Item created");
    Ok(item)
  }
}

/// Whether `e` is a UNIQUE constraint failure.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Escape `%`, `_` and `\` so a search term matches literally under
/// `LIKE ... ESCAPE '\'`.
fn like_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

fn load_assets(conn: &rusqlite::Connection, item_id: i64) -> rusqlite::Result<Vec<RawAsset>> {
  let mut stmt =
    conn.prepare("SELECT kind, encoding, data FROM item_assets WHERE item_id = ?1")?;
  stmt
    .query_map(rusqlite::params![item_id], RawAsset::from_row)?
    .collect()
}

fn summaries(raws: Vec<RawSummary>, total: i64, page: PageRequest) -> Result<Page<ItemSummary>> {
  let items = raws
    .into_iter()
    .map(RawSummary::into_summary)
    .collect::<Result<Vec<_>>>()?;
  Ok(Page::new(items, total.max(0) as u64, page))
}

// ─── ItemStore impl ──────────────────────────────────────────────────────────

impl ItemStore for SqliteStore {
  type Error = Error;

  async fn exists(&self, article_number: &str) -> Result<bool> {
    let article_number = article_number.to_owned();
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM items WHERE article_number = ?1)",
          rusqlite::params![article_number],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn create(&self, item: NewItem) -> Result<Item> {
    if self.exists(&item.article_number).await? {
      return Err(Error::DuplicateArticleNumber(item.article_number));
    }
    self.insert_item(item).await
  }

  async fn delete(&self, article_number: &str) -> Result<()> {
    let key = article_number.to_owned();
    let deleted: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id: Option<i64> = tx
          .query_row(
            "SELECT id FROM items WHERE article_number = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?;
        let Some(id) = id else {
          return Ok(None);
        };

        tx.execute("DELETE FROM item_assets WHERE item_id = ?1", rusqlite::params![id])?;
        tx.execute("DELETE FROM items WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    match deleted {
      Some(id) => {
        info!(id, article_number, "Item deleted");
        Ok(())
      }
      None => Err(Error::NotFound(article_number.to_owned())),
    }
  }

  async fn get(&self, id: ItemId) -> Result<Option<Item>> {
    let raw = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.id = ?1"),
            rusqlite::params![id],
            RawItem::from_row,
          )
          .optional()?;
        let Some(row) = row else {
          return Ok(None);
        };
        let assets = load_assets(conn, row.id)?;
        Ok(Some((row, assets)))
      })
      .await?;

    raw.map(|(row, assets)| row.into_item(assets)).transpose()
  }

  async fn get_by_article_number(&self, article_number: &str) -> Result<Option<Item>> {
    let key = article_number.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.article_number = ?1"),
            rusqlite::params![key],
            RawItem::from_row,
          )
          .optional()?;
        let Some(row) = row else {
          return Ok(None);
        };
        let assets = load_assets(conn, row.id)?;
        Ok(Some((row, assets)))
      })
      .await?;

    raw.map(|(row, assets)| row.into_item(assets)).transpose()
  }

  async fn list(&self, page: PageRequest) -> Result<Page<ItemSummary>> {
    let limit = i64::from(page.page_size());
    let offset = page.offset() as i64;

    let (raws, total) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS}, a.encoding, a.data
           FROM items i
           LEFT JOIN item_assets a ON a.item_id = i.id AND a.kind = 'thumbnail'
           ORDER BY i.id
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    summaries(raws, total, page)
  }

  async fn search(&self, query: &ItemQuery) -> Result<Page<ItemSummary>> {
    // SQLite's LIKE is case-insensitive for ASCII. Measurements are matched
    // against their text rendering, e.g. 12.5 matches "2.5".
    let pattern = like_pattern(query.term.trim());
    let page = query.page;
    let limit = i64::from(page.page_size());
    let offset = page.offset() as i64;

    let (raws, total) = self
      .conn
      .call(move |conn| {
        let filter = r"
             i.name                     LIKE ?1 ESCAPE '\'
          OR i.article_number           LIKE ?1 ESCAPE '\'
          OR CAST(i.size_in_mm AS TEXT)  LIKE ?1 ESCAPE '\'
          OR CAST(i.weight_in_g AS TEXT) LIKE ?1 ESCAPE '\'";

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM items i WHERE {filter}"),
          rusqlite::params![pattern],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS}, a.encoding, a.data
           FROM items i
           LEFT JOIN item_assets a ON a.item_id = i.id AND a.kind = 'thumbnail'
           WHERE {filter}
           ORDER BY i.id
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit, offset], RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    summaries(raws, total, page)
  }

  async fn all_items(&self) -> Result<Vec<Item>> {
    let (rows, mut assets) = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items i ORDER BY i.id"))?;
        let rows = stmt
          .query_map([], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt =
          conn.prepare("SELECT item_id, kind, encoding, data FROM item_assets")?;
        let mut assets: HashMap<i64, Vec<RawAsset>> = HashMap::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
          let item_id: i64 = row.get(0)?;
          assets.entry(item_id).or_default().push(RawAsset {
            kind:     row.get(1)?,
            encoding: row.get(2)?,
            data:     crate::encode::asset_bytes(row, 3)?.unwrap_or_default(),
          });
        }
        Ok((rows, assets))
      })
      .await?;

    rows
      .into_iter()
      .map(|row| {
        let own = assets.remove(&row.id).unwrap_or_default();
        row.into_item(own)
      })
      .collect()
  }
}
