//! The `ItemStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `catalog-store-sqlite`).
//! Higher layers (`catalog-api`, `catalog-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemId, ItemSummary, NewItem};

// ─── Paging ──────────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request. Out-of-range values are clamped on construction:
/// page `0` becomes page 1 and the size is kept within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:      u32,
  page_size: u32,
}

impl PageRequest {
  pub fn new(page: u32, page_size: u32) -> Self {
    Self {
      page:      page.max(1),
      page_size: page_size.clamp(1, MAX_PAGE_SIZE),
    }
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn page_size(&self) -> u32 { self.page_size }

  /// Number of rows to skip.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.page_size)
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(1, DEFAULT_PAGE_SIZE) }
}

/// One page of results plus what a caller needs to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// Total number of matching rows across all pages.
  pub total:       u64,
  pub page:        u32,
  pub page_size:   u32,
  pub total_pages: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
    Self {
      items,
      total,
      page: request.page(),
      page_size: request.page_size(),
      total_pages: total.div_ceil(u64::from(request.page_size())),
    }
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ItemStore::search`].
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
  /// Case-insensitive substring matched against the name, the article
  /// number, and both measurements rendered as text. Wildcard characters are
  /// matched literally.
  pub term: String,
  pub page: PageRequest,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a catalog store backend, the only component allowed to
/// mutate persisted items.
///
/// Writes are all-or-nothing: an item is inserted together with both of its
/// images, and deleted together with both of them.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ItemStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Whether an item with this article number exists. Advisory only; the
  /// authoritative check happens inside [`ItemStore::create`].
  fn exists<'a>(
    &'a self,
    article_number: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Persist a new item and its images in one transaction.
  ///
  /// Fails with a duplicate-article-number error both when the pre-check
  /// finds an existing row and when the unique index rejects the insert at
  /// commit time; in either case nothing is written.
  fn create(
    &self,
    item: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Remove an item and both of its images. Fails with a not-found error if
  /// no such article number exists.
  fn delete<'a>(
    &'a self,
    article_number: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve an item by id. Returns `None` if not found.
  fn get(
    &self,
    id: ItemId,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Retrieve an item by article number. Returns `None` if not found.
  fn get_by_article_number<'a>(
    &'a self,
    article_number: &'a str,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + 'a;

  /// One page of items in insertion order.
  fn list(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<ItemSummary>, Self::Error>> + Send + '_;

  /// One page of items matching `query`, in insertion order.
  fn search<'a>(
    &'a self,
    query: &'a ItemQuery,
  ) -> impl Future<Output = Result<Page<ItemSummary>, Self::Error>> + Send + 'a;

  /// Every item with its images, in insertion order. Used by the export.
  fn all_items(
    &self,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;
}
