//! [`Catalog`]: the catalog's operations, orchestrated over an [`ItemStore`].
//!
//! Every HTTP handler and the server's `--export` mode go through this type.
//! CPU-bound work (image derivation, PDF rendering) is moved onto tokio's
//! blocking pool so it never stalls the reactor.

use catalog_core::{
  Error, Result,
  item::{Item, ItemId, ItemImages, ItemSummary, NewItem},
  store::{ItemQuery, ItemStore, Page, PageRequest},
};
use catalog_imaging::ImagingConfig;
use catalog_render::{CatalogDocument, DEFAULT_TITLE, RenderOptions};
use chrono::Utc;
use tracing::{debug, info};

/// The input to [`Catalog::add_item`]: scalar fields plus the raw upload.
#[derive(Debug, Clone)]
pub struct NewItemInput {
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  /// Raw image bytes as uploaded, in any supported format. Required: a new
  /// item always goes through the full image pipeline.
  pub photo:          Vec<u8>,
}

fn store_error<E: Into<Error>>(e: E) -> Error { e.into() }

pub struct Catalog<S> {
  store:   S,
  imaging: ImagingConfig,
  title:   String,
}

impl<S: ItemStore> Catalog<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      imaging: ImagingConfig::default(),
      title: DEFAULT_TITLE.to_owned(),
    }
  }

  pub fn with_imaging(mut self, imaging: ImagingConfig) -> Self {
    self.imaging = imaging;
    self
  }

  /// Title written into exported documents.
  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  /// Validate, derive images, and persist a new item.
  ///
  /// The uniqueness pre-check runs before any image work so a duplicate
  /// upload is rejected cheaply; the store re-checks at commit.
  pub async fn add_item(&self, input: NewItemInput) -> Result<Item> {
    let draft = NewItem::new(
      input.article_number,
      input.name,
      input.size_in_mm,
      input.weight_in_g,
    );
    draft.validate()?;

    if self.article_number_exists(&draft.article_number).await? {
      return Err(Error::DuplicateArticleNumber(draft.article_number));
    }

    let images = self.derive(input.photo).await?;
    self
      .store
      .create(draft.with_images(images))
      .await
      .map_err(store_error)
  }

  async fn derive(&self, raw: Vec<u8>) -> Result<ItemImages> {
    let config = self.imaging;
    let derived = tokio::task::spawn_blocking(move || {
      catalog_imaging::derive_images(&raw, &config)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))??;

    debug!(
      photo_width = derived.photo.width,
      photo_height = derived.photo.height,
      thumbnail_width = derived.thumbnail.width,
      thumbnail_height = derived.thumbnail.height,
      "Derived item images"
    );
    Ok(derived.into())
  }

  pub async fn delete_item(&self, article_number: &str) -> Result<()> {
    self.store.delete(article_number).await.map_err(store_error)
  }

  pub async fn get_item(&self, id: ItemId) -> Result<Item> {
    self
      .store
      .get(id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound(format!("item {id}")))
  }

  pub async fn article_number_exists(&self, article_number: &str) -> Result<bool> {
    self.store.exists(article_number).await.map_err(store_error)
  }

  pub async fn list_items(&self, page: PageRequest) -> Result<Page<ItemSummary>> {
    self.store.list(page).await.map_err(store_error)
  }

  pub async fn search_items(
    &self,
    term: impl Into<String>,
    page: PageRequest,
  ) -> Result<Page<ItemSummary>> {
    let query = ItemQuery {
      term: term.into(),
      page,
    };
    self.store.search(&query).await.map_err(store_error)
  }

  /// Render every item, in insertion order, into a dated PDF.
  pub async fn export_catalog(&self) -> Result<CatalogDocument> {
    let items = self.store.all_items().await.map_err(store_error)?;

    let mut options = RenderOptions::new(Utc::now().date_naive());
    options.title = self.title.clone();
    options.imaging = self.imaging;

    let document = tokio::task::spawn_blocking(move || catalog_render::render(&items, &options))
      .await
      .map_err(|e| Error::Task(e.to_string()))??;

    info!(
      filename = %document.filename,
      pages = document.page_count,
      "Catalog exported"
    );
    Ok(document)
  }
}
