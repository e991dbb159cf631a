//! Handler for `GET /search`.
//!
//! `term` is matched case-insensitively against the name, the article number,
//! and both measurements rendered as text. A missing term matches everything.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use catalog_core::{
  item::ItemSummary,
  store::{DEFAULT_PAGE_SIZE, ItemStore, Page, PageRequest},
};
use serde::Deserialize;

use crate::{error::ApiError, service::Catalog};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub term:      String,
  pub page:      Option<u32>,
  pub page_size: Option<u32>,
}

/// `GET /search[?term=...][&page=...][&page_size=...]`
pub async fn handler<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Page<ItemSummary>>, ApiError>
where
  S: ItemStore + 'static,
{
  let page = PageRequest::new(
    params.page.unwrap_or(1),
    params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
  );
  let results = catalog.search_items(params.term, page).await?;
  Ok(Json(results))
}
