//! Handler for `GET /articles/{article_number}/exists`.
//!
//! Lets a client warn about a taken article number before uploading a photo.
//! The answer is advisory; `POST /items` re-checks.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use catalog_core::store::ItemStore;
use serde::Serialize;

use crate::{error::ApiError, service::Catalog};

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
  pub exists: bool,
}

/// `GET /articles/{article_number}/exists`
pub async fn exists<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(article_number): Path<String>,
) -> Result<Json<ExistsResponse>, ApiError>
where
  S: ItemStore + 'static,
{
  let exists = catalog.article_number_exists(&article_number).await?;
  Ok(Json(ExistsResponse { exists }))
}
