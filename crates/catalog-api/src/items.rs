//! Handlers for `/items` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/items` | `?page=&page_size=`; summaries with base64 thumbnails |
//! | `POST`   | `/items` | JSON body, `photo` as base64; 201 + item |
//! | `GET`    | `/items/{id}` | full item; 404 if not found |
//! | `GET`    | `/items/{id}/photo` | raw image bytes, ETag + `If-None-Match` |
//! | `GET`    | `/items/{id}/thumbnail` | same, for the thumbnail |
//! | `DELETE` | `/items/by-article/{article_number}` | 204; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use catalog_core::{
  codec,
  item::{Item, ItemId, ItemSummary},
  store::{DEFAULT_PAGE_SIZE, ItemStore, Page, PageRequest},
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_none_match},
  service::{Catalog, NewItemInput},
};

// ─── Paging ──────────────────────────────────────────────────────────────────

/// `?page=&page_size=`; out-of-range values are clamped, not rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page:      Option<u32>,
  pub page_size: Option<u32>,
}

impl PageParams {
  pub fn request(&self) -> PageRequest {
    PageRequest::new(
      self.page.unwrap_or(1),
      self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /items[?page=&page_size=]`
pub async fn list<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<ItemSummary>>, ApiError>
where
  S: ItemStore + 'static,
{
  let page = catalog.list_items(params.request()).await?;
  Ok(Json(page))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  /// Base64, optionally as a `data:` URL. Required; an absent photo is
  /// rejected like an undecodable one.
  #[serde(default)]
  pub photo:          Option<String>,
}

/// `POST /items`
pub async fn create<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ItemStore + 'static,
{
  let photo = body
    .photo
    .as_deref()
    .ok_or_else(|| catalog_core::Error::InvalidImageFormat("photo is required".into()))
    .and_then(codec::decode)?;

  let item = catalog
    .add_item(NewItemInput {
      article_number: body.article_number,
      name: body.name,
      size_in_mm: body.size_in_mm,
      weight_in_g: body.weight_in_g,
      photo,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /items/{id}`
pub async fn get_one<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<ItemId>,
) -> Result<Json<Item>, ApiError>
where
  S: ItemStore + 'static,
{
  Ok(Json(catalog.get_item(id).await?))
}

// ─── Assets ──────────────────────────────────────────────────────────────────

/// Best-effort MIME type from magic bytes. Current assets are always JPEG;
/// legacy rows may hold other formats.
fn sniff_content_type(bytes: &[u8]) -> &'static str {
  match bytes {
    [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
    [0x89, b'P', b'N', b'G', ..] => "image/png",
    [b'G', b'I', b'F', b'8', ..] => "image/gif",
    [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
    [b'B', b'M', ..] => "image/bmp",
    _ => "application/octet-stream",
  }
}

fn asset_response(
  id: ItemId,
  kind: &str,
  bytes: Option<&[u8]>,
  headers: &HeaderMap,
) -> Result<Response, ApiError> {
  let bytes = bytes
    .ok_or_else(|| catalog_core::Error::NotFound(format!("item {id} has no {kind}")))?;
  let etag = compute_etag(bytes);

  if let Some(candidates) = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    && if_none_match(candidates, &etag)
  {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, sniff_content_type(bytes).to_owned()),
        (header::ETAG, etag),
        (header::CACHE_CONTROL, "private, no-cache".to_owned()),
      ],
      bytes.to_vec(),
    )
      .into_response(),
  )
}

/// `GET /items/{id}/photo`
pub async fn photo<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<ItemId>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ItemStore + 'static,
{
  let item = catalog.get_item(id).await?;
  asset_response(id, "photo", item.photo(), &headers)
}

/// `GET /items/{id}/thumbnail`
pub async fn thumbnail<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<ItemId>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ItemStore + 'static,
{
  let item = catalog.get_item(id).await?;
  asset_response(id, "thumbnail", item.thumbnail(), &headers)
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /items/by-article/{article_number}`
pub async fn delete_by_article<S>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(article_number): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ItemStore + 'static,
{
  catalog.delete_item(&article_number).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_params_default_and_clamp() {
    let req = PageParams::default().request();
    assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));

    let req = PageParams {
      page:      Some(0),
      page_size: Some(5000),
    }
    .request();
    assert_eq!((req.page(), req.page_size()), (1, 100));
  }

  #[test]
  fn content_type_sniffing() {
    assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1a\n"), "image/png");
    assert_eq!(sniff_content_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
    assert_eq!(sniff_content_type(b"????"), "application/octet-stream");
  }
}
