//! JSON REST API for the inventory catalog.
//!
//! Exposes an axum [`Router`] backed by a [`Catalog`] over any
//! [`catalog_core::store::ItemStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", catalog_api::api_router(Arc::new(Catalog::new(store))))
//! ```

pub mod articles;
pub mod error;
pub mod etag;
pub mod export;
pub mod items;
pub mod search;
pub mod service;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get},
};
use catalog_core::store::ItemStore;

pub use error::ApiError;
pub use service::{Catalog, NewItemInput};

/// Largest accepted request body. Uploads travel base64-encoded inside JSON.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(catalog: Arc<Catalog<S>>) -> Router<()>
where
  S: ItemStore + 'static,
{
  Router::new()
    // Items
    .route("/items", get(items::list::<S>).post(items::create::<S>))
    .route("/items/{id}", get(items::get_one::<S>))
    .route("/items/{id}/photo", get(items::photo::<S>))
    .route("/items/{id}/thumbnail", get(items::thumbnail::<S>))
    .route(
      "/items/by-article/{article_number}",
      delete(items::delete_by_article::<S>),
    )
    // Articles
    .route(
      "/articles/{article_number}/exists",
      get(articles::exists::<S>),
    )
    // Search and export
    .route("/search", get(search::handler::<S>))
    .route("/export", get(export::handler::<S>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .with_state(catalog)
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use catalog_core::codec;
  use catalog_store_sqlite::SqliteStore;
  use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(Catalog::new(store)))
  }

  fn jpeg_b64(width: u32, height: u32) -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([50, 60, 70])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg).unwrap();
    codec::encode(&buf)
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: Vec<(header::HeaderName, String)>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn bolt(photo: Option<String>) -> Value {
    let photo = photo.unwrap_or_else(|| jpeg_b64(40, 30));
    json!({
      "article_number": "A-100",
      "name": "Bolt",
      "size_in_mm": 40.0,
      "weight_in_g": 12.5,
      "photo": photo,
    })
  }

  // ── Create ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_base64_images() {
    let app = router().await;
    let resp = send(&app, "POST", "/items", vec![], Some(bolt(Some(jpeg_b64(900, 600))))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["article_number"], "A-100");
    let thumb = codec::decode(body["images"]["thumbnail"].as_str().unwrap()).unwrap();
    let thumb = image::load_from_memory(&thumb).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (100, 67));
  }

  #[tokio::test]
  async fn duplicate_create_returns_409() {
    let app = router().await;
    send(&app, "POST", "/items", vec![], Some(bolt(None))).await;
    let resp = send(&app, "POST", "/items", vec![], Some(bolt(None))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("A-100"));
  }

  #[tokio::test]
  async fn non_image_photo_returns_422() {
    let app = router().await;
    let resp = send(
      &app,
      "POST",
      "/items",
      vec![],
      Some(bolt(Some(codec::encode(b"hello, world")))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let exists = send(&app, "GET", "/articles/A-100/exists", vec![], None).await;
    assert_eq!(json_body(exists).await, json!({ "exists": false }));
  }

  #[tokio::test]
  async fn missing_photo_returns_422_and_stores_nothing() {
    let app = router().await;
    let mut body = bolt(None);
    body.as_object_mut().unwrap().remove("photo");
    let resp = send(&app, "POST", "/items", vec![], Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("photo"));

    let list = json_body(send(&app, "GET", "/items", vec![], None).await).await;
    assert_eq!(list["total"], 0);
  }

  #[tokio::test]
  async fn malformed_base64_returns_400() {
    let app = router().await;
    let resp = send(&app, "POST", "/items", vec![], Some(bolt(Some("***".into())))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Read ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_unknown_item_returns_404() {
    let app = router().await;
    let resp = send(&app, "GET", "/items/99", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn photo_supports_conditional_get() {
    let app = router().await;
    let created = send(&app, "POST", "/items", vec![], Some(bolt(Some(jpeg_b64(300, 200))))).await;
    let id = json_body(created).await["id"].as_i64().unwrap();

    let resp = send(&app, "GET", &format!("/items/{id}/photo"), vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_owned();

    let resp = send(
      &app,
      "GET",
      &format!("/items/{id}/photo"),
      vec![(header::IF_NONE_MATCH, etag.clone())],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    let resp = send(
      &app,
      "GET",
      &format!("/items/{id}/thumbnail"),
      vec![(header::IF_NONE_MATCH, etag)],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn photo_of_unknown_item_returns_404() {
    let app = router().await;
    let resp = send(&app, "GET", "/items/41/photo", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_and_search_page_results() {
    let app = router().await;
    for (article, name) in [("A-1", "Hex bolt"), ("A-2", "Hex nut"), ("A-3", "Washer")] {
      let mut body = bolt(None);
      body["article_number"] = json!(article);
      body["name"] = json!(name);
      send(&app, "POST", "/items", vec![], Some(body)).await;
    }

    let list = json_body(send(&app, "GET", "/items?page=2&page_size=2", vec![], None).await).await;
    assert_eq!(list["total"], 3);
    assert_eq!(list["total_pages"], 2);
    assert_eq!(list["items"][0]["name"], "Washer");

    let found = json_body(send(&app, "GET", "/search?term=hex", vec![], None).await).await;
    assert_eq!(found["total"], 2);
  }

  // ── Delete ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_then_delete_again() {
    let app = router().await;
    send(&app, "POST", "/items", vec![], Some(bolt(None))).await;

    let resp = send(&app, "DELETE", "/items/by-article/A-100", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, "DELETE", "/items/by-article/A-100", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Export ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn export_returns_pdf_attachment() {
    let app = router().await;
    send(&app, "POST", "/items", vec![], Some(bolt(Some(jpeg_b64(200, 100))))).await;

    let resp = send(&app, "GET", "/export", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"catalog-"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
  }
}
