//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Catalog(#[from] catalog_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use catalog_core::Error as E;
    let ApiError::Catalog(e) = self;
    match e {
      E::DuplicateArticleNumber(_) => StatusCode::CONFLICT,
      E::NotFound(_) => StatusCode::NOT_FOUND,
      E::InvalidItem(_) | E::InvalidImageFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
      // Only request bodies reach this: stored assets that fail to decode
      // arrive as `Storage`.
      E::Decode(_) => StatusCode::BAD_REQUEST,
      E::Render(_) | E::Storage(_) | E::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "Request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
