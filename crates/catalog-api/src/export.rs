//! Handler for `GET /export`: the printable catalog as a PDF download.

use std::sync::Arc;

use axum::{
  extract::State,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use catalog_core::store::ItemStore;

use crate::{error::ApiError, service::Catalog};

/// `GET /export`
pub async fn handler<S>(State(catalog): State<Arc<Catalog<S>>>) -> Result<Response, ApiError>
where
  S: ItemStore + 'static,
{
  let document = catalog.export_catalog().await?;
  let disposition = format!("attachment; filename=\"{}\"", document.filename);

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, document.content_type.to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
      ],
      document.bytes,
    )
      .into_response(),
  )
}
