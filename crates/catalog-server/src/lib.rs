//! HTTP server for the inventory catalog.
//!
//! Mounts [`catalog_api`] under `/api` behind HTTP Basic auth and wraps the
//! whole router in request tracing. Configuration and the application state
//! shared by every handler live here; the binary in `main.rs` only wires
//! them together.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use catalog_api::Catalog;
use catalog_core::store::ItemStore;
use catalog_imaging::{ImagingConfig, JPEG_QUALITY, PHOTO_MAX_EDGE, THUMBNAIL_MAX_EDGE};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CATALOG_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  #[serde(default)]
  pub auth_username:      String,
  #[serde(default)]
  pub auth_password_hash: String,
  /// Title written into exported catalogs.
  #[serde(default)]
  pub catalog_title:      Option<String>,
  #[serde(default = "default_photo_max_edge")]
  pub photo_max_edge:     u32,
  #[serde(default = "default_thumbnail_max_edge")]
  pub thumbnail_max_edge: u32,
  #[serde(default = "default_jpeg_quality")]
  pub jpeg_quality:       u8,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_photo_max_edge() -> u32 { PHOTO_MAX_EDGE }
fn default_thumbnail_max_edge() -> u32 { THUMBNAIL_MAX_EDGE }
fn default_jpeg_quality() -> u8 { JPEG_QUALITY }

impl ServerConfig {
  /// Imaging settings, clamped to values the encoder accepts.
  pub fn imaging(&self) -> ImagingConfig {
    ImagingConfig {
      photo_max_edge:     self.photo_max_edge.max(1),
      thumbnail_max_edge: self.thumbnail_max_edge.max(1),
      jpeg_quality:       self.jpeg_quality.clamp(1, 100),
    }
  }

  /// Basic-auth credentials, or `None` when either half is unset.
  pub fn auth(&self) -> Option<AuthConfig> {
    if self.auth_username.is_empty() || self.auth_password_hash.is_empty() {
      return None;
    }
    Some(AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    })
  }

  /// Build the [`Catalog`] this configuration describes over `store`.
  pub fn catalog<S: ItemStore>(&self, store: S) -> Catalog<S> {
    let catalog = Catalog::new(store).with_imaging(self.imaging());
    match &self.catalog_title {
      Some(title) => catalog.with_title(title.clone()),
      None => catalog,
    }
  }

  #[cfg(test)]
  pub(crate) fn for_tests(store_path: PathBuf, password_hash: &str) -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      store_path,
      auth_username: "user".to_string(),
      auth_password_hash: password_hash.to_string(),
      catalog_title: None,
      photo_max_edge: PHOTO_MAX_EDGE,
      thumbnail_max_edge: THUMBNAIL_MAX_EDGE,
      jpeg_quality: JPEG_QUALITY,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the auth layer.
pub struct AppState<S> {
  pub catalog: Arc<Catalog<S>>,
  pub auth:    Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      catalog: Arc::clone(&self.catalog),
      auth:    Arc::clone(&self.auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ItemStore + 'static,
{
  let api = catalog_api::api_router(Arc::clone(&state.catalog))
    .route_layer(middleware::from_fn_with_state(state, require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
