//! HTTP Basic auth: credential parsing, argon2 verification, and the
//! middleware that guards the API.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{FromRequestParts, Request},
  http::{HeaderMap, header, request::Parts},
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use catalog_core::store::ItemStore;
use tracing::debug;

use crate::{AppState, error::Error};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether `creds` match the configured user. An unparseable hash
  /// matches nothing.
  pub fn accepts(&self, creds: &BasicCredentials) -> bool {
    if creds.username != self.username {
      return false;
    }
    let Ok(hash) = PasswordHash::new(&self.password_hash) else {
      return false;
    };
    Argon2::default()
      .verify_password(creds.password.as_bytes(), &hash)
      .is_ok()
  }
}

/// A decoded `Authorization: Basic` header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
  pub username: String,
  pub password: String,
}

impl BasicCredentials {
  /// Parse the `Authorization` header. The scheme name is matched
  /// case-insensitively; the password may itself contain `:`.
  pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
      return None;
    }
    let decoded = B64.decode(encoded.trim()).ok()?;
    let (username, password) = std::str::from_utf8(&decoded).ok()?.split_once(':')?;
    Some(Self {
      username: username.to_owned(),
      password: password.to_owned(),
    })
  }
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Check the request headers against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  match BasicCredentials::from_headers(headers) {
    Some(creds) if config.accepts(&creds) => Ok(()),
    _ => Err(Error::Unauthorized),
  }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: ItemStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth).inspect_err(|_| {
      debug!(method = %parts.method, uri = %parts.uri, "Rejected unauthenticated request");
    })?;
    Ok(Authenticated)
  }
}

/// Route layer for every API endpoint. Rejection happens in the
/// [`Authenticated`] extractor, before the handler runs.
pub async fn require_auth(_: Authenticated, req: Request, next: Next) -> Response {
  next.run(req).await
}
