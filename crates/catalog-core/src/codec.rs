//! Binary ↔ text transcoding for image assets.
//!
//! Used at two boundaries: JSON bodies carry images as standard base64, and
//! the store's read path must accept assets written by the legacy schema,
//! which kept images as base64 text (sometimes as `data:` URLs) instead of raw
//! bytes. Every stored asset is tagged with an [`AssetEncoding`]; rows with no
//! tag are classified by [`probe`].

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::Result;

// ─── Encoding tag ────────────────────────────────────────────────────────────

/// How an asset's bytes are laid out in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetEncoding {
  /// Raw image bytes. Every write uses this.
  Binary,
  /// Base64 text of the image bytes (legacy rows).
  Base64,
}

impl AssetEncoding {
  /// The value stored in the `encoding` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Binary => "binary",
      Self::Base64 => "base64",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "binary" => Some(Self::Binary),
      "base64" => Some(Self::Base64),
      _ => None,
    }
  }
}

// ─── Text form ───────────────────────────────────────────────────────────────

/// Encode raw bytes as padded standard base64.
pub fn encode(bytes: &[u8]) -> String { B64.encode(bytes) }

/// Decode base64 text back into raw bytes.
///
/// A leading `data:<mime>;base64,` prefix and embedded ASCII whitespace are
/// tolerated; both occur in legacy rows.
pub fn decode(text: &str) -> Result<Vec<u8>> { decode_bytes(text.as_bytes()) }

fn decode_bytes(input: &[u8]) -> Result<Vec<u8>> {
  let payload = strip_data_url(input.trim_ascii());
  if payload.iter().any(u8::is_ascii_whitespace) {
    let compact: Vec<u8> = payload
      .iter()
      .copied()
      .filter(|b| !b.is_ascii_whitespace())
      .collect();
    Ok(B64.decode(compact)?)
  } else {
    Ok(B64.decode(payload)?)
  }
}

fn strip_data_url(input: &[u8]) -> &[u8] {
  const MARKER: &[u8] = b";base64,";
  if !input.starts_with(b"data:") {
    return input;
  }
  input
    .windows(MARKER.len())
    .position(|w| w == MARKER)
    .map_or(input, |at| &input[at + MARKER.len()..])
}

// ─── Generation detection ────────────────────────────────────────────────────

/// Classify untagged stored bytes.
///
/// Known raster signatures are binary. Otherwise, bytes that consist only of
/// the base64 alphabet (or start with a `data:` URL) are text-encoded.
/// Anything else is treated as binary and left for the image decoder to
/// accept or reject.
pub fn probe(bytes: &[u8]) -> AssetEncoding {
  if has_raster_signature(bytes) {
    return AssetEncoding::Binary;
  }
  if bytes.starts_with(b"data:") {
    return AssetEncoding::Base64;
  }
  let body = bytes.trim_ascii();
  if !body.is_empty() && body.iter().all(|&b| is_base64_byte(b)) {
    AssetEncoding::Base64
  } else {
    AssetEncoding::Binary
  }
}

fn has_raster_signature(bytes: &[u8]) -> bool {
  bytes.starts_with(&[0xFF, 0xD8, 0xFF])
    || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
    || bytes.starts_with(b"GIF87a")
    || bytes.starts_with(b"GIF89a")
    || (bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
}

fn is_base64_byte(b: u8) -> bool {
  b.is_ascii_alphanumeric()
    || matches!(b, b'+' | b'/' | b'=')
    || b.is_ascii_whitespace()
}

/// Turn a stored asset into raw image bytes, whichever generation wrote it.
/// `tag` is the value of the row's `encoding` column, if any.
pub fn decode_stored(tag: Option<AssetEncoding>, bytes: Vec<u8>) -> Result<Vec<u8>> {
  match tag.unwrap_or_else(|| probe(&bytes)) {
    AssetEncoding::Binary => Ok(bytes),
    AssetEncoding::Base64 => decode_bytes(&bytes),
  }
}

// ─── serde adapters ──────────────────────────────────────────────────────────

/// `#[serde(with = "codec::base64_bytes")]` for `Vec<u8>` fields.
pub mod base64_bytes {
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::encode(bytes))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(d)?;
    super::decode(&text).map_err(serde::de::Error::custom)
  }
}

/// `#[serde(with = "codec::base64_bytes_opt")]` for `Option<Vec<u8>>` fields.
pub mod base64_bytes_opt {
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    s: S,
  ) -> Result<S::Ok, S::Error> {
    match bytes {
      Some(b) => s.serialize_some(&super::encode(b)),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<Vec<u8>>, D::Error> {
    Option::<String>::deserialize(d)?
      .map(|text| super::decode(&text).map_err(serde::de::Error::custom))
      .transpose()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn decode_inverts_encode() {
    let bytes: Vec<u8> = (0..=255u8).chain([0, 0, 1]).collect();
    assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    assert_eq!(decode(&encode(&[])).unwrap(), Vec::<u8>::new());
  }

  #[test]
  fn decode_accepts_data_url_and_line_breaks() {
    assert_eq!(decode("data:image/png;base64,AQID").unwrap(), vec![1, 2, 3]);
    assert_eq!(decode("AQ\r\nID\n").unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn decode_rejects_malformed_text() {
    assert!(matches!(decode("not base64!"), Err(Error::Decode(_))));
    assert!(matches!(decode("AQI"), Err(Error::Decode(_))));
  }

  #[test]
  fn probe_recognises_raster_signatures() {
    assert_eq!(probe(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]), AssetEncoding::Binary);
    assert_eq!(probe(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), AssetEncoding::Binary);
    assert_eq!(probe(b"GIF89a\x01\x00"), AssetEncoding::Binary);
  }

  #[test]
  fn probe_recognises_text_encoded_assets() {
    assert_eq!(probe(b"/9j/4AAQSkZJRg=="), AssetEncoding::Base64);
    assert_eq!(probe(b"data:image/jpeg;base64,/9j/"), AssetEncoding::Base64);
    assert_eq!(probe(b"iVBORw0KGgo=\n"), AssetEncoding::Base64);
  }

  #[test]
  fn probe_falls_back_to_binary() {
    assert_eq!(probe(&[0x00, 0x01, 0x02]), AssetEncoding::Binary);
    assert_eq!(probe(b""), AssetEncoding::Binary);
  }

  #[test]
  fn decode_stored_branches_on_tag() {
    let raw = vec![0xFF, 0xD8, 0xFF, 0xDB];
    assert_eq!(
      decode_stored(Some(AssetEncoding::Binary), raw.clone()).unwrap(),
      raw
    );
    assert_eq!(
      decode_stored(Some(AssetEncoding::Base64), encode(&raw).into_bytes()).unwrap(),
      raw
    );
    // Untagged rows are probed.
    assert_eq!(decode_stored(None, encode(&raw).into_bytes()).unwrap(), raw);
    assert_eq!(decode_stored(None, raw.clone()).unwrap(), raw);
  }

  #[test]
  fn encoding_tag_round_trips_through_column_text() {
    for tag in [AssetEncoding::Binary, AssetEncoding::Base64] {
      assert_eq!(AssetEncoding::parse(tag.as_str()), Some(tag));
    }
    assert_eq!(AssetEncoding::parse("hex"), None);
  }
}
