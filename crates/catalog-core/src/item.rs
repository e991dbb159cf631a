//! Item types: the catalog entry and its derived images.
//!
//! An item is created once by the add pipeline and never edited afterwards;
//! the only lifecycle event is deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, codec};

/// Surrogate identity assigned by the store on creation.
pub type ItemId = i64;

// ─── Images ──────────────────────────────────────────────────────────────────

/// The two derived images of an item. They are produced together and stored
/// together, so they are modelled as one value: an item either has both or
/// neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImages {
  /// Normalized photo: opaque JPEG, longer edge at most 800 px.
  #[serde(with = "codec::base64_bytes")]
  pub photo:     Vec<u8>,
  /// JPEG derived from `photo`, longer edge at most 100 px.
  #[serde(with = "codec::base64_bytes")]
  pub thumbnail: Vec<u8>,
}

// ─── Item ────────────────────────────────────────────────────────────────────

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id:             ItemId,
  /// Business key; unique across the whole store.
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  /// Server-assigned; never changes after creation.
  pub created_at:     DateTime<Utc>,
  pub images:         Option<ItemImages>,
}

impl Item {
  pub fn photo(&self) -> Option<&[u8]> {
    self.images.as_ref().map(|i| i.photo.as_slice())
  }

  pub fn thumbnail(&self) -> Option<&[u8]> {
    self.images.as_ref().map(|i| i.thumbnail.as_slice())
  }

  /// The list-view projection of this item.
  pub fn summary(&self) -> ItemSummary {
    ItemSummary {
      id:             self.id,
      article_number: self.article_number.clone(),
      name:           self.name.clone(),
      size_in_mm:     self.size_in_mm,
      weight_in_g:    self.weight_in_g,
      created_at:     self.created_at,
      thumbnail:      self.thumbnail().map(<[u8]>::to_vec),
    }
  }
}

/// What list and search views return: the scalar fields plus the thumbnail.
/// Full photos are only loaded by single-item reads and the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
  pub id:             ItemId,
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  pub created_at:     DateTime<Utc>,
  #[serde(default, with = "codec::base64_bytes_opt")]
  pub thumbnail:      Option<Vec<u8>>,
}

// ─── NewItem ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::ItemStore::create`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
  pub article_number: String,
  pub name:           String,
  pub size_in_mm:     f64,
  pub weight_in_g:    f64,
  pub images:         Option<ItemImages>,
}

impl NewItem {
  /// Convenience constructor for an item without images.
  pub fn new(
    article_number: impl Into<String>,
    name: impl Into<String>,
    size_in_mm: f64,
    weight_in_g: f64,
  ) -> Self {
    Self {
      article_number: article_number.into(),
      name: name.into(),
      size_in_mm,
      weight_in_g,
      images: None,
    }
  }

  pub fn with_images(mut self, images: ItemImages) -> Self {
    self.images = Some(images);
    self
  }

  /// Check the scalar fields. Article number and name must be non-blank,
  /// measurements must be finite and strictly positive.
  pub fn validate(&self) -> Result<()> {
    if self.article_number.trim().is_empty() {
      return Err(Error::InvalidItem("article number must not be empty".into()));
    }
    if self.name.trim().is_empty() {
      return Err(Error::InvalidItem("name must not be empty".into()));
    }
    check_measurement("size_in_mm", self.size_in_mm)?;
    check_measurement("weight_in_g", self.weight_in_g)?;
    Ok(())
  }
}

fn check_measurement(field: &str, value: f64) -> Result<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(Error::InvalidItem(format!(
      "{field} must be a positive number, got {value}"
    )))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn validate_accepts_a_well_formed_item() {
    assert!(NewItem::new("A-100", "Bolt", 12.5, 3.2).validate().is_ok());
  }

  #[test]
  fn validate_rejects_blank_fields() {
    let err = NewItem::new("  ", "Bolt", 1.0, 1.0).validate().unwrap_err();
    assert!(matches!(err, Error::InvalidItem(_)));

    let err = NewItem::new("A-1", "", 1.0, 1.0).validate().unwrap_err();
    assert!(matches!(err, Error::InvalidItem(_)));
  }

  #[test]
  fn validate_rejects_non_positive_measurements() {
    for (size, weight) in [(0.0, 1.0), (1.0, -2.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
      let err = NewItem::new("A-1", "Bolt", size, weight)
        .validate()
        .unwrap_err();
      assert!(matches!(err, Error::InvalidItem(_)), "{size} / {weight}");
    }
  }

  #[test]
  fn images_serialize_as_base64_text() {
    let item = Item {
      id:             7,
      article_number: "A-100".into(),
      name:           "Bolt".into(),
      size_in_mm:     12.5,
      weight_in_g:    3.2,
      created_at:     Utc.timestamp_opt(0, 0).unwrap(),
      images:         Some(ItemImages {
        photo:     vec![0xFF, 0xD8, 0xFF],
        thumbnail: vec![1, 2, 3],
      }),
    };

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["images"]["photo"], "/9j/");
    assert_eq!(json["images"]["thumbnail"], "AQID");

    let back: Item = serde_json::from_value(json).unwrap();
    assert_eq!(back, item);
  }

  #[test]
  fn summary_carries_thumbnail_only() {
    let item = Item {
      id:             1,
      article_number: "A-1".into(),
      name:           "Nut".into(),
      size_in_mm:     4.0,
      weight_in_g:    0.5,
      created_at:     Utc.timestamp_opt(0, 0).unwrap(),
      images:         Some(ItemImages {
        photo:     vec![9; 16],
        thumbnail: vec![1],
      }),
    };
    let summary = item.summary();
    assert_eq!(summary.thumbnail.as_deref(), Some(&[1u8][..]));
    assert_eq!(summary.article_number, "A-1");
  }
}
