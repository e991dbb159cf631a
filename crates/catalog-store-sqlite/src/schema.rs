//! SQL schema for the catalog SQLite store.
//!
//! Executed once at connection startup. The schema version lives in
//! `PRAGMA user_version`; version 1 was the legacy single-table layout that
//! [`crate::legacy`] upgrades from.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS items (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    article_number TEXT NOT NULL,
    name           TEXT NOT NULL,
    size_in_mm     REAL NOT NULL,
    weight_in_g    REAL NOT NULL,
    created_at     TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The authoritative uniqueness guarantee; the store's pre-check is advisory.
CREATE UNIQUE INDEX IF NOT EXISTS items_article_number_idx
    ON items(article_number);

-- Photo and thumbnail of an item. Written in the same transaction as the
-- item row and deleted with it.
CREATE TABLE IF NOT EXISTS item_assets (
    item_id  INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    kind     TEXT NOT NULL,  -- 'photo' | 'thumbnail'
    encoding TEXT,           -- 'binary' | 'base64'; NULL means probe on read
    data     BLOB NOT NULL,
    PRIMARY KEY (item_id, kind),
    CHECK (kind IN ('photo', 'thumbnail'))
);

PRAGMA user_version = 2;
";

pub const PHOTO: &str = "photo";
pub const THUMBNAIL: &str = "thumbnail";
