//! SQLite backend for the inventory catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Opening a store also upgrades rows
//! left behind by the legacy schema (see [`legacy`]).

mod encode;
mod schema;
mod store;

pub mod error;
pub mod legacy;

pub use error::{Error, Result};
pub use store::SqliteStore;
