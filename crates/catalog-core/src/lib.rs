//! Core types and trait definitions for the inventory catalog.
//!
//! This crate is deliberately free of HTTP, database, and image-processing
//! dependencies. All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod codec;
pub mod error;
pub mod item;
pub mod store;

pub use error::{Error, Result};
