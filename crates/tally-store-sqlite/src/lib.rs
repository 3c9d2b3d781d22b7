//! SQLite backend for the Tally survey store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each store method runs as one closure
//! on that thread, so a transaction opened inside it either commits or rolls
//! back as a unit even if the calling future is dropped.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
