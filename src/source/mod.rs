//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait and the [`Item`] type every
//! source produces. The only concrete source is [`RestSource`], which reads a
//! WordPress-style JSON posts endpoint.
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `feed.rs`).
//! 2. Define a struct and implement [`DataSource`] for it, converting your
//!    format into [`Item`]s and mapping failures onto [`FetchError`].
//! 3. Add `mod feed;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of (or alongside) `RestSource`.
//!
//! The cache, the stale-fetch guard and the slideshow are source-agnostic.

mod item;
mod rest;

pub use item::Item;
pub use rest::RestSource;

#[cfg(test)]
pub(crate) use item::fixtures;

use crate::error::FetchError;

/// Trait that every data source must implement.
///
/// [`fetch()`](DataSource::fetch) runs on the fetch worker's blocking pool,
/// so implementations must be [`Send`] and [`Sync`].
pub trait DataSource: Send + Sync {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch the posts published at `url`, in the order the server lists
    /// them.
    fn fetch(&self, url: &str) -> Result<Vec<Item>, FetchError>;
}
