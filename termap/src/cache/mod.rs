//! Tile cache.
//!
//! [`TileCache`] keeps a bounded number of parsed tiles keyed by their
//! pyramid coordinate and fetches misses through a
//! [`TileSource`](crate::provider::TileSource). Concurrent requests for the
//! same tile are coalesced into one fetch.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use termap::cache::TileCache;
//! use termap::tile::RawTileParser;
//!
//! let cache = TileCache::new(Arc::new(RawTileParser), 16).with_source(source);
//! let tile = cache.get_tile(TileCoord::new(5, 17, 10)).await?;
//! ```

mod tile_cache;
mod types;

pub use tile_cache::TileCache;
pub use types::{CacheStats, TileError, TileKey, DEFAULT_CACHE_SIZE};
