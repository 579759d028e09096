//! Vector tile transport
//!
//! This module provides the [`TileSource`] abstraction the tile cache pulls
//! raw tile payloads through, and an HTTP implementation that talks to a
//! standard `{z}/{x}/{y}.pbf` vector tile server.
//!
//! # Example
//!
//! ```ignore
//! use termap::provider::{HttpTileSource, ReqwestClient};
//!
//! let client = ReqwestClient::new()?;
//! let source = HttpTileSource::new(client, "https://tiles.openfreemap.org/planet/map/")?;
//! let bytes = source.fetch_raw(TileCoord::new(5, 17, 10)).await?;
//! ```

mod http;
mod tile_server;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use tile_server::{HttpTileSource, PROTOBUF_MIME};
pub use types::{ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockHttpClient;
