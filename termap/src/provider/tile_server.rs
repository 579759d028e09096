//! HTTP vector tile server source.
//!
//! Tiles are requested as `GET {base}{z}/{x}/{y}.pbf` with
//! `Accept: application/x-protobuf`. The response body is handed on
//! untouched; decoding is the tile parser's job.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::types::{ProviderError, TileSource};
use crate::coord::TileCoord;

/// MIME type requested from the tile server.
pub const PROTOBUF_MIME: &str = "application/x-protobuf";

/// Tile source backed by a remote `{z}/{x}/{y}.pbf` server.
pub struct HttpTileSource<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> HttpTileSource<C> {
    /// Creates a source for the given base URL.
    ///
    /// A missing trailing slash is added. Anything other than an
    /// `http://` or `https://` URL is rejected.
    pub fn new(http_client: C, base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let mut base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ProviderError::UnsupportedSource(base_url));
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL tiles are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for a tile.
    pub fn tile_url(&self, tile: TileCoord) -> String {
        format!("{}{}/{}/{}.pbf", self.base_url, tile.z, tile.x, tile.y)
    }
}

impl<C: AsyncHttpClient> TileSource for HttpTileSource<C> {
    fn fetch_raw(&self, tile: TileCoord) -> BoxFuture<'_, Result<Bytes, ProviderError>> {
        async move {
            let url = self.tile_url(tile);
            debug!(tile = %tile, url = %url, "Fetching tile");

            match self.http_client.get(&url, PROTOBUF_MIME).await {
                Ok(bytes) => {
                    debug!(tile = %tile, bytes = bytes.len(), "Tile fetched");
                    Ok(bytes)
                }
                Err(e) => {
                    warn!(tile = %tile, error = %e, "Failed to fetch tile");
                    Err(e)
                }
            }
        }
        .boxed()
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
