//! Transport trait and error types.

use bytes::Bytes;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::TileCoord;

/// Errors raised while fetching raw tile payloads.
///
/// Errors are `Clone` because one failed fetch is reported to every caller
/// waiting on the same tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The configured source is not an HTTP(S) URL.
    #[error("Unsupported tile source '{0}': only HTTP/HTTPS tile sources are supported")]
    UnsupportedSource(String),
}

impl ProviderError {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Fetches raw tile payloads.
///
/// Implementations must be `Send + Sync`; the tile cache shares one source
/// across every pending fetch.
pub trait TileSource: Send + Sync {
    /// Fetch the raw, still-encoded payload of a tile.
    fn fetch_raw(&self, tile: TileCoord) -> BoxFuture<'_, Result<Bytes, ProviderError>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
