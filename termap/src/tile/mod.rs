//! Tile payload parsing.
//!
//! The tile cache stores whatever a [`TileParser`] produces from the raw
//! transport payload. Decoding vector geometry lives outside this crate;
//! [`RawTileParser`] is the default and keeps the decoded protobuf bytes
//! opaque.

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

use crate::coord::TileCoord;

/// Magic bytes at the start of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A tile payload could not be turned into tile data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse tile {tile}: {message}")]
pub struct ParseError {
    pub tile: TileCoord,
    pub message: String,
}

impl ParseError {
    pub fn new(tile: TileCoord, message: impl Into<String>) -> Self {
        Self {
            tile,
            message: message.into(),
        }
    }
}

/// Turns raw transport bytes into tile data of type `T`.
pub trait TileParser<T>: Send + Sync {
    fn parse(&self, tile: TileCoord, raw: Bytes) -> BoxFuture<'_, Result<T, ParseError>>;
}

/// An undecoded vector tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTile {
    pub coord: TileCoord,
    pub data: Bytes,
}

impl RawTile {
    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Default parser: inflates gzip-compressed payloads and keeps the rest as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTileParser;

impl RawTileParser {
    fn decode(tile: TileCoord, raw: Bytes) -> Result<RawTile, ParseError> {
        if !raw.starts_with(&GZIP_MAGIC) {
            return Ok(RawTile {
                coord: tile,
                data: raw,
            });
        }

        let mut inflated = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw.as_ref())
            .read_to_end(&mut inflated)
            .map_err(|e| ParseError::new(tile, format!("gzip: {}", e)))?;

        Ok(RawTile {
            coord: tile,
            data: Bytes::from(inflated),
        })
    }
}

impl TileParser<RawTile> for RawTileParser {
    fn parse(&self, tile: TileCoord, raw: Bytes) -> BoxFuture<'_, Result<RawTile, ParseError>> {
        async move { Self::decode(tile, raw) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const TILE: TileCoord = TileCoord { z: 5, x: 17, y: 10 };

    #[tokio::test]
    async fn test_plain_payload_passes_through() {
        let tile = RawTileParser
            .parse(TILE, Bytes::from_static(b"\x1a\x02ab"))
            .await
            .unwrap();
        assert_eq!(tile.coord, TILE);
        assert_eq!(tile.data.as_ref(), b"\x1a\x02ab");
    }

    #[tokio::test]
    async fn test_gzip_payload_is_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"vector tile body").unwrap();
        let compressed = encoder.finish().unwrap();

        let tile = RawTileParser
            .parse(TILE, Bytes::from(compressed))
            .await
            .unwrap();
        assert_eq!(tile.data.as_ref(), b"vector tile body");
        assert_eq!(tile.len(), 16);
    }

    #[tokio::test]
    async fn test_truncated_gzip_is_a_parse_error() {
        let err = RawTileParser
            .parse(TILE, Bytes::from_static(&[0x1f, 0x8b, 0x08]))
            .await
            .unwrap_err();
        assert_eq!(err.tile, TILE);
        assert!(err.to_string().contains("5/17/10"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_an_empty_tile() {
        let tile = RawTileParser.parse(TILE, Bytes::new()).await.unwrap();
        assert!(tile.is_empty());
    }
}
