//! Cache key, error and statistics types.

use std::fmt;

use thiserror::Error;

use crate::coord::TileCoord;
use crate::provider::ProviderError;
use crate::tile::ParseError;

/// Default number of tiles retained by the cache.
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// Exact-match cache key for one tile.
///
/// Displays as `z-x-y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey(TileCoord);

impl TileKey {
    pub fn tile(&self) -> TileCoord {
        self.0
    }
}

impl From<TileCoord> for TileKey {
    fn from(tile: TileCoord) -> Self {
        Self(tile)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0.z, self.0.x, self.0.y)
    }
}

/// Errors returned by [`TileCache::get_tile`](super::TileCache::get_tile).
///
/// `Clone` so that every caller sharing one fetch receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// No tile source was attached to the cache.
    #[error("No tile source configured")]
    NotConfigured,

    /// The transport failed.
    #[error("Failed to fetch tile: {0}")]
    Provider(#[from] ProviderError),

    /// The payload arrived but could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl TileError {
    /// HTTP status of a transport failure, if the server sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TileError::Provider(e) => e.status(),
            _ => None,
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from a retained entry.
    pub hits: u64,
    /// Requests that started a new fetch.
    pub misses: u64,
    /// Requests that joined a fetch already in flight.
    pub coalesced: u64,
    /// Fetches that failed in transport or parsing.
    pub failures: u64,
    /// Entries dropped to stay within the bound.
    pub evictions: u64,
    /// Entries currently retained.
    pub entry_count: usize,
    /// Fetches currently outstanding.
    pub in_flight: usize,
}

impl CacheStats {
    /// Fraction of requests served without starting a fetch.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            return 0.0;
        }
        (self.hits + self.coalesced) as f64 / total as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiles: {} cached, {} loading | hits {} misses {} coalesced {} failed {} evicted {}",
            self.entry_count,
            self.in_flight,
            self.hits,
            self.misses,
            self.coalesced,
            self.failures,
            self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = TileKey::from(TileCoord::new(5, 10, 12));
        assert_eq!(key.to_string(), "5-10-12");
        assert_eq!(key.tile(), TileCoord::new(5, 10, 12));
    }

    #[test]
    fn test_keys_are_exact_match() {
        let a = TileKey::from(TileCoord::new(5, 10, 12));
        let b = TileKey::from(TileCoord::new(5, 12, 10));
        let c = TileKey::from(TileCoord::new(6, 10, 12));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_error_status() {
        let err = TileError::from(ProviderError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        });
        assert_eq!(err.status(), Some(404));
        assert_eq!(TileError::NotConfigured.status(), None);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 2,
            misses: 1,
            coalesced: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
