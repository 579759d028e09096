//! termap - vector tile maps in the terminal
//!
//! This library provides the core of a pannable, zoomable world map drawn
//! with braille characters:
//!
//! - [`coord`]: Web Mercator math between geographic, tile and pixel space
//! - [`provider`]: tile transport over HTTP
//! - [`tile`]: tile payload parsing
//! - [`cache`]: bounded tile cache with single-flight fetching
//! - [`viewport`]: pan and zoom state driven by [`input`] events
//! - [`draw`]: the idle/drawing cycle and the built-in tile grid renderer
//! - [`config`]: INI configuration
//! - [`logging`]: file-based tracing setup
//! - [`app`]: session wiring

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod draw;
pub mod input;
pub mod logging;
pub mod provider;
pub mod tile;
pub mod viewport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
