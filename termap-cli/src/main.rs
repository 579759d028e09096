//! termap CLI - vector tile world map in the terminal
//!
//! Keys: `a` or Ctrl `+` zoom in, `z`/`y` or Ctrl `-` zoom out, arrows or
//! `h`/`j`/`k`/`l` pan, `c` toggle braille, `q` quit.

mod error;
mod input;
mod map_app;
mod sink;
mod ui;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use termap::config::{MapConfig, MouseOptions};
use termap::logging::{default_log_path, init_logging};
use tracing::info;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "termap", version, about = "Pannable, zoomable world map in your terminal")]
struct Args {
    /// Start latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Start longitude
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Start zoom (default: the whole world fits the terminal width)
    #[arg(short, long, allow_negative_numbers = true)]
    zoom: Option<f64>,

    /// Fixed map width in terminal columns
    #[arg(long)]
    width: Option<u16>,

    /// Fixed map height in terminal rows
    #[arg(long)]
    height: Option<u16>,

    /// Vector tile server base URL
    #[arg(long)]
    source: Option<String>,

    /// Config file (default: ~/.termap/config.ini)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Draw with ASCII characters instead of braille
    #[arg(long)]
    ascii: bool,

    /// Pan by dragging with the mouse
    #[arg(long)]
    mouse_drag: bool,

    /// Zoom toward the pointer with the scroll wheel
    #[arg(long)]
    mouse_zoom: bool,

    /// Log file (default: ~/.termap/termap.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Layer command-line overrides on top of file configuration.
    fn apply(&self, mut config: MapConfig) -> MapConfig {
        if self.lat.is_some() || self.lon.is_some() {
            let lat = self.lat.unwrap_or(config.initial_lat);
            let lon = self.lon.unwrap_or(config.initial_lon);
            config = config.with_initial_position(lat, lon);
        }
        if self.zoom.is_some() {
            config = config.with_initial_zoom(self.zoom);
        }
        if self.width.is_some() || self.height.is_some() {
            let width = self.width.or(config.width);
            let height = self.height.or(config.height);
            config = config.with_size(width, height);
        }
        if let Some(source) = &self.source {
            config = config.with_source(source.clone());
        }
        if self.ascii {
            config = config.with_braille(false);
        }
        if self.mouse_drag || self.mouse_zoom {
            let mouse = MouseOptions {
                drag: config.mouse.drag || self.mouse_drag,
                zoom: config.mouse.zoom || self.mouse_zoom,
                ..config.mouse
            };
            config = config.with_mouse(mouse);
        }
        if let Some(path) = &self.log_file {
            config = config.with_log_file(path.clone());
        }
        config
    }
}

fn load_config(args: &Args) -> Result<MapConfig, CliError> {
    let config = match &args.config {
        Some(path) => MapConfig::load_from(path)?,
        None => MapConfig::load()?,
    };
    let config = args.apply(config);
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;

    let log_path = config.log_file.clone().unwrap_or_else(default_log_path);
    let level = if args.debug { "debug" } else { "info" };
    let _guard = init_logging(&log_path, level)?;

    info!(version = termap::VERSION, "termap starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    runtime.block_on(map_app::run_map(config))
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("termap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = MapConfig::default();
        assert_eq!(parse(&[]).apply(config.clone()), config);
    }

    #[test]
    fn test_position_and_zoom_flags() {
        let config = parse(&["--lat", "-33.8", "--lon", "151.2", "-z", "9"])
            .apply(MapConfig::default());
        assert_eq!(config.initial_lat, -33.8);
        assert_eq!(config.initial_lon, 151.2);
        assert_eq!(config.initial_zoom, Some(9.0));
    }

    #[test]
    fn test_partial_position_keeps_other_component() {
        let config = parse(&["--lon", "2.35"]).apply(MapConfig::default());
        assert_eq!(config.initial_lat, 52.51298);
        assert_eq!(config.initial_lon, 2.35);
    }

    #[test]
    fn test_display_and_mouse_flags() {
        let config = parse(&["--ascii", "--mouse-zoom", "--width", "80"])
            .apply(MapConfig::default());
        assert!(!config.use_braille);
        assert!(config.mouse.zoom);
        assert!(!config.mouse.drag);
        assert!(config.mouse.click_to_center);
        assert_eq!(config.width, Some(80));
        assert_eq!(config.height, None);
    }

    #[test]
    fn test_source_flag() {
        let config = parse(&["--source", "http://localhost:8080/tiles"])
            .apply(MapConfig::default());
        assert_eq!(config.source, "http://localhost:8080/tiles");
    }
}
