//! Session bootstrap.
//!
//! [`MapSession`] wires the components together from one [`MapConfig`]:
//!
//! ```text
//! MapConfig ─► ReqwestClient ─► HttpTileSource ─► TileCache ─► TileGridRenderer
//!                                                                   │
//!                                            FrameSink ◄── DrawCycle ┘
//! ```
//!
//! The [`ViewportController`](crate::viewport::ViewportController) is not
//! part of the session; the caller owns it and feeds its snapshots to
//! [`MapSession::draw_cycle`].
//!
//! # Example
//!
//! ```ignore
//! use termap::app::MapSession;
//! use termap::config::MapConfig;
//!
//! let config = MapConfig::load()?;
//! let session = MapSession::start(config, sink)?;
//! let mut controller = session.controller(cols, rows);
//! session.draw_cycle().draw(controller.state()).await?;
//! ```
//!
//! [`MapConfig`]: crate::config::MapConfig

mod error;
mod session;

pub use error::AppError;
pub use session::MapSession;
