//! NetPulse - live infrastructure health dashboard.
//!
//! NetPulse polls a flat feed of network-check results and presents them
//! as a collapsible hierarchy: category, server or subnet group, address,
//! check. Status and latency roll up at every level, and the expand and
//! collapse state of every node survives refreshes.
//!
//! # Architecture
//!
//! - `core`: record model, configuration and errors
//! - `engine`: grouping, rollups, expansion state, rendering and the
//!   refresh state machine
//! - `feed`: data sources (collector HTTP API, JSON file, demo data)
//! - `runtime`: async refresh loop driving the engine
//! - `notify`: webhook delivery of status transitions
//! - `api`: headless JSON API
//! - `tui`: terminal dashboard
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use netpulse_lib::core::ConfigBuilder;
//! use netpulse_lib::core::FeedSource;
//! use netpulse_lib::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new().feed_source(FeedSource::Demo).build()?;
//!     let app = Application::new(config)?;
//!     app.run_headless().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod application;
pub mod cli;
pub mod core;
pub mod engine;
pub mod feed;
pub mod notify;
pub mod runtime;
pub mod tui;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, Result};
