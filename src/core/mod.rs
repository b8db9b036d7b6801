//! Core domain types, configuration and errors for NetPulse.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, FeedSource};
pub use error::{NetpulseError, Result};
pub use types::{decode_records, is_subnet, CheckRecord, Status};
