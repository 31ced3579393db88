//! tabstat - table cleaning and sequence statistics

pub mod api;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod statistics;
pub mod types;

pub use cleaning::*;
pub use error::{DataError, Result};
pub use statistics::*;
pub use types::*;

// Re-export for convenience
pub use config::ServiceConfig;
