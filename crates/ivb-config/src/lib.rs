//! ivb-config
//!
//! Persistent user preferences for the investment budget tracker.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{resolve_base_dir, Config, HOME_ENV};
