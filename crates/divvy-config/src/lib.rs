//! divvy-config
//!
//! User preferences and their on-disk lifecycle: load, atomic save, and
//! timestamped config backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
