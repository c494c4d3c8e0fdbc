pub mod annotations;
pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

// Re-export everything for easy access
pub use annotations::*;
pub use config::{ConfigOverrides, ConfigSnapshot, LoggingConfig, OperatorConfig};
pub use error::{LoadError, LoadResult};
pub use manifest::RoleManifest;
pub use types::*;
