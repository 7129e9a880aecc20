pub mod config;
pub mod types;

pub use config::{ComponentsConfig, ConfigError, ReaderConfig, WeftConfig};
pub use types::*;
