//! Shared types, error model, and configuration for docexport.
//!
//! This crate is the foundation depended on by all other docexport crates.
//! It provides:
//! - [`DocExportError`]: the unified error type
//! - Domain types ([`NavEntry`], [`Chapter`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, DiagramConfig, PandocConfig, PathsConfig, ProjectConfig,
    config_file_path, file_prefix_from_title, init_config, load_config, load_config_from,
};
pub use error::{DocExportError, Result};
pub use types::{Chapter, NavEntry};
