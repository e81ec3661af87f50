//! Configuration module for job-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use job_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Global item cap: {}", config.harvester.max_total_items);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HarvesterConfig, OutputConfig, RetentionConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
