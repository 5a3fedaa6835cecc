// src/config.rs

//! Configuration loading and pipeline wiring.
//!
//! Both binaries go through here: load the TOML file (falling back to
//! defaults), apply environment overrides, validate, then open the store and
//! HTTP client the configuration selects.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::PipelineContext;
use crate::storage;
use crate::utils::http::HttpFetcher;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

/// Load, override and validate configuration.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Load configuration from `CONFIG_PATH` or the default location.
pub fn load_from_env() -> Result<Config> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(Path::new(&path))
}

/// Open the configured store and HTTP client and compile selectors.
pub fn build_context(config: Config) -> Result<PipelineContext> {
    let store = storage::open(&config.store, &config.http)?;
    let fetcher = HttpFetcher::from_config(&config.http)?;
    PipelineContext::new(Arc::new(config), store, Arc::new(fetcher))
}
