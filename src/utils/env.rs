// src/utils/env.rs
use log::{debug, info};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the JSON operation list.
pub const MATCHING_CONFIG_VAR: &str = "MATCHING_CONFIG";

/// Loads `.env` from the working directory or its parents, if present.
///
/// Runs before the logger starts so `RUST_LOG` can come from `.env`; pass the
/// result to [`log_env_source`] once logging is up.
pub fn load_env() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

pub fn log_env_source(env_file: Option<&Path>) {
    match env_file {
        Some(path) => info!("Loaded environment from {}", path.display()),
        None => debug!("No .env file loaded"),
    }
}

pub fn config_path_from_env() -> Option<PathBuf> {
    env::var(MATCHING_CONFIG_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
