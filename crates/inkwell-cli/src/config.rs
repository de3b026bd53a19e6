//! Runtime configuration resolved from the environment.

use std::env;
use std::path::PathBuf;

use inkwell_core::remote::RemoteConfig;
use inkwell_core::resolve::DocumentDefaults;

use crate::error::CliError;

/// Everything the CLI needs to construct its collaborators.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub remote: RemoteConfig,
    pub db_path: PathBuf,
    pub defaults: DocumentDefaults,
}

impl RuntimeConfig {
    /// Resolve configuration from environment variables.
    ///
    /// `INKWELL_API_BASE_URL` and `INKWELL_API_KEY` are required;
    /// `INKWELL_DB_PATH`, `INKWELL_DEFAULT_AUTHOR`, and
    /// `INKWELL_DEFAULT_DIGEST` are optional.
    pub fn from_env(db_path_override: Option<PathBuf>) -> Result<Self, CliError> {
        let base_url = require_env("INKWELL_API_BASE_URL")?;
        let api_key = require_env("INKWELL_API_KEY")?;

        let db_path = db_path_override
            .or_else(|| env_path("INKWELL_DB_PATH"))
            .unwrap_or_else(default_db_path);

        Ok(Self {
            remote: RemoteConfig { base_url, api_key },
            db_path,
            defaults: DocumentDefaults {
                author: optional_env("INKWELL_DEFAULT_AUTHOR"),
                digest: optional_env("INKWELL_DEFAULT_DIGEST"),
            },
        })
    }
}

fn require_env(name: &'static str) -> Result<String, CliError> {
    optional_env(name).ok_or(CliError::MissingConfig(name))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    optional_env(name).map(PathBuf::from)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inkwell")
        .join("inkwell.db")
}
