//! Service configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `~/.mneme/config.toml` (or the file given with `--config`)
//! 3. Environment variables:
//!    - `APP_ENV` - environment name (`development` enables the local store)
//!    - `USE_REDIS` - `"true"` forces the remote store
//!    - `UPSTASH_REDIS_REST_URL` / `UPSTASH_REDIS_REST_TOKEN` - REST credentials
//!
//! ```toml
//! environment = "development"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! metrics = true
//!
//! [store]
//! use_remote = false
//! rest_url = "https://example.upstash.io"
//! rest_token = "..."
//! request_timeout_secs = 10
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;
use crate::kv::RestConfig;
use crate::memory::BackendKind;
use crate::paths;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Serve Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

/// Memory backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Use the remote store even in development.
    #[serde(default)]
    pub use_remote: bool,
    #[serde(default)]
    pub rest_url: Option<String>,
    #[serde(default)]
    pub rest_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_environment() -> String {
    constants::DEFAULT_ENVIRONMENT.to_string()
}

fn default_host() -> String {
    constants::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            metrics: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            rest_url: None,
            rest_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads the config file and applies environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `~/.mneme/config.toml` is
    /// used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = paths::get_config_path()?;
                if default_path.exists() {
                    Self::load_from(&default_path)?
                } else {
                    Self::default()
                }
            },
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from the specified path, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - A field is unknown or has the wrong type
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(env) = var("APP_ENV") {
            self.environment = env;
        }
        if let Some(flag) = var("USE_REDIS") {
            self.store.use_remote = flag == "true";
        }
        if let Some(url) = var("UPSTASH_REDIS_REST_URL") {
            self.store.rest_url = Some(url);
        }
        if let Some(token) = var("UPSTASH_REDIS_REST_TOKEN") {
            self.store.rest_token = Some(token);
        }
    }

    /// Memory backend these settings select.
    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::select(self.store.use_remote, &self.environment)
    }

    /// REST client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is missing.
    pub fn rest_config(&self) -> Result<RestConfig> {
        let url = self
            .store
            .rest_url
            .clone()
            .context("UPSTASH_REDIS_REST_URL is not set")?;
        let token = self
            .store
            .rest_token
            .clone()
            .context("UPSTASH_REDIS_REST_TOKEN is not set")?;
        Ok(RestConfig {
            url,
            token,
            timeout: Duration::from_secs(self.store.request_timeout_secs),
        })
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0
    /// - Remote backend selected without REST URL or token
    /// - REST URL that is not an absolute http(s) URL
    /// - Zero request timeout
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port cannot be 0".to_string());
        } else if self.server.port < 1024 {
            warnings.push(format!(
                "server.port {} is privileged and may require elevated permissions",
                self.server.port
            ));
        }

        if self.store.request_timeout_secs == 0 {
            errors.push("store.request_timeout_secs must be greater than 0".to_string());
        }

        let remote = self.backend_kind() == BackendKind::Remote;
        let has_url = self.store.rest_url.is_some();
        let has_token = self.store.rest_token.is_some();

        if remote {
            if !has_url {
                errors.push(
                    "Remote store selected but no REST URL is set \
                     (store.rest_url or UPSTASH_REDIS_REST_URL)"
                        .to_string(),
                );
            }
            if !has_token {
                errors.push(
                    "Remote store selected but no REST token is set \
                     (store.rest_token or UPSTASH_REDIS_REST_TOKEN)"
                        .to_string(),
                );
            }
            if self.store.use_remote && self.environment == constants::DEVELOPMENT_ENV {
                warnings.push(
                    "use_remote is set: development data goes to the remote store".to_string(),
                );
            }
        } else if has_url || has_token {
            warnings.push(format!(
                "REST credentials are set but the local store is selected \
                 (environment '{}'); they will not be used",
                self.environment
            ));
        }

        if let Some(raw) = &self.store.rest_url {
            match url::Url::parse(raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(format!(
                    "store.rest_url must use http or https, got '{}'",
                    url.scheme()
                )),
                Err(e) => errors.push(format!("store.rest_url is not a valid URL: {e}")),
            }
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}
