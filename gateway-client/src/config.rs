//! Configuration for the gateway client.

use std::path::PathBuf;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the gateway client.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Origin plus `/api` prefix, e.g. `http://127.0.0.1:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Ingestion calls block until the source is fetched,
    /// so this is generous.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Where the bearer token is persisted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    /// Directory holding the `token` file. Falls back to the platform config dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolve the session directory, or `None` if no home directory exists.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("sourcechat")))
    }
}

// Default values
fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}
fn default_timeout() -> u64 {
    120
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (SOURCECHAT__SECTION__KEY format)
    /// 2. sourcechat.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("api.timeout_secs", default_timeout() as i64)?
            .add_source(File::with_name("sourcechat").required(false))
            .add_source(
                Environment::with_prefix("SOURCECHAT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Config>()?.validated()
    }

    /// Normalize loaded values and reject ones the client cannot run with.
    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let api = ApiConfig::default();
        assert_eq!(api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(api.timeout_secs, 120);
    }

    #[test]
    fn test_explicit_session_dir_wins() {
        let session = SessionConfig {
            dir: Some(PathBuf::from("/tmp/sc")),
        };
        assert_eq!(session.resolve_dir(), Some(PathBuf::from("/tmp/sc")));
    }

    #[test]
    fn test_deserialize_partial_toml_section() {
        let loaded = ConfigLoader::builder()
            .add_source(config::File::from_str(
                "[api]\nbase_url = \"http://backend:9000/api\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = loaded.try_deserialize().unwrap();
        assert_eq!(config.api.base_url, "http://backend:9000/api");
        assert_eq!(config.api.timeout_secs, 120);
        assert!(config.session.dir.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let loaded = ConfigLoader::builder()
            .add_source(config::File::from_str(
                "[api]\ntimeout_secs = 0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let err = loaded.try_deserialize::<Config>().unwrap().validated().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validated_trims_base_url() {
        let mut config = Config::default();
        config.api.base_url = "http://backend:9000/api/".to_string();
        assert_eq!(config.validated().unwrap().api.base_url, "http://backend:9000/api");
    }
}
