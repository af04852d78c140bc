//! Configuration loading for PharmaGuard.
//! Reads pharmaguard.toml from `--config`, the path in PHARMAGUARD_CONFIG, or
//! the current directory. A missing file means defaults.

use std::path::{Path, PathBuf};

use pharmaguard_common::PharmaGuardError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::debug;

pub const CONFIG_ENV: &str = "PHARMAGUARD_CONFIG";
pub const ENDPOINT_ENV: &str = "PHARMAGUARD_ENDPOINT";
pub const TOKEN_ENV: &str = "PHARMAGUARD_TOKEN";
const DEFAULT_CONFIG_FILE: &str = "pharmaguard.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint()     -> String { pharmaguard_client::transport::DEFAULT_ENDPOINT.to_string() }
fn default_timeout_secs() -> u64    { pharmaguard_client::transport::DEFAULT_TIMEOUT_SECS }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { endpoint: default_endpoint(), timeout_secs: default_timeout_secs() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

fn default_history_path() -> PathBuf { PathBuf::from("./pharmaguard_history.json") }
fn bool_true()            -> bool    { true }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { path: default_history_path(), enabled: bool_true() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    #[serde(default)]
    pub require_session: bool,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
}

impl SessionConfig {
    /// A session is active when a non-empty token is configured.
    pub fn is_active(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

fn default_report_dir() -> PathBuf { PathBuf::from(".") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { report_dir: default_report_dir() }
    }
}


impl Config {
    /// Load configuration. `cli_path` wins over PHARMAGUARD_CONFIG, which wins
    /// over ./pharmaguard.toml. Environment overrides are applied after the
    /// file, then the result is validated.
    pub fn load(cli_path: Option<&Path>) -> anyhow::Result<Self> {
        let path = resolve_path(cli_path, std::env::var(CONFIG_ENV).ok());

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply PHARMAGUARD_ENDPOINT and PHARMAGUARD_TOKEN from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            self.service.endpoint = endpoint;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.session.token = Some(SecretString::from(token));
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoint = url::Url::parse(&self.service.endpoint).map_err(|e| {
            PharmaGuardError::Config(format!("invalid service endpoint {:?}: {}", self.service.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(PharmaGuardError::Config(format!(
                "service endpoint must use http or https, got {}",
                endpoint.scheme()
            ))
            .into());
        }
        if self.service.timeout_secs == 0 {
            return Err(PharmaGuardError::Config("service timeout_secs must be positive".to_string()).into());
        }
        Ok(())
    }
}

fn resolve_path(cli_path: Option<&Path>, env_path: Option<String>) -> PathBuf {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| env_path.filter(|p| !p.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
