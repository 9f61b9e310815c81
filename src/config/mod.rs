use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Configuration file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "stellar.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV_VAR: &str = "STELLAR_CONFIG";

/// Prefix of per-key overrides, e.g. `STELLAR_API__BASE_URL`
pub const ENV_PREFIX: &str = "STELLAR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base endpoint every operation path is appended to
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout; requests never time out when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Domain shown in place of the service host, e.g. `stellar.link`.
    /// Only affects display; copies and links keep the real short URL.
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "StatsConfig::default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://localhost:8080/api".to_string()
    }

    fn default_user_agent() -> String {
        format!("stellar/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl StatsConfig {
    const fn default_poll_interval_secs() -> u64 {
        5
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: Self::default_poll_interval_secs(),
        }
    }
}

impl Config {
    /// Load `.env`, then defaults, the configuration file and `STELLAR_*` overrides.
    ///
    /// The file is `$STELLAR_CONFIG` when set (and must exist), otherwise an
    /// optional `stellar.toml` in the working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        match std::env::var(CONFIG_PATH_ENV_VAR) {
            Ok(path) => Self::load(Some(Path::new(&path))),
            Err(_) => Self::load(None),
        }
    }

    /// Load from an explicit file (required) or the default one (optional),
    /// with environment overrides applied on top.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        Self::build(file, None)
    }

    fn build(
        file: Option<&Path>,
        env_overrides: Option<HashMap<String, String>>,
    ) -> anyhow::Result<Self> {
        use ::config::{Environment, File, FileFormat};

        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let env_source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env_overrides);

        let config: Config = ::config::Config::builder()
            .add_source(file_source)
            .add_source(env_source)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        config.validate()?;

        tracing::debug!(
            base_url = %config.api.base_url,
            display_domain = ?config.display.domain,
            "loaded configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("api.base_url '{}' is not a valid URL", self.api.base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got '{}'",
                base_url.scheme()
            );
        }

        if self.stats.poll_interval_secs == 0 {
            bail!("stats.poll_interval_secs must be at least 1");
        }

        Ok(())
    }
}
