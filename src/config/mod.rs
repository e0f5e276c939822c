//! Configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FlightError;

pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_MAX_RESULTS: u32 = 100;
const DEFAULT_MAX_PRICE: f64 = 2000.0;

const ENV_CLIENT_ID: &str = "AMADEUS_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AMADEUS_CLIENT_SECRET";
const ENV_BASE_URL: &str = "AMADEUS_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Amadeus API key
    pub client_id: Option<String>,
    /// Amadeus API secret
    pub client_secret: Option<String>,
    /// Provider base URL (test or production environment)
    pub base_url: String,
    /// Upper bound for every provider request
    pub request_timeout_secs: u64,
    /// ISO currency requested for offer prices
    pub currency: String,
    /// Result cap sent with each offer search
    pub max_results: u32,
    /// Initial price ceiling for the filter panel
    pub default_max_price: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            currency: DEFAULT_CURRENCY.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            default_max_price: DEFAULT_MAX_PRICE,
        }
    }
}

/// Client id and secret for the OAuth2 client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// True when a credential value is absent in practice: empty, or the
/// template value shipped in sample env files.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value == "REPLACE_WITH_YOUR_API_KEY"
        || value.starts_with("REPLACE_WITH")
        || value.starts_with("YOUR_")
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "skybound", "skybound")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Overlay values from the environment. Empty variables are ignored.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = non_empty(ENV_CLIENT_ID) {
            self.client_id = Some(id);
        }
        if let Some(secret) = non_empty(ENV_CLIENT_SECRET) {
            self.client_secret = Some(secret);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = url;
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Restrictive permissions: the file holds the API secret
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Credentials usable for a token exchange, or `Configuration` when
    /// either value is missing or a placeholder.
    pub fn credentials(&self) -> Result<Credentials, FlightError> {
        let client_id = self.client_id.as_deref().unwrap_or_default();
        let client_secret = self.client_secret.as_deref().unwrap_or_default();

        if is_placeholder(client_id) {
            return Err(FlightError::Configuration(
                "client id is not set".to_string(),
            ));
        }
        if is_placeholder(client_secret) {
            return Err(FlightError::Configuration(
                "client secret is not set".to_string(),
            ));
        }

        Ok(Credentials {
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn token_url(&self) -> String {
        format!("{}/v1/security/oauth2/token", self.base_url.trim_end_matches('/'))
    }
}

/// Print configuration status
pub fn status() -> Result<()> {
    let config = Config::load()?;

    println!("Config file: {}", Config::config_path()?.display());
    println!("Base URL:    {}", config.base_url);
    println!("Currency:    {}", config.currency);
    println!("Timeout:     {}s", config.request_timeout_secs);

    match config.credentials() {
        Ok(creds) => {
            println!("Client id:   {}", creds.client_id);
            println!("Secret:      {}", mask(&creds.client_secret));
        }
        Err(e) => {
            println!("Credentials: not configured ({})", e);
            println!("\n{}", e.guidance());
        }
    }

    Ok(())
}

/// Store credentials in the config file
pub fn set_credentials(client_id: Option<String>, client_secret: Option<String>) -> Result<()> {
    let mut config = Config::load_file()?;
    if let Some(id) = client_id {
        config.client_id = Some(id);
    }
    if let Some(secret) = client_secret {
        config.client_secret = Some(secret);
    }
    config.save()?;
    println!("Saved to {}", Config::config_path()?.display());
    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(3).collect();
    format!("{}{}", visible, "*".repeat(secret.chars().count().saturating_sub(3).min(12)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(id: Option<&str>, secret: Option<&str>) -> Config {
        Config {
            client_id: id.map(String::from),
            client_secret: secret.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let err = config_with(None, Some("secret")).credentials().unwrap_err();
        assert!(matches!(err, FlightError::Configuration(_)));

        let err = config_with(Some("id"), None).credentials().unwrap_err();
        assert!(matches!(err, FlightError::Configuration(_)));
    }

    #[test]
    fn test_placeholder_credentials_are_not_configured() {
        let err = config_with(Some("REPLACE_WITH_YOUR_API_KEY"), Some("abc"))
            .credentials()
            .unwrap_err();
        assert!(matches!(err, FlightError::Configuration(_)));

        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("YOUR_SECRET"));
        assert!(!is_placeholder("Gx7kP2"));
    }

    #[test]
    fn test_valid_credentials_are_trimmed() {
        let creds = config_with(Some(" key "), Some("s3cr3t-value\n")).credentials().unwrap();
        assert_eq!(creds.client_id, "key");
        assert_eq!(creds.client_secret, "s3cr3t-value");

        let debug = format!("{:?}", creds);
        assert!(!debug.contains("s3cr3t-value"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, ""),
            (ENV_BASE_URL, "https://api.amadeus.com/"),
        ]
        .into_iter()
        .collect();

        let mut config = config_with(Some("file-id"), Some("file-secret"));
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.client_id.as_deref(), Some("env-id"));
        // Empty variables do not clobber stored values.
        assert_eq!(config.client_secret.as_deref(), Some("file-secret"));
        assert_eq!(config.token_url(), "https://api.amadeus.com/v1/security/oauth2/token");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("client_id = \"abc\"\ncurrency = \"EUR\"\n").unwrap();
        assert_eq!(config.client_id.as_deref(), Some("abc"));
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_results, 100);
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
    }
}
