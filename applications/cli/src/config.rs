//! CLI configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// OAuth client identifier
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URI registered with the provider
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Where the token pair is persisted; platform config dir when unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        let config_path = PathBuf::from("config.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (prefixed with CADENCE_)
        settings = settings.add_source(config::Environment::with_prefix("CADENCE"));

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration: credentials are checked for presence only
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            bail!("client id is required (set CADENCE_CLIENT_ID)");
        }
        if self.client_secret.is_empty() {
            bail!("client secret is required (set CADENCE_CLIENT_SECRET)");
        }
        if self.redirect_uri.is_empty() {
            bail!("redirect URI is required (set CADENCE_REDIRECT_URI)");
        }
        Ok(())
    }

    /// Resolved token file path.
    pub fn token_file_path(&self) -> PathBuf {
        if let Some(path) = &self.token_file {
            return path.clone();
        }
        dirs::config_dir()
            .map(|dir| dir.join("cadence").join("tokens.json"))
            .unwrap_or_else(|| PathBuf::from("./tokens.json"))
    }
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8888/callback".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            token_file: None,
        }
    }
}
