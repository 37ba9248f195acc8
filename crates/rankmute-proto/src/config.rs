use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Where the ranking backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Loopback listener that receives the OAuth redirect.
///
/// The backend appends `callback_path` to the origin we hand it, so the two
/// must agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_callback_port")]
    pub port: u16,
    #[serde(default = "default_callback_path")]
    pub callback_path: String,
    /// Launch the system browser on login. When false the URL is only shown.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON file holding the bearer token.
    #[serde(default = "platform::session_file")]
    pub session_file: PathBuf,
    #[serde(default = "platform::log_file")]
    pub log_file: PathBuf,
}

impl LoginConfig {
    /// Origin handed to the backend; the provider redirects back under it.
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.bind_address, self.port)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_callback_port(),
            callback_path: default_callback_path(),
            open_browser: default_open_browser(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            session_file: platform::session_file(),
            log_file: platform::log_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_callback_port() -> u16 {
    8765
}

fn default_callback_path() -> String {
    "/app/login/callback".to_string()
}

fn default_open_browser() -> bool {
    true
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.login.port, 8765);
        assert_eq!(config.login.callback_path, "/app/login/callback");
        assert_eq!(config.login.origin(), "http://127.0.0.1:8765");
        assert!(config
            .paths
            .session_file
            .ends_with("rankmute/session.json"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            base_url = "https://ranking.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "https://ranking.example.com");
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(config.login.open_browser);
    }
}
