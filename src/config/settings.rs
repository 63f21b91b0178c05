use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment switch that forces offline mode
pub const OFFLINE_ENV_VAR: &str = "SHELLTALK_OFFLINE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-3.5-turbo",
        }
    }

    pub fn default_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LLMConfig,
    pub execution: ExecutionConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(from = "RawLLMConfig")]
pub struct LLMConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Local cap on model calls; each request costs up to two
    pub requests_per_minute: usize,
}

/// `[llm]` as written in the file; unset model and key variable follow the provider
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawLLMConfig {
    provider: Option<Provider>,
    model: Option<String>,
    api_key_env: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    requests_per_minute: Option<usize>,
}

impl From<RawLLMConfig> for LLMConfig {
    fn from(raw: RawLLMConfig) -> Self {
        let defaults = LLMConfig::for_provider(raw.provider.unwrap_or(Provider::Anthropic));
        Self {
            model: raw.model.unwrap_or(defaults.model),
            api_key_env: raw.api_key_env.unwrap_or(defaults.api_key_env),
            api_key: raw.api_key,
            base_url: raw.base_url,
            timeout_seconds: raw.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            max_tokens: raw.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: raw.temperature.unwrap_or(defaults.temperature),
            requests_per_minute: raw
                .requests_per_minute
                .unwrap_or(defaults.requests_per_minute),
            provider: defaults.provider,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExecutionConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BehaviorConfig {
    pub confirm_before_execute: bool,
    pub log_commands: bool,
    pub offline: bool,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::for_provider(Provider::Anthropic)
    }
}

impl LLMConfig {
    /// Defaults for `provider`, including its model and key variable
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key_env: provider.default_key_env().to_string(),
            api_key: None,
            base_url: None,
            timeout_seconds: 30,
            max_tokens: 150,
            temperature: 0.3,
            requests_per_minute: 30,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            confirm_before_execute: true,
            log_commands: true,
            offline: false,
        }
    }
}

impl LLMConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("shelltalk"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults
    /// when no file exists yet
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate configuration from a file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue("model must not be empty".to_string()));
        }

        if self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "llm.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.execution.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "execution.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get API key from environment variable or config
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(&self.llm.api_key_env)
            && !key.trim().is_empty()
        {
            return Some(key);
        }

        self.llm
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }

    /// Check if API key is available
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Store an API key in the config file
    pub fn set_api_key(&mut self, api_key: &str, path: &Path) -> Result<(), ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::InvalidValue("API key must not be empty".to_string()));
        }
        self.llm.api_key = Some(api_key.to_string());
        self.save_to(path)
    }

    /// Remove a stored API key from the config file
    pub fn clear_api_key(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.llm.api_key = None;
        self.save_to(path)
    }

    /// Read the offline switch from the process environment
    pub fn offline_from_env() -> bool {
        std::env::var(OFFLINE_ENV_VAR)
            .map(|value| parse_flag(&value))
            .unwrap_or(false)
    }
}

/// Interpret an environment flag value
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert!(config.llm.model.starts_with("claude-"));
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.execution.timeout_seconds, 30);
        assert!(config.behavior.confirm_before_execute);
        assert!(!config.behavior.offline);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_execution_timeout() {
        let mut config = Config::default();
        config.execution.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_request_rate_is_configurable() {
        let config: Config = toml::from_str("[llm]\nrequests_per_minute = 60\n").unwrap();
        assert_eq!(config.llm.requests_per_minute, 60);
        assert_eq!(Config::default().llm.requests_per_minute, 30);

        let mut config = Config::default();
        config.llm.requests_per_minute = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_provider_fails_to_parse() {
        let result: Result<Config, _> = toml::from_str("[llm]\nprovider = \"mystery\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[execution]\ntimeout_seconds = 5\n").unwrap();
        assert_eq!(config.execution.timeout_seconds, 5);
        assert_eq!(config.llm.max_tokens, 150);
        assert!(config.behavior.log_commands);
    }

    #[test]
    fn test_openai_provider() {
        let config: Config = toml::from_str(
            "[llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\napi_key_env = \"OPENAI_API_KEY\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.provider, Provider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_provider_only_uses_provider_defaults() {
        let config: Config = toml::from_str("[llm]\nprovider = \"openai\"\n").unwrap();
        assert_eq!(config.llm.provider, Provider::OpenAI);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.llm.max_tokens, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_key_env_kept_with_provider_default_model() {
        let config: Config =
            toml::from_str("[llm]\nprovider = \"openai\"\napi_key_env = \"MY_KEY\"\n").unwrap();
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.api_key_env, "MY_KEY");
    }

    #[test]
    fn test_openai_config_survives_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.llm = LLMConfig::for_provider(Provider::OpenAI);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.llm.provider, Provider::OpenAI);
        assert_eq!(loaded.llm.model, "gpt-3.5-turbo");
        assert_eq!(loaded.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_api_key_from_env() {
        unsafe {
            std::env::set_var("SHELLTALK_TEST_API_KEY", "test-key-123");
        }
        let mut config = Config::default();
        config.llm.api_key_env = "SHELLTALK_TEST_API_KEY".to_string();
        config.llm.api_key = Some("file-key".to_string());

        assert_eq!(config.get_api_key(), Some("test-key-123".to_string()));

        unsafe {
            std::env::remove_var("SHELLTALK_TEST_API_KEY");
        }
    }

    #[test]
    fn test_api_key_from_config() {
        let mut config = Config::default();
        config.llm.api_key_env = "SHELLTALK_NONEXISTENT_VAR".to_string();
        config.llm.api_key = Some("config-key-456".to_string());

        assert_eq!(config.get_api_key(), Some("config-key-456".to_string()));
        assert!(config.has_api_key());
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut config = Config::default();
        config.llm.api_key_env = "SHELLTALK_NONEXISTENT_VAR".to_string();
        config.llm.api_key = Some("   ".to_string());
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.execution.timeout_seconds = 12;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.execution.timeout_seconds, 12);
        assert_eq!(loaded.llm.provider, config.llm.provider);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_set_and_clear_api_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.set_api_key("  sk-stored  ", &path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.llm.api_key.as_deref(), Some("sk-stored"));

        config.clear_api_key(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.llm.api_key.is_none());
    }

    #[test]
    fn test_set_empty_api_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let mut config = Config::default();
        assert!(config.set_api_key("", &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("off"));
    }
}
