use crate::wrap::KeyPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Key cache settings
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_max_entries() -> usize {
    64
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Delivery packaging settings
#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Query parameter carrying the hex ciphertext on the redirect URL
    #[serde(default = "default_redirect_param")]
    pub redirect_param: String,
}

fn default_redirect_param() -> String {
    "key".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            redirect_param: default_redirect_param(),
        }
    }
}

/// Public key source for one provider.
/// Inline PEM wins when both fields are set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub public_key_pem: Option<String>,
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,
    /// Overrides the descriptor's target URL
    #[serde(default)]
    pub redirect: Option<Url>,
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub policy: KeyPolicy,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: KEYWRAP_, nesting: __)
            // e.g., KEYWRAP_POLICY__MIN_MODULUS_BITS, KEYWRAP_CACHE__ENABLED
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from one explicit file, still honouring env overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.get(id)
    }

    /// Configured provider ids, sorted
    pub fn provider_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("KEYWRAP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.policy.min_modulus_bits, 2048);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 64);
        assert_eq!(config.delivery.redirect_param, "key");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[policy]
min_modulus_bits = 3072

[cache]
enabled = false

[providers.openai]
public_key_path = "/etc/keywrap/openai.pem"
redirect = "https://example.com/openai/connect"

[providers.anthropic]
public_key_pem = "-----BEGIN PUBLIC KEY-----"
"#,
        );

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.policy.min_modulus_bits, 3072);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, 64);
        assert_eq!(config.provider_ids(), vec!["anthropic", "openai"]);

        let openai = config.provider("openai").unwrap();
        assert_eq!(
            openai.public_key_path.as_deref(),
            Some(Path::new("/etc/keywrap/openai.pem"))
        );
        assert_eq!(
            openai.redirect.as_ref().map(Url::as_str),
            Some("https://example.com/openai/connect")
        );
        assert!(config.provider("mistral").is_none());
    }

    #[test]
    fn test_env_overrides_policy() {
        std::env::set_var("KEYWRAP_POLICY__MIN_MODULUS_BITS", "3072");
        std::env::set_var("KEYWRAP_DELIVERY__REDIRECT_PARAM", "sealed");
        let config = AppConfig::load();
        std::env::remove_var("KEYWRAP_POLICY__MIN_MODULUS_BITS");
        std::env::remove_var("KEYWRAP_DELIVERY__REDIRECT_PARAM");

        let config = config.unwrap();
        assert_eq!(config.policy.min_modulus_bits, 3072);
        assert_eq!(config.delivery.redirect_param, "sealed");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load_from(Path::new("/nonexistent/keywrap.toml"));
        assert!(result.is_err());
    }
}
