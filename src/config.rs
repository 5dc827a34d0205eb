use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration: a TOML file read once at startup, with environment
/// variables taking precedence over file values. No hot-reload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,

    /// Telegram @usernames or numeric user IDs permitted to use the bot.
    /// `"*"` opens the bot to everyone.
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allowed_users: default_allowed_users(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

impl Config {
    /// Load the configuration, then apply environment overrides. An explicit
    /// path (CLI `--config`) must exist; without one the default location
    /// (`~/.config/paperbot/config.toml` on Linux) is consulted, and its
    /// absence falls back to built-in defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_inner(path, Self::default_path().as_deref())
    }

    fn load_inner(explicit: Option<&Path>, default: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(p) if p.exists() => Self::parse_file(p)?,
            Some(p) => {
                return Err(ConfigError::Load(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            None => match default {
                Some(p) => Self::parse_file(p)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
    }

    /// The conventional config path, or `None` when the platform offers no
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        let path = ProjectDirs::from("", "", "paperbot")?
            .config_dir()
            .join("config.toml");
        path.exists().then_some(path)
    }

    /// Where redeemed access keys are persisted (`keys.json` next to the
    /// config file). Falls back to the working directory.
    pub fn keys_path() -> PathBuf {
        ProjectDirs::from("", "", "paperbot")
            .map(|dirs| dirs.config_dir().join("keys.json"))
            .unwrap_or_else(|| PathBuf::from("keys.json"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(key) = std::env::var("AI_API_KEY") {
            self.generator.api_key = key;
        }
        if let Ok(url) = std::env::var("AI_BASE_URL") {
            self.generator.base_url = url;
        }
        if let Ok(model) = std::env::var("AI_MODEL") {
            self.generator.model = model;
        }
    }

    /// Credentials are only required to run the bot, not for local key
    /// management, so loading and validating are separate steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "telegram.bot_token is not set (BOT_TOKEN)".into(),
            ));
        }
        if self.generator.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "generator.api_key is not set (AI_API_KEY)".into(),
            ));
        }
        if self.generator.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("generator.base_url is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openai() {
        let generator = GeneratorConfig::default();
        assert_eq!(generator.base_url, "https://api.openai.com/v1");
        assert!(!generator.model.is_empty());
    }

    #[test]
    fn parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:ABC"

            [generator]
            api_key = "sk-test"
            base_url = "https://api.example.com/v1"
            model = "example-model"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token, "123:ABC");
        assert_eq!(config.telegram.allowed_users, vec!["*".to_string()]);
        assert_eq!(config.generator.base_url, "https://api.example.com/v1");
        assert!((config.generator.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_missing_token() {
        let mut config = Config::default();
        config.generator.api_key = "sk-test".into();
        assert!(config.validate().is_err());

        config.telegram.bot_token = "123:ABC".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_path_config_is_honored_without_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[telegram]\nbot_token = \"999:XYZ\"\n\n[generator]\napi_key = \"sk-from-file\"\n",
        )
        .unwrap();

        let config = Config::load_inner(None, Some(&path)).unwrap();
        assert_eq!(config.telegram.bot_token, "999:XYZ");
        assert_eq!(config.generator.api_key, "sk-from-file");
        // Unset file keys still get their defaults.
        assert_eq!(config.generator.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn no_config_file_anywhere_falls_back_to_defaults() {
        let config = Config::load_inner(None, None).unwrap();
        assert!(config.telegram.bot_token.is_empty());
        assert_eq!(config.generator.model, "gpt-4o-mini");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load_from(Some(Path::new("/nonexistent/paperbot.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
