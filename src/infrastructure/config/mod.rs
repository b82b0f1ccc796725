//! Configuration management

use crate::application::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub adapters: AdaptersConfig,
    pub extensions: ExtensionsConfig,
    pub data: DataConfig,
    pub dictionary: DictionaryConfig,
    pub kotd: KotdConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// User ids allowed to run owner-only commands
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

/// Which extensions to load, and which groups to skip during registration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionsConfig {
    pub enabled: Vec<String>,
    #[serde(default)]
    pub exclude_groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DictionaryConfig {
    pub words_url: String,
    pub kanji_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct KotdConfig {
    /// Chat to post the daily kanji to; no daily task when unset
    pub daily_chat_id: Option<String>,
    pub interval_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "kotoba-bot".to_string(),
                prefix: "!".to_string(),
                owners: Vec::new(),
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig { enabled: true }),
            },
            extensions: ExtensionsConfig {
                enabled: vec![
                    "dictionary".to_string(),
                    "kotd".to_string(),
                    "moderation".to_string(),
                    "admin".to_string(),
                ],
                exclude_groups: Vec::new(),
            },
            data: DataConfig {
                directory: PathBuf::from("./data"),
            },
            dictionary: DictionaryConfig {
                words_url: "https://jisho.org/api/v1/search/words".to_string(),
                kanji_url: "https://kanjiapi.dev/v1/kanji".to_string(),
            },
            kotd: KotdConfig {
                daily_chat_id: None,
                interval_hours: 24,
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Build a config from environment variables alone
    pub fn load_env() -> Self {
        let mut config = Config::default();

        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if let Some(ref mut tg) = config.adapters.telegram {
                tg.token = Some(token);
                tg.enabled = true;
            }
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(owner) = std::env::var("BOT_OWNER_ID") {
            config.bot.owners.push(owner);
        }

        config
    }

    /// Resolve the gateway token: env var wins over the config file
    pub fn telegram_token(&self) -> Option<String> {
        std::env::var("BOT_TOKEN").ok().or_else(|| {
            self.adapters
                .telegram
                .as_ref()
                .and_then(|t| t.token.clone())
        })
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.bot.owners.iter().any(|id| id == user_id)
    }
}
