//! Analyzer settings, loaded once from a TOML file and passed explicitly.
//!
//! ```toml
//! platform = "gemini"
//! author_id = 3
//! log_level = "info"
//!
//! [api_keys]
//! gemini = "AIza..."
//! groq = "gsk_..."
//! ```

use crate::error::SettingsError;
use crate::store::{ContentStore, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// AI platform the suggestions are meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    ChatGpt,
    Gemini,
    Groq,
}

impl Platform {
    /// Key used in the settings file
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
            Self::Groq => "groq",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatGpt => write!(f, "ChatGPT"),
            Self::Gemini => write!(f, "Gemini"),
            Self::Groq => write!(f, "Groq"),
        }
    }
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    platform: Platform,
    author_id: UserId,
    #[serde(default)]
    api_keys: BTreeMap<String, String>,
    #[serde(default)]
    log_level: Option<LogLevel>,
}

/// Validated settings for one run
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub platform: Platform,
    /// Key of the selected platform, trimmed
    pub api_key: String,
    pub author_id: UserId,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("platform", &self.platform)
            .field("api_key", &self.masked_key())
            .field("author_id", &self.author_id)
            .finish()
    }
}

/// Contents of a settings file
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub log_level: Option<LogLevel>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = toml::from_str(raw)?;

        let api_key = file
            .api_keys
            .get(file.platform.as_str())
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::EmptyApiKey {
                platform: file.platform,
            })?
            .to_string();

        if file.author_id == 0 {
            return Err(SettingsError::InvalidAuthor(file.author_id));
        }

        Ok(Self {
            settings: Settings {
                platform: file.platform,
                api_key,
                author_id: file.author_id,
            },
            log_level: file.log_level,
        })
    }
}

/// What the `settings` command reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSummary {
    pub ai_platform: Platform,
    pub author_id: UserId,
    pub author_name: String,
    pub api_key: String,
}

impl Settings {
    /// Last four characters of the key, the rest masked
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{visible}", "*".repeat(chars.len() - 4))
    }

    /// Check the configured author exists and return their display name
    pub fn verify_author<C: ContentStore + ?Sized>(
        &self,
        content: &C,
    ) -> Result<String, SettingsError> {
        content
            .user_display_name(self.author_id)
            .ok_or(SettingsError::UnknownAuthor(self.author_id))
    }

    pub fn summary<C: ContentStore + ?Sized>(
        &self,
        content: &C,
    ) -> Result<SettingsSummary, SettingsError> {
        Ok(SettingsSummary {
            ai_platform: self.platform,
            author_id: self.author_id,
            author_name: self.verify_author(content)?,
            api_key: self.masked_key(),
        })
    }
}
