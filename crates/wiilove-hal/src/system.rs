//! System information
//!
//! Console name, system language and user nickname as reported by the
//! platform settings. Values are read once at startup and cached.

use serde::{Deserialize, Serialize};

/// Host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Console {
    Wii,
    GameCube,
    Desktop,
}

impl Console {
    pub fn name(&self) -> &'static str {
        match self {
            Console::Wii => "Wii",
            Console::GameCube => "GameCube",
            Console::Desktop => "Desktop",
        }
    }
}

/// System menu language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Japanese,
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    SimplifiedChinese,
    TraditionalChinese,
    Korean,
    Unknown,
}

impl Language {
    /// Map the console's `CONF_LANG_*` value
    pub fn from_conf(value: i32) -> Self {
        match value {
            0 => Language::Japanese,
            1 => Language::English,
            2 => Language::German,
            3 => Language::French,
            4 => Language::Spanish,
            5 => Language::Italian,
            6 => Language::Dutch,
            7 => Language::SimplifiedChinese,
            8 => Language::TraditionalChinese,
            9 => Language::Korean,
            _ => Language::Unknown,
        }
    }

    /// Map a POSIX locale such as `de_DE.UTF-8` or `zh_TW`
    pub fn from_locale(locale: &str) -> Self {
        let locale = locale.to_lowercase();
        let (lang, region) = match locale.split_once(['_', '-']) {
            Some((lang, region)) => (lang, region.split('.').next().unwrap_or("")),
            None => (locale.split('.').next().unwrap_or(""), ""),
        };

        match lang {
            "ja" => Language::Japanese,
            "en" | "c" | "posix" => Language::English,
            "de" => Language::German,
            "fr" => Language::French,
            "es" => Language::Spanish,
            "it" => Language::Italian,
            "nl" => Language::Dutch,
            "zh" if matches!(region, "tw" | "hk" | "mo") => Language::TraditionalChinese,
            "zh" => Language::SimplifiedChinese,
            "ko" => Language::Korean,
            _ => Language::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Japanese => "Japanese",
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Italian => "Italian",
            Language::Dutch => "Dutch",
            Language::SimplifiedChinese => "Simplified Chinese",
            Language::TraditionalChinese => "Traditional Chinese",
            Language::Korean => "Korean",
            Language::Unknown => "Unknown",
        }
    }
}

/// Cached platform settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub console: Console,
    pub language: Option<Language>,
    pub nickname: Option<String>,
}

impl SystemInfo {
    /// Gather information on a desktop host from the environment
    pub fn detect_desktop() -> Self {
        let language = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .map(|locale| Language::from_locale(&locale))
            .unwrap_or(Language::Unknown);

        let nickname = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|n| !n.is_empty());

        tracing::debug!(
            "Desktop system info: language={}, nickname={:?}",
            language.name(),
            nickname
        );

        Self {
            console: Console::Desktop,
            language: Some(language),
            nickname,
        }
    }

    /// The GameCube has neither a language setting nor a nickname
    pub fn gamecube() -> Self {
        Self {
            console: Console::GameCube,
            language: None,
            nickname: None,
        }
    }

    /// Override the nickname (e.g. from configuration)
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}
