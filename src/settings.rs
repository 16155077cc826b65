// Display and accessibility preferences

use crate::error::Result;
use crate::kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const THEME_KEY: &str = "theme";
pub const LARGE_TEXT_KEY: &str = "largeText";
pub const HIGH_CONTRAST_KEY: &str = "highContrast";
pub const SCREEN_READER_KEY: &str = "screenReader";
pub const LANGUAGE_KEY: &str = "language";

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// User preferences, each persisted under its own key
///
/// The language code is stored and reported but nothing is translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub large_text: bool,
    pub high_contrast: bool,
    pub screen_reader: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            large_text: false,
            high_contrast: false,
            screen_reader: false,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Settings {
    /// Read every preference, falling back to defaults for missing keys
    ///
    /// An unrecognized theme reads as light; flags are on only when stored as `"true"`.
    pub fn load(kv: &dyn KeyValueStore) -> Result<Self> {
        let flag = |key: &str| -> Result<bool> { Ok(kv.get(key)?.as_deref() == Some("true")) };

        let settings = Self {
            theme: kv
                .get(THEME_KEY)?
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            large_text: flag(LARGE_TEXT_KEY)?,
            high_contrast: flag(HIGH_CONTRAST_KEY)?,
            screen_reader: flag(SCREEN_READER_KEY)?,
            language: kv.get(LANGUAGE_KEY)?.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        };

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Write every preference
    pub fn save(&self, kv: &dyn KeyValueStore) -> Result<()> {
        kv.set(THEME_KEY, self.theme.as_str())?;
        kv.set(LARGE_TEXT_KEY, &self.large_text.to_string())?;
        kv.set(HIGH_CONTRAST_KEY, &self.high_contrast.to_string())?;
        kv.set(SCREEN_READER_KEY, &self.screen_reader.to_string())?;
        kv.set(LANGUAGE_KEY, &self.language)?;

        debug!(settings = ?self, "Saved settings");
        Ok(())
    }

    // Toggles write only their own key

    pub fn set_theme(kv: &dyn KeyValueStore, theme: Theme) -> Result<()> {
        kv.set(THEME_KEY, theme.as_str())
    }

    pub fn set_large_text(kv: &dyn KeyValueStore, on: bool) -> Result<()> {
        kv.set(LARGE_TEXT_KEY, &on.to_string())
    }

    pub fn set_high_contrast(kv: &dyn KeyValueStore, on: bool) -> Result<()> {
        kv.set(HIGH_CONTRAST_KEY, &on.to_string())
    }

    pub fn set_screen_reader(kv: &dyn KeyValueStore, on: bool) -> Result<()> {
        kv.set(SCREEN_READER_KEY, &on.to_string())
    }

    pub fn set_language(kv: &dyn KeyValueStore, language: &str) -> Result<()> {
        kv.set(LANGUAGE_KEY, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    #[test]
    fn test_defaults_when_nothing_stored() {
        let kv = MemoryKv::new();
        let settings = Settings::load(&kv).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.language, "en");
    }

    #[test]
    fn test_save_then_load() {
        let kv = MemoryKv::new();
        let settings = Settings {
            theme: Theme::Dark,
            large_text: true,
            high_contrast: false,
            screen_reader: true,
            language: "es".to_string(),
        };

        settings.save(&kv).unwrap();
        assert_eq!(kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(kv.get(LARGE_TEXT_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(kv.get(HIGH_CONTRAST_KEY).unwrap().as_deref(), Some("false"));

        assert_eq!(Settings::load(&kv).unwrap(), settings);
    }

    #[test]
    fn test_lenient_reads() {
        let kv = MemoryKv::new();
        kv.set(THEME_KEY, "solarized").unwrap();
        kv.set(LARGE_TEXT_KEY, "yes").unwrap();
        kv.set(HIGH_CONTRAST_KEY, "true").unwrap();

        let settings = Settings::load(&kv).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(!settings.large_text);
        assert!(settings.high_contrast);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("Dark".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
    }

    #[test]
    fn test_setters_write_only_their_key() {
        let all_keys = [THEME_KEY, LARGE_TEXT_KEY, HIGH_CONTRAST_KEY, SCREEN_READER_KEY, LANGUAGE_KEY];
        let stored_keys = |kv: &MemoryKv| -> Vec<&'static str> {
            all_keys
                .iter()
                .copied()
                .filter(|k| kv.get(k).unwrap().is_some())
                .collect()
        };

        let kv = MemoryKv::new();
        Settings::set_theme(&kv, Theme::Dark).unwrap();
        assert_eq!(stored_keys(&kv), vec![THEME_KEY]);

        let kv = MemoryKv::new();
        Settings::set_large_text(&kv, true).unwrap();
        assert_eq!(stored_keys(&kv), vec![LARGE_TEXT_KEY]);

        let kv = MemoryKv::new();
        Settings::set_high_contrast(&kv, true).unwrap();
        assert_eq!(stored_keys(&kv), vec![HIGH_CONTRAST_KEY]);

        let kv = MemoryKv::new();
        Settings::set_screen_reader(&kv, false).unwrap();
        assert_eq!(stored_keys(&kv), vec![SCREEN_READER_KEY]);
        assert_eq!(kv.get(SCREEN_READER_KEY).unwrap().as_deref(), Some("false"));

        let kv = MemoryKv::new();
        Settings::set_language(&kv, "de").unwrap();
        assert_eq!(stored_keys(&kv), vec![LANGUAGE_KEY]);
    }

    #[test]
    fn test_setter_leaves_other_settings_alone() {
        let kv = MemoryKv::new();
        Settings {
            theme: Theme::Dark,
            large_text: true,
            ..Default::default()
        }
        .save(&kv)
        .unwrap();

        Settings::set_high_contrast(&kv, true).unwrap();

        let settings = Settings::load(&kv).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.large_text);
        assert!(settings.high_contrast);
    }
}
