//! Preferences - theme and language, persisted between sessions

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Stored choice if any, otherwise the system preference
    pub fn preferred(stored: Option<Theme>, system_dark: bool) -> Theme {
        match stored {
            Some(theme) => theme,
            None if system_dark => Theme::Dark,
            None => Theme::Light,
        }
    }

    pub fn toggle(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Translation key for the toggle control, which names the target theme
    pub fn toggle_label_key(self) -> &'static str {
        match self {
            Theme::Dark => "theme.switchLight",
            Theme::Light => "theme.switchDark",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Option<Theme>,
    pub lang: Option<String>,
}

/// JSON file holding the user's preferences
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn save(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string_pretty(prefs).context("Failed to serialize preferences")?;
        fs::write(&self.path, json)
            .await
            .context("Failed to write preferences file")?;
        Ok(())
    }

    /// Defaults when the file does not exist yet
    pub async fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read preferences file")?;
        let prefs = serde_json::from_str(&json).context("Failed to deserialize preferences")?;
        Ok(prefs)
    }
}

/// Dark-mode hint from the environment (`QM_THEME` or a `COLORFGBG` dark background)
pub fn system_prefers_dark() -> bool {
    if let Ok(theme) = std::env::var("QM_THEME") {
        return theme.eq_ignore_ascii_case("dark");
    }
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map_or(false, |bg| bg < 7 || bg == 8)
}
