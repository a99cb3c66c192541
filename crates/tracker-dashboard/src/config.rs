// crates/tracker-dashboard/src/config.rs

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::Deserialize;
use thiserror::Error;

use tracker_core::{MonthGrid, UserId, WeekStart};
use tracker_store::{StoreConfig, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything the dashboard reads from its TOML file.
///
/// ```toml
/// theme = "dark"
///
/// [store]
/// url = "https://xyz.example.co"
/// api_key = "..."
/// reorder_rpc = "apply_sort_orders"
///
/// [session]
/// user_id = "..."
/// email = "lead@example.org"
///
/// [calendar]
/// week_start = "monday"
/// max_markers = 6
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub calendar: CalendarConfig,
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl SessionConfig {
    pub fn user(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub week_start: WeekStartSetting,
    pub max_markers: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            week_start: WeekStartSetting::Monday,
            max_markers: MonthGrid::DEFAULT_MARKER_CAP,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartSetting {
    #[default]
    Monday,
    Sunday,
}

impl From<WeekStartSetting> for WeekStart {
    fn from(setting: WeekStartSetting) -> Self {
        match setting {
            WeekStartSetting::Monday => WeekStart::Monday,
            WeekStartSetting::Sunday => WeekStart::Sunday,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn text(self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    pub fn muted(self) -> Color {
        match self {
            Theme::Dark => Color::Gray,
            Theme::Light => Color::DarkGray,
        }
    }

    pub fn selection(self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn focus(self) -> Color {
        match self {
            Theme::Dark => Color::Yellow,
            Theme::Light => Color::Blue,
        }
    }
}

impl DashboardConfig {
    /// Read `path` if given (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        config.overlay_env()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        DashboardConfig::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// `TRACKER_*` store variables plus `TRACKER_USER_ID` and
    /// `TRACKER_USER_EMAIL` for the session.
    pub fn overlay_env(mut self) -> Result<Self, ConfigError> {
        self.store = self.store.overlay_env()?;
        if let Ok(user) = env::var("TRACKER_USER_ID") {
            self.session.user_id = Some(user);
        }
        if let Ok(email) = env::var("TRACKER_USER_EMAIL") {
            self.session.email = Some(email);
        }
        Ok(self)
    }
}
