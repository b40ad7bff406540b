//! User settings.
//!
//! Settings are read from `settings.toml` in the platform config directory
//! unless `--config` points elsewhere:
//! - Linux: ~/.config/feedmap/
//! - macOS: ~/Library/Application Support/com.feedmap.feedmap/
//! - Windows: %APPDATA%/feedmap/feedmap/config/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feed_channels::ChannelRegistry;
use feed_map::DEFAULT_PAGE_SIZE;
use feed_output::XmlOptions;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "feedmap";
const APP_NAME: &str = "feedmap";
const CONFIG_FILENAME: &str = "settings.toml";
const STORE_FILENAME: &str = "shops.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub export: ExportSettings,
    pub preview: PreviewSettings,
    pub channels: ChannelSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// JSON store file; defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// Spaces per level; 0 writes a single line.
    pub indent: usize,
    pub declaration: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            indent: 2,
            declaration: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub page_size: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// TOML channel table merged over the built-in channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Default settings file location.
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl Settings {
    /// Loads settings from `explicit`, or from the default location.
    ///
    /// A missing default file yields defaults. An explicit path must exist,
    /// and a file that exists must parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match settings_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no settings file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("parse settings {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Store file, from settings or the platform data directory.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.general.store_path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(STORE_FILENAME))
            .unwrap_or_else(|| PathBuf::from(STORE_FILENAME))
    }

    /// Built-in channels, with the configured overlay merged in.
    pub fn channel_registry(&self) -> Result<ChannelRegistry> {
        match &self.channels.overlay {
            Some(path) => ChannelRegistry::with_overlay(path)
                .with_context(|| format!("load channel overlay {}", path.display())),
            None => Ok(ChannelRegistry::builtin()),
        }
    }

    pub fn xml_options(&self) -> XmlOptions {
        XmlOptions {
            indent: (self.export.indent > 0).then_some(self.export.indent),
            declaration: self.export.declaration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(Settings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml_str("[preview]\npage_size = 10\n").unwrap();
        assert_eq!(settings.preview.page_size, 10);
        assert_eq!(settings.export, ExportSettings::default());
    }

    #[test]
    fn zero_indent_is_single_line() {
        let mut settings = Settings::default();
        settings.export.indent = 0;
        assert_eq!(settings.xml_options().indent, None);
    }
}
