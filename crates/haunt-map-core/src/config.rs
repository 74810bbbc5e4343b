// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::{LatLng, MapError};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1XXYosjOR4jTpBOlUFwPn2l3vhnemOh5REtoMXqW-ymU/gviz/tq?tqx=out:json&gid=631160791";
const DEFAULT_FORM_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSfmJ4aMSEYq-sT6aLl288_8KmgRVkV3stg-Qlpbcx-MKQtR6A/formResponse";
const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Form entry identifiers the submission endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub description: String,
    pub submitted_by: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            description: "entry.871862830".to_string(),
            submitted_by: "entry.956493276".to_string(),
            address: "entry.1089082775".to_string(),
            latitude: "entry.1905521699".to_string(),
            longitude: "entry.408058304".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Spreadsheet query endpoint returning the callback envelope.
    pub sheet_url: String,
    pub form_url: String,
    pub form_fields: FormFields,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub locate_zoom: f64,
    pub highlight_secs: u64,
    /// Tile template with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    /// IP geolocation endpoint. `None` disables network geolocation.
    pub geolocation_url: Option<String>,
    /// Fixed position used by the locate control instead of the network lookup.
    pub home: Option<LatLng>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            form_url: DEFAULT_FORM_URL.to_string(),
            form_fields: FormFields::default(),
            initial_center: LatLng::new(39.5, -98.35),
            initial_zoom: 4.0,
            locate_zoom: 14.0,
            highlight_secs: 3,
            tile_url: DEFAULT_TILE_URL.to_string(),
            user_agent: format!("haunt-map/{}", env!("CARGO_PKG_VERSION")),
            http_timeout_secs: 30,
            geolocation_url: Some(DEFAULT_GEOLOCATION_URL.to_string()),
            home: None,
        }
    }
}

impl MapConfig {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("config.json")
    }

    /// Loads the config from `path`, or from the default location when `path` is `None`.
    /// A missing file at the default location yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            debug!("No config file; using defaults — path={}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: MapConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;

        info!("Loaded config — path={}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), MapError> {
        for (name, value) in [("sheet_url", &self.sheet_url), ("form_url", &self.form_url)] {
            url::Url::parse(value)
                .map_err(|e| MapError::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }
        if let Some(geo) = &self.geolocation_url {
            url::Url::parse(geo).map_err(|e| {
                MapError::Config(format!("geolocation_url is not a valid URL: {}", e))
            })?;
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tile_url.contains(placeholder) {
                return Err(MapError::Config(format!(
                    "tile_url is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        if !(0.0..=19.0).contains(&self.initial_zoom) || !(0.0..=19.0).contains(&self.locate_zoom)
        {
            return Err(MapError::Config("zoom levels must be within 0..=19".to_string()));
        }
        Ok(())
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_secs(self.highlight_secs)
    }

    pub fn tile_url_for(&self, z: u32, x: u32, y: u32) -> String {
        self.tile_url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Shared blocking HTTP client for the sheet, form and geolocation requests.
    pub fn http_client(&self) -> Result<reqwest::blocking::Client, MapError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .user_agent(self.user_agent.clone())
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.highlight_duration(), Duration::from_secs(3));
        assert_eq!(config.form_fields.latitude, "entry.1905521699");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "locate_zoom": 12.0, "home": { "lat": 1.5, "lng": 2.5 } }"#)
            .unwrap();

        let config = MapConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.locate_zoom, 12.0);
        assert_eq!(config.home, Some(LatLng::new(1.5, 2.5)));
        assert_eq!(config.initial_zoom, 4.0);
        assert_eq!(config.form_fields, FormFields::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = MapConfig {
            geolocation_url: None,
            highlight_secs: 5,
            ..MapConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(MapConfig::load(Some(path.as_path())).unwrap(), config);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(MapConfig::load(Some(dir.path().join("nope.json").as_path())).is_err());
    }

    #[test]
    fn test_bad_tile_template_rejected() {
        let config = MapConfig {
            tile_url: "https://tiles.example.com/{z}/{x}.png".to_string(),
            ..MapConfig::default()
        };
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_tile_url_for() {
        let config = MapConfig::default();
        assert_eq!(
            config.tile_url_for(4, 3, 6),
            "https://tile.openstreetmap.org/4/3/6.png"
        );
    }
}
