// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod config;
pub mod drawer;
pub mod icons;
pub mod locate;
pub mod pins;
pub mod selection;
pub mod session;
pub mod submit;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use config::MapConfig;
pub use session::MapSession;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description and submitter name are required")]
    MissingFields,
    #[error("no location selected")]
    NoSelection,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("geolocation is not available")]
    Unavailable,
    #[error("geolocation denied: {0}")]
    Denied(String),
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Unexpected data source format: {0}")]
    Format(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Form post failed: {0}")]
    FormPost(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Geolocation failed: {0}")]
    Geolocation(#[from] GeolocationError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MapError {
    fn from(e: reqwest::Error) -> Self {
        MapError::Network(e.to_string())
    }
}

impl MapError {
    /// Text shown to the user in a blocking alert.
    pub fn alert_text(&self) -> String {
        match self {
            MapError::Validation(ValidationError::MissingFields) => {
                "Please fill in Description and Your Name.".to_string()
            }
            MapError::Validation(ValidationError::NoSelection) => {
                "Drop a pin on the map first!".to_string()
            }
            MapError::Geolocation(GeolocationError::Unavailable) => {
                "Geolocation is not available on this device.".to_string()
            }
            MapError::Geolocation(GeolocationError::Denied(reason)) => {
                format!("Unable to find your location: {}", reason)
            }
            MapError::FormPost(_) => "Error connecting to Google Form.".to_string(),
            MapError::Network(reason) => format!("Unable to reach the server: {}", reason),
            other => other.to_string(),
        }
    }
}

/// Root directory for config and log files.
/// `HAUNT_MAP_CONFIG_DIR` wins over the platform config directory.
pub fn get_config_root() -> PathBuf {
    if let Ok(dir) = std::env::var("HAUNT_MAP_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    directories::ProjectDirs::from("org", "StarTuz", "haunt-map")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".haunt-map"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_text_for_validation_errors() {
        assert_eq!(
            MapError::from(ValidationError::MissingFields).alert_text(),
            "Please fill in Description and Your Name."
        );
        assert_eq!(
            MapError::from(ValidationError::NoSelection).alert_text(),
            "Drop a pin on the map first!"
        );
    }

    #[test]
    fn test_only_form_post_blames_the_form() {
        assert_eq!(
            MapError::FormPost("timed out".to_string()).alert_text(),
            "Error connecting to Google Form."
        );
        assert_eq!(
            MapError::Network("connection refused".to_string()).alert_text(),
            "Unable to reach the server: connection refused"
        );
    }

    #[test]
    fn test_latlng_display() {
        assert_eq!(LatLng::new(40.0, -75.0).to_string(), "(40.00000, -75.00000)");
    }
}
