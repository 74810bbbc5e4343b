// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::{GeolocationError, LatLng, MapConfig, MapError};
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

/// Single-shot position query.
pub trait Geolocator: Send + Sync {
    fn locate(&self) -> Result<LatLng, MapError>;
}

/// Always answers with the same position.
pub struct FixedGeolocator(pub LatLng);

impl Geolocator for FixedGeolocator {
    fn locate(&self) -> Result<LatLng, MapError> {
        Ok(self.0)
    }
}

/// No positioning capability on this device.
pub struct NoGeolocator;

impl Geolocator for NoGeolocator {
    fn locate(&self) -> Result<LatLng, MapError> {
        Err(GeolocationError::Unavailable.into())
    }
}

/// Approximate position from an IP geolocation service.
pub struct IpGeolocator {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Deserialize)]
struct IpLookup {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(config: &MapConfig, url: &str) -> Result<Self, MapError> {
        Ok(Self {
            client: config.http_client()?,
            url: url.to_string(),
        })
    }
}

impl Geolocator for IpGeolocator {
    fn locate(&self) -> Result<LatLng, MapError> {
        debug!("Requesting IP geolocation — url={}", self.url);
        let lookup: IpLookup = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<IpLookup>())
            .map_err(|e| GeolocationError::Denied(e.to_string()))?;
        resolve_lookup(lookup)
    }
}

fn resolve_lookup(lookup: IpLookup) -> Result<LatLng, MapError> {
    if lookup.status.as_deref().is_some_and(|s| s != "success") {
        let reason = lookup
            .message
            .unwrap_or_else(|| "lookup failed".to_string());
        return Err(GeolocationError::Denied(reason).into());
    }
    match (lookup.lat, lookup.lon) {
        (Some(lat), Some(lng)) => Ok(LatLng::new(lat, lng)),
        _ => Err(GeolocationError::Denied("response has no coordinates".to_string()).into()),
    }
}

/// Picks the configured positioning capability: a fixed home position first,
/// then the network lookup, else none.
pub fn geolocator_from_config(config: &MapConfig) -> Box<dyn Geolocator> {
    if let Some(home) = config.home {
        return Box::new(FixedGeolocator(home));
    }
    if let Some(url) = &config.geolocation_url {
        match IpGeolocator::new(config, url) {
            Ok(g) => return Box::new(g),
            Err(e) => warn!("IP geolocation disabled: {}", e),
        }
    }
    Box::new(NoGeolocator)
}

/// Transient marker shown where the locate control landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub at: LatLng,
    pub generation: u64,
}

/// Result of a successful locate: where to move the view and the highlight to show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recenter {
    pub center: LatLng,
    pub zoom: f64,
    pub highlight: Highlight,
    pub highlight_for: Duration,
}

#[derive(Debug, Clone)]
pub struct LocateControl {
    pub zoom: f64,
    pub highlight_for: Duration,
    generation: u64,
}

impl LocateControl {
    pub fn new(zoom: f64, highlight_for: Duration) -> Self {
        Self {
            zoom,
            highlight_for,
            generation: 0,
        }
    }

    /// Builds the recenter for a position the geolocator returned.
    pub fn found(&mut self, at: LatLng) -> Recenter {
        self.generation += 1;
        Recenter {
            center: at,
            zoom: self.zoom,
            highlight: Highlight {
                at,
                generation: self.generation,
            },
            highlight_for: self.highlight_for,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failure_is_denied() {
        let lookup = IpLookup {
            status: Some("fail".to_string()),
            message: Some("private range".to_string()),
            lat: None,
            lon: None,
        };
        let err = resolve_lookup(lookup).unwrap_err();
        assert!(matches!(
            err,
            MapError::Geolocation(GeolocationError::Denied(ref m)) if m == "private range"
        ));
    }

    #[test]
    fn test_lookup_success() {
        let lookup: IpLookup =
            serde_json::from_str(r#"{"status":"success","lat":52.52,"lon":13.405}"#).unwrap();
        assert_eq!(resolve_lookup(lookup).unwrap(), LatLng::new(52.52, 13.405));
    }

    #[test]
    fn test_config_selects_geolocator() {
        let config = MapConfig {
            home: Some(LatLng::new(1.0, 2.0)),
            ..MapConfig::default()
        };
        assert_eq!(
            geolocator_from_config(&config).locate().unwrap(),
            LatLng::new(1.0, 2.0)
        );

        let config = MapConfig {
            geolocation_url: None,
            ..MapConfig::default()
        };
        assert!(matches!(
            geolocator_from_config(&config).locate(),
            Err(MapError::Geolocation(GeolocationError::Unavailable))
        ));
    }

    #[test]
    fn test_generations_increase() {
        let mut control = LocateControl::new(14.0, Duration::from_secs(3));
        let a = control.found(LatLng::new(0.0, 0.0));
        let b = control.found(LatLng::new(1.0, 1.0));
        assert!(b.highlight.generation > a.highlight.generation);
        assert_eq!(a.highlight_for, Duration::from_secs(3));
    }
}
