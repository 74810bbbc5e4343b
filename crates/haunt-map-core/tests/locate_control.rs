// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use haunt_map_core::locate::{FixedGeolocator, NoGeolocator};
use haunt_map_core::{GeolocationError, LatLng, MapConfig, MapError, MapSession};
use std::time::Duration;

#[test]
fn test_locate_recenters_and_highlights() {
    let mut session = MapSession::new(MapConfig::default());
    let recenter = session
        .locate(&FixedGeolocator(LatLng::new(42.36, -71.06)))
        .unwrap();

    assert_eq!(session.surface.center, LatLng::new(42.36, -71.06));
    assert_eq!(session.surface.zoom, 14.0);
    assert_eq!(recenter.highlight_for, Duration::from_secs(3));

    assert_eq!(
        session.highlight.map(|h| h.at),
        Some(LatLng::new(42.36, -71.06))
    );
    session.expire_highlight(recenter.highlight.generation);
    assert!(session.highlight.is_none());
}

#[test]
fn test_stale_expiry_keeps_newer_highlight() {
    let mut session = MapSession::new(MapConfig::default());
    let here = FixedGeolocator(LatLng::new(1.0, 1.0));

    let first = session.locate(&here).unwrap();
    let second = session.locate(&here).unwrap();

    session.expire_highlight(first.highlight.generation);
    assert_eq!(
        session.highlight.map(|h| h.generation),
        Some(second.highlight.generation)
    );

    session.expire_highlight(second.highlight.generation);
    assert!(session.highlight.is_none());
}

#[test]
fn test_unavailable_geolocation_leaves_view() {
    let config = MapConfig::default();
    let start = config.initial_center;
    let mut session = MapSession::new(config);

    let err = session.locate(&NoGeolocator).unwrap_err();
    assert!(matches!(
        err,
        MapError::Geolocation(GeolocationError::Unavailable)
    ));
    assert_eq!(err.alert_text(), "Geolocation is not available on this device.");
    assert_eq!(session.surface.center, start);
    assert!(session.highlight.is_none());
}
