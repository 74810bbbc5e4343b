// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use haunt_map_core::submit::FormTransport;
use haunt_map_core::{LatLng, MapConfig, MapError, MapSession, ValidationError};
use simplelog::{Config, LevelFilter, TestLogger};
use std::cell::RefCell;

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

#[derive(Default)]
struct RecordingTransport {
    posts: RefCell<Vec<Vec<(String, String)>>>,
}

impl FormTransport for RecordingTransport {
    fn post(&self, payload: &[(String, String)]) -> Result<(), MapError> {
        self.posts.borrow_mut().push(payload.to_vec());
        Ok(())
    }
}

struct BrokenTransport;

impl FormTransport for BrokenTransport {
    fn post(&self, _payload: &[(String, String)]) -> Result<(), MapError> {
        Err(MapError::Network("dns failure".to_string()))
    }
}

fn field<'a>(payload: &'a [(String, String)], key: &str) -> &'a str {
    payload
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or_else(|| panic!("missing field {}", key))
}

fn fill(session: &mut MapSession, description: &str, submitted_by: &str, address: &str) {
    let form = session.form_mut();
    form.description = description.to_string();
    form.submitted_by = submitted_by.to_string();
    form.address = address.to_string();
}

#[test]
fn test_click_then_submit_posts_coordinates() {
    init_logging();
    let config = MapConfig::default();
    let fields = config.form_fields.clone();
    let mut session = MapSession::new(config);
    let transport = RecordingTransport::default();

    session.click_map(LatLng::new(10.0, 20.0));
    session.affirm_selection();
    assert!(session.drawer.open);

    fill(&mut session, "D", "S", "");
    let notice = session.submit(&transport).unwrap();
    assert_eq!(
        notice,
        "Location sent! Your selection will be added after approval."
    );

    let posts = transport.posts.borrow();
    assert_eq!(posts.len(), 1);
    let payload = &posts[0];
    assert_eq!(field(payload, &fields.latitude), "10");
    assert_eq!(field(payload, &fields.longitude), "20");
    assert_eq!(field(payload, &fields.description), "D");
    assert_eq!(field(payload, &fields.submitted_by), "S");
    assert_eq!(field(payload, &fields.address), "");
}

#[test]
fn test_success_clears_state() {
    let mut session = MapSession::new(MapConfig::default());
    let transport = RecordingTransport::default();

    session.click_map(LatLng::new(1.0, 1.0));
    session.affirm_selection();
    fill(&mut session, "Fog machine", "Bob", "13 Elm St");
    session.submit(&transport).unwrap();

    assert!(!session.selection.is_placed());
    assert!(!session.drawer.open);
    assert_eq!(session.drawer.form, Default::default());
}

#[test]
fn test_rejected_submissions_never_post() {
    let transport = RecordingTransport::default();

    // Missing description
    let mut session = MapSession::new(MapConfig::default());
    session.click_map(LatLng::new(1.0, 1.0));
    fill(&mut session, "", "S", "addr");
    assert!(matches!(
        session.submit(&transport),
        Err(MapError::Validation(ValidationError::MissingFields))
    ));

    // Missing submitter
    fill(&mut session, "D", "  ", "addr");
    assert!(matches!(
        session.submit(&transport),
        Err(MapError::Validation(ValidationError::MissingFields))
    ));

    // No selection
    let mut session = MapSession::new(MapConfig::default());
    fill(&mut session, "D", "S", "");
    assert!(matches!(
        session.submit(&transport),
        Err(MapError::Validation(ValidationError::NoSelection))
    ));

    assert!(transport.posts.borrow().is_empty());
}

#[test]
fn test_transport_failure_leaves_state() {
    init_logging();
    let mut session = MapSession::new(MapConfig::default());
    session.click_map(LatLng::new(5.0, 6.0));
    session.affirm_selection();
    fill(&mut session, "D", "S", "A");

    let err = session.submit(&BrokenTransport).unwrap_err();
    assert_eq!(err.alert_text(), "Error connecting to Google Form.");

    assert_eq!(session.selection.position(), Some(LatLng::new(5.0, 6.0)));
    assert!(session.drawer.open);
    assert_eq!(session.drawer.form.description, "D");
    assert_eq!(session.drawer.form.submitted_by, "S");
    assert_eq!(session.drawer.form.address, "A");
}

#[test]
fn test_popup_close_versus_affirm() {
    let mut session = MapSession::new(MapConfig::default());

    session.click_map(LatLng::new(1.0, 2.0));
    session.dismiss_popup();
    assert!(!session.selection.is_placed());
    assert!(!session.drawer.open);

    session.click_map(LatLng::new(1.0, 2.0));
    session.affirm_selection();
    session.dismiss_popup();
    assert_eq!(session.selection.position(), Some(LatLng::new(1.0, 2.0)));
    assert!(session.drawer.open);
}

#[test]
fn test_second_click_replaces_selection() {
    let mut session = MapSession::new(MapConfig::default());
    session.click_map(LatLng::new(1.0, 2.0));
    session.affirm_selection();
    session.click_map(LatLng::new(3.0, 4.0));

    assert_eq!(session.selection.position(), Some(LatLng::new(3.0, 4.0)));
    assert!(session.selection.popup_open());
}
