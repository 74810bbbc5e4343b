// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::FormFields;
use crate::drawer::DrawerFormState;
use crate::{LatLng, MapConfig, MapError, ValidationError};
use log::{debug, info};

pub const SUCCESS_NOTICE: &str = "Location sent! Your selection will be added after approval.";

/// A validated proposal ready to post.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub description: String,
    pub submitted_by: String,
    pub address: String,
    pub at: LatLng,
}

impl Submission {
    /// Trims the drawer fields and checks the required ones. Address may be empty.
    pub fn from_form(form: &DrawerFormState, at: Option<LatLng>) -> Result<Self, MapError> {
        let description = form.description.trim();
        let submitted_by = form.submitted_by.trim();

        if description.is_empty() || submitted_by.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }
        let at = at.ok_or(ValidationError::NoSelection)?;

        Ok(Self {
            description: description.to_string(),
            submitted_by: submitted_by.to_string(),
            address: form.address.trim().to_string(),
            at,
        })
    }

    /// Ordered form fields keyed by the endpoint's entry identifiers.
    pub fn payload(&self, fields: &FormFields) -> Vec<(String, String)> {
        vec![
            (fields.description.clone(), self.description.clone()),
            (fields.submitted_by.clone(), self.submitted_by.clone()),
            (fields.address.clone(), self.address.clone()),
            (fields.latitude.clone(), self.at.lat.to_string()),
            (fields.longitude.clone(), self.at.lng.to_string()),
        ]
    }
}

/// Posts a payload to the form backend. The response is never read.
pub trait FormTransport {
    fn post(&self, payload: &[(String, String)]) -> Result<(), MapError>;
}

/// Posts through `transport`. Any failure is reported as the form backend being unreachable.
pub fn send(transport: &dyn FormTransport, payload: &[(String, String)]) -> Result<(), MapError> {
    transport.post(payload).map_err(|e| match e {
        MapError::Network(reason) | MapError::FormPost(reason) => MapError::FormPost(reason),
        other => MapError::FormPost(other.to_string()),
    })
}

pub struct HttpFormTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpFormTransport {
    pub fn new(config: &MapConfig) -> Result<Self, MapError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.form_url.clone(),
        })
    }
}

impl FormTransport for HttpFormTransport {
    fn post(&self, payload: &[(String, String)]) -> Result<(), MapError> {
        let form = payload
            .iter()
            .fold(reqwest::blocking::multipart::Form::new(), |form, (k, v)| {
                form.text(k.clone(), v.clone())
            });

        debug!(
            "Posting submission — url={} fields={}",
            self.url,
            payload.len()
        );
        // Any response counts as delivered; the backend does not return anything usable.
        let response = self.client.post(&self.url).multipart(form).send()?;
        info!("Submission delivered — status={}", response.status());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(description: &str, submitted_by: &str, address: &str) -> DrawerFormState {
        DrawerFormState {
            description: description.to_string(),
            submitted_by: submitted_by.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn test_required_fields() {
        let at = Some(LatLng::new(1.0, 2.0));
        for f in [form("", "S", "a"), form("D", "", "a"), form("   ", "S", "a")] {
            assert!(matches!(
                Submission::from_form(&f, at),
                Err(MapError::Validation(ValidationError::MissingFields))
            ));
        }
    }

    #[test]
    fn test_selection_required() {
        assert!(matches!(
            Submission::from_form(&form("D", "S", ""), None),
            Err(MapError::Validation(ValidationError::NoSelection))
        ));
    }

    struct Unreachable;

    impl FormTransport for Unreachable {
        fn post(&self, _payload: &[(String, String)]) -> Result<(), MapError> {
            Err(MapError::Network("dns failure".to_string()))
        }
    }

    #[test]
    fn test_send_reports_form_post_failure() {
        let err = send(&Unreachable, &[]).unwrap_err();
        assert!(matches!(err, MapError::FormPost(ref r) if r == "dns failure"));
        assert_eq!(err.alert_text(), "Error connecting to Google Form.");
    }

    #[test]
    fn test_payload_layout() {
        let sub = Submission::from_form(
            &form("  Spooky House ", "Alice", ""),
            Some(LatLng::new(10.0, 20.5)),
        )
        .unwrap();
        let payload = sub.payload(&FormFields::default());
        assert_eq!(
            payload,
            vec![
                ("entry.871862830".to_string(), "Spooky House".to_string()),
                ("entry.956493276".to_string(), "Alice".to_string()),
                ("entry.1089082775".to_string(), "".to_string()),
                ("entry.1905521699".to_string(), "10".to_string()),
                ("entry.408058304".to_string(), "20.5".to_string()),
            ]
        );
    }
}
