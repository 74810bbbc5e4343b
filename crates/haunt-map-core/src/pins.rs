// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::{LatLng, MapConfig, MapError};
use log::{debug, error, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

const ENVELOPE_PATTERN: &str = r"(?s)google\.visualization\.Query\.setResponse\((.*)\);";

const COL_NAME: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_ADDRESS: usize = 3;
const COL_LAT: usize = 4;
const COL_LNG: usize = 5;

/// An approved location read from the spreadsheet. Read-only once rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedPin {
    pub name: String,
    pub description: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl ApprovedPin {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Popup body: description, address, then the submitter.
    pub fn popup_text(&self) -> String {
        format!(
            "{}\n{}\nSubmitted by: {}",
            self.description, self.address, self.name
        )
    }
}

/// Where the raw spreadsheet response comes from.
pub trait PinSource {
    fn fetch(&self) -> Result<String, MapError>;
}

pub struct HttpPinSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpPinSource {
    pub fn new(config: &MapConfig) -> Result<Self, MapError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.sheet_url.clone(),
        })
    }
}

impl PinSource for HttpPinSource {
    fn fetch(&self) -> Result<String, MapError> {
        debug!("Fetching approved pins — url={}", self.url);
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let text = response.text()?;
        debug!("Pin source responded — bytes={}", text.len());
        Ok(text)
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    table: QueryTable,
}

#[derive(Deserialize)]
struct QueryTable {
    #[serde(default)]
    rows: Vec<QueryRow>,
}

#[derive(Deserialize)]
struct QueryRow {
    #[serde(default)]
    c: Vec<Option<QueryCell>>,
}

#[derive(Deserialize)]
struct QueryCell {
    #[serde(default)]
    v: Value,
}

/// Strips the callback wrapper the spreadsheet endpoint puts around its JSON.
pub fn unwrap_envelope(text: &str) -> Result<&str, MapError> {
    static RE_ENVELOPE: OnceLock<Option<Regex>> = OnceLock::new();

    let re = RE_ENVELOPE
        .get_or_init(|| Regex::new(ENVELOPE_PATTERN).ok())
        .as_ref()
        .ok_or_else(|| MapError::Format("Envelope pattern failed to compile".to_string()))?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| MapError::Format("Invalid Google Sheets response format".to_string()))
}

/// Parses a full spreadsheet response into pins, skipping rows without usable coordinates.
pub fn parse_pins(text: &str) -> Result<Vec<ApprovedPin>, MapError> {
    let payload = unwrap_envelope(text)?;
    let response: QueryResponse = serde_json::from_str(payload)?;

    let total = response.table.rows.len();
    let pins: Vec<ApprovedPin> = response
        .table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let pin = row_to_pin(row);
            if pin.is_none() {
                debug!("Skipping row without numeric coordinates — row={}", i);
            }
            pin
        })
        .collect();

    debug!("Parsed pin rows — rows={} pins={}", total, pins.len());
    Ok(pins)
}

fn row_to_pin(row: &QueryRow) -> Option<ApprovedPin> {
    let cell = |idx: usize| row.c.get(idx).and_then(|c| c.as_ref()).map(|c| &c.v);

    let lat = cell(COL_LAT).and_then(coordinate)?;
    let lng = cell(COL_LNG).and_then(coordinate)?;

    Some(ApprovedPin {
        name: cell(COL_NAME).map(text).unwrap_or_default(),
        description: cell(COL_DESCRIPTION).map(text).unwrap_or_default(),
        address: cell(COL_ADDRESS).map(text).unwrap_or_default(),
        lat,
        lng,
    })
}

fn text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coordinate(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub fn fetch_approved_pins(source: &dyn PinSource) -> Result<Vec<ApprovedPin>, MapError> {
    let text = source.fetch()?;
    parse_pins(&text)
}

/// Fetches and parses the approved pins. Failures are logged and yield no pins.
pub fn load_approved_pins(source: &dyn PinSource) -> Vec<ApprovedPin> {
    match fetch_approved_pins(source) {
        Ok(pins) => {
            info!("Loaded approved pins — count={}", pins.len());
            pins
        }
        Err(e) => {
            error!("Failed to load pins: {}", e);
            Vec::new()
        }
    }
}
