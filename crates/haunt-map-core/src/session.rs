// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! All interactive state of one map session, mutated from event handlers.

use crate::drawer::{Drawer, DrawerFormState};
use crate::locate::{Geolocator, Highlight, LocateControl, Recenter};
use crate::pins::ApprovedPin;
use crate::selection::{Selection, SelectionEffect};
use crate::submit::{self, FormTransport, Submission, SUCCESS_NOTICE};
use crate::{LatLng, MapConfig, MapError};
use log::{debug, error, info, warn};

/// Pan/zoom state plus the read-only approved markers.
#[derive(Debug, Clone)]
pub struct MapSurface {
    pub center: LatLng,
    pub zoom: f64,
    pub pins: Vec<ApprovedPin>,
}

pub struct MapSession {
    pub config: MapConfig,
    pub surface: MapSurface,
    pub selection: Selection,
    pub drawer: Drawer,
    pub highlight: Option<Highlight>,
    locate: LocateControl,
}

impl MapSession {
    pub fn new(config: MapConfig) -> Self {
        let locate = LocateControl::new(config.locate_zoom, config.highlight_duration());
        Self {
            surface: MapSurface {
                center: config.initial_center,
                zoom: config.initial_zoom,
                pins: Vec::new(),
            },
            selection: Selection::Absent,
            drawer: Drawer::default(),
            highlight: None,
            locate,
            config,
        }
    }

    pub fn pins(&self) -> &[ApprovedPin] {
        &self.surface.pins
    }

    pub fn show_pins(&mut self, pins: Vec<ApprovedPin>) {
        debug!("Rendering approved markers — count={}", pins.len());
        self.surface.pins = pins;
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.surface.center = center;
        self.surface.zoom = zoom;
    }

    pub fn click_map(&mut self, at: LatLng) {
        self.selection.click_map(at);
        debug!("Selection placed — at={}", at);
    }

    /// Confirms the selected location and opens the drawer.
    pub fn affirm_selection(&mut self) {
        if self.selection.affirm() == SelectionEffect::OpenDrawer {
            self.drawer.open = true;
        }
    }

    pub fn dismiss_popup(&mut self) {
        if self.selection.dismiss_popup() == SelectionEffect::MarkerRemoved {
            debug!("Selection removed by popup close");
        }
    }

    pub fn reopen_selection_popup(&mut self) {
        self.selection.reopen_popup();
    }

    pub fn toggle_drawer(&mut self) {
        self.drawer.toggle();
    }

    pub fn form_mut(&mut self) -> &mut DrawerFormState {
        &mut self.drawer.form
    }

    /// Validates the drawer against the selection and builds the form payload.
    pub fn prepare_submission(&self) -> Result<Vec<(String, String)>, MapError> {
        let submission = Submission::from_form(&self.drawer.form, self.selection.position())
            .inspect_err(|e| warn!("Submission rejected: {}", e))?;
        Ok(submission.payload(&self.config.form_fields))
    }

    /// State clearing after the form backend accepted the post.
    pub fn complete_submission(&mut self) {
        self.drawer.form.clear();
        self.selection.clear();
        self.drawer.open = false;
    }

    /// Validates, posts and clears. On transport failure nothing is cleared.
    pub fn submit(&mut self, transport: &dyn FormTransport) -> Result<&'static str, MapError> {
        let payload = self.prepare_submission()?;
        if let Err(e) = submit::send(transport, &payload) {
            error!("Submission failed: {}", e);
            return Err(e);
        }
        self.complete_submission();
        info!("Submission sent");
        Ok(SUCCESS_NOTICE)
    }

    /// Moves the view to a located position and arms the highlight.
    pub fn apply_located(&mut self, at: LatLng) -> Recenter {
        let recenter = self.locate.found(at);
        self.set_view(recenter.center, recenter.zoom);
        self.highlight = Some(recenter.highlight);
        info!("Located — at={} zoom={}", at, recenter.zoom);
        recenter
    }

    pub fn locate(&mut self, geolocator: &dyn Geolocator) -> Result<Recenter, MapError> {
        match geolocator.locate() {
            Ok(at) => Ok(self.apply_located(at)),
            Err(e) => {
                warn!("Locate failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drops the highlight if it is still the one armed as `generation`.
    pub fn expire_highlight(&mut self, generation: u64) {
        if self.highlight.is_some_and(|h| h.generation == generation) {
            self.highlight = None;
        }
    }
}
