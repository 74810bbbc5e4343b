// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Lifecycle of the single in-progress proposal marker.
//!
//! Confirming the location and dismissing the popup are separate events, so
//! closing the popup through the confirm button never removes the marker.

use crate::LatLng;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    /// Confirmation popup is showing.
    Open,
    /// The user confirmed the location; the popup is closed and the drawer is open.
    Affirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Absent,
    Placed { at: LatLng, popup: Popup },
}

/// What the caller should do after a selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEffect {
    None,
    OpenDrawer,
    MarkerRemoved,
}

impl Selection {
    pub fn position(&self) -> Option<LatLng> {
        match self {
            Selection::Absent => None,
            Selection::Placed { at, .. } => Some(*at),
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Selection::Placed { .. })
    }

    pub fn popup_open(&self) -> bool {
        matches!(
            self,
            Selection::Placed {
                popup: Popup::Open,
                ..
            }
        )
    }

    /// A map click always drops the previous marker before placing the new one.
    pub fn click_map(&mut self, at: LatLng) {
        if let Some(prev) = self.position() {
            debug!("Replacing selection marker — from={} to={}", prev, at);
        }
        *self = Selection::Placed {
            at,
            popup: Popup::Open,
        };
    }

    /// "Submit this location" pressed in the popup.
    pub fn affirm(&mut self) -> SelectionEffect {
        match *self {
            Selection::Placed {
                at,
                popup: Popup::Open,
            } => {
                *self = Selection::Placed {
                    at,
                    popup: Popup::Affirmed,
                };
                SelectionEffect::OpenDrawer
            }
            _ => SelectionEffect::None,
        }
    }

    /// Popup closed through its close affordance.
    pub fn dismiss_popup(&mut self) -> SelectionEffect {
        match *self {
            Selection::Placed {
                popup: Popup::Open,
                ..
            } => {
                *self = Selection::Absent;
                SelectionEffect::MarkerRemoved
            }
            _ => SelectionEffect::None,
        }
    }

    /// Clicking the marker itself brings the popup back.
    pub fn reopen_popup(&mut self) {
        if let Selection::Placed { popup, .. } = self {
            *popup = Popup::Open;
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::Absent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_replaces_previous_marker() {
        let mut sel = Selection::default();
        sel.click_map(LatLng::new(1.0, 2.0));
        sel.click_map(LatLng::new(3.0, 4.0));
        assert_eq!(sel.position(), Some(LatLng::new(3.0, 4.0)));
        assert!(sel.popup_open());
    }

    #[test]
    fn test_dismiss_removes_marker() {
        let mut sel = Selection::default();
        sel.click_map(LatLng::new(1.0, 2.0));
        assert_eq!(sel.dismiss_popup(), SelectionEffect::MarkerRemoved);
        assert_eq!(sel, Selection::Absent);
    }

    #[test]
    fn test_affirm_keeps_marker() {
        let mut sel = Selection::default();
        sel.click_map(LatLng::new(1.0, 2.0));
        assert_eq!(sel.affirm(), SelectionEffect::OpenDrawer);
        // The popup is already closed; a late close notification must be a no-op.
        assert_eq!(sel.dismiss_popup(), SelectionEffect::None);
        assert_eq!(sel.position(), Some(LatLng::new(1.0, 2.0)));
    }

    #[test]
    fn test_reopened_popup_can_be_dismissed() {
        let mut sel = Selection::default();
        sel.click_map(LatLng::new(1.0, 2.0));
        sel.affirm();
        sel.reopen_popup();
        assert!(sel.popup_open());
        assert_eq!(sel.dismiss_popup(), SelectionEffect::MarkerRemoved);
        assert!(!sel.is_placed());
    }

    #[test]
    fn test_events_on_absent_are_noops() {
        let mut sel = Selection::default();
        assert_eq!(sel.affirm(), SelectionEffect::None);
        assert_eq!(sel.dismiss_popup(), SelectionEffect::None);
        sel.reopen_popup();
        assert_eq!(sel, Selection::Absent);
    }
}
