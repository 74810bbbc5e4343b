// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

pub const TOGGLE_LABEL_CLOSED: &str = "Submit a New House!";
pub const TOGGLE_LABEL_OPEN: &str = "✖ Close";

/// Free-text fields of the submission drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawerFormState {
    pub description: String,
    pub submitted_by: String,
    pub address: String,
}

impl DrawerFormState {
    pub fn clear(&mut self) {
        self.description.clear();
        self.submitted_by.clear();
        self.address.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Drawer {
    pub open: bool,
    pub form: DrawerFormState,
}

impl Drawer {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.open {
            TOGGLE_LABEL_OPEN
        } else {
            TOGGLE_LABEL_CLOSED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_label_follows_state() {
        let mut drawer = Drawer::default();
        assert_eq!(drawer.toggle_label(), "Submit a New House!");
        drawer.toggle();
        assert!(drawer.open);
        assert_eq!(drawer.toggle_label(), "✖ Close");
        drawer.toggle();
        assert!(!drawer.open);
    }
}
