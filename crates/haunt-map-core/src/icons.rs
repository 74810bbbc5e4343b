// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Static marker definitions for approved pins and the in-progress proposal.

/// A marker image with its pixel geometry.
///
/// `anchor` is the pixel of the image that sits on the coordinate (the pin tip),
/// `popup_anchor` is the popup's offset from that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    pub image_url: &'static str,
    pub size: [f32; 2],
    pub anchor: [f32; 2],
    pub popup_anchor: [f32; 2],
    /// RGB drawn while the image is still loading.
    pub fallback_rgb: [f32; 3],
}

impl MarkerIcon {
    /// Top-left corner of the icon for a marker whose tip is at `(x, y)` on screen.
    pub fn top_left(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.anchor[0], y - self.anchor[1])
    }

    /// True when screen point `(px, py)` falls inside the icon drawn for a tip at `(x, y)`.
    pub fn hit(&self, x: f32, y: f32, px: f32, py: f32) -> bool {
        let (left, top) = self.top_left(x, y);
        px >= left && px <= left + self.size[0] && py >= top && py <= top + self.size[1]
    }
}

pub const APPROVED_ICON: MarkerIcon = MarkerIcon {
    image_url: "https://cdn-icons-png.flaticon.com/512/992/992703.png",
    size: [38.0, 38.0],
    anchor: [19.0, 38.0],
    popup_anchor: [0.0, -38.0],
    fallback_rgb: [0.98, 0.45, 0.09],
};

pub const PROPOSAL_ICON: MarkerIcon = MarkerIcon {
    image_url: "https://cdn-icons-png.flaticon.com/512/684/684908.png",
    size: [30.0, 30.0],
    anchor: [15.0, 30.0],
    popup_anchor: [0.0, -28.0],
    fallback_rgb: [0.86, 0.15, 0.15],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_uses_tip_anchor() {
        // Tip at (100, 100): the icon spans x 81..119, y 62..100.
        assert!(APPROVED_ICON.hit(100.0, 100.0, 100.0, 80.0));
        assert!(APPROVED_ICON.hit(100.0, 100.0, 81.0, 62.0));
        assert!(!APPROVED_ICON.hit(100.0, 100.0, 100.0, 105.0));
        assert!(!APPROVED_ICON.hit(100.0, 100.0, 125.0, 80.0));
    }
}
