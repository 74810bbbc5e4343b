use crate::style::palette;
use crate::Message;
use haunt_map_core::icons::{MarkerIcon, APPROVED_ICON, PROPOSAL_ICON};
use haunt_map_core::pins::ApprovedPin;
use haunt_map_core::{LatLng, MapConfig};
use iced::advanced::{self, layout, renderer, widget, Layout, Widget};
use iced::widget::image;
use iced::{mouse, Border, Color, Element, Event, Length, Radians, Rectangle};
use log::warn;
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

// --- Slippy Map / Mercator Math ---
pub const TILE_SIZE: f64 = 256.0;
const MAX_ZOOM: f64 = 19.0;
const MAX_LAT: f64 = 85.0511;

pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
    ((lon + 180.0) / 360.0) * 2.0f64.powf(zoom) * TILE_SIZE
}

pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * 2.0f64.powf(zoom)
        * TILE_SIZE
}

pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
    (x / (TILE_SIZE * 2.0f64.powf(zoom))) * 360.0 - 180.0
}

pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / (TILE_SIZE * 2.0f64.powf(zoom));
    (0.5 * (n.exp() - (-n).exp())).atan().to_degrees()
}

/// Ring and translucent fill of the locate highlight.
fn highlight_colors() -> (Color, Color) {
    (
        palette::HIGHLIGHT,
        Color {
            a: 0.25,
            ..palette::HIGHLIGHT
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

// --- Remote image cache (tiles and marker icons) ---
pub struct ImageCache {
    images: Arc<Mutex<LruCache<String, image::Handle>>>,
    pending: Arc<Mutex<HashSet<String>>>,
    user_agent: String,
}

impl ImageCache {
    pub fn new(user_agent: String) -> Self {
        Self {
            images: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(300).unwrap_or(NonZeroUsize::MIN),
            ))),
            pending: Arc::new(Mutex::new(HashSet::new())),
            user_agent,
        }
    }

    pub fn get(&self, url: &str) -> Option<image::Handle> {
        let mut images = self.images.lock().ok()?;
        images.get(url).cloned()
    }

    /// Starts a background download unless the image is cached or already in flight.
    pub fn request(&self, url: &str) {
        {
            let (Ok(mut pending), Ok(images)) = (self.pending.lock(), self.images.lock()) else {
                return;
            };
            if pending.contains(url) || images.contains(url) {
                return;
            }
            pending.insert(url.to_string());
        }

        let images_arc = Arc::clone(&self.images);
        let pending_arc = Arc::clone(&self.pending);
        let url = url.to_string();
        let user_agent = self.user_agent.clone();

        std::thread::spawn(move || {
            let resp = ureq::get(&url)
                .set("User-Agent", &user_agent)
                .timeout(std::time::Duration::from_secs(10))
                .call();

            match resp {
                Ok(response) => {
                    let mut bytes = Vec::new();
                    if std::io::Read::read_to_end(&mut response.into_reader(), &mut bytes).is_ok()
                    {
                        if let Ok(mut images) = images_arc.lock() {
                            images.put(url.clone(), image::Handle::from_bytes(bytes));
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch image — url={} error={}", url, e);
                }
            }
            if let Ok(mut pending) = pending_arc.lock() {
                pending.remove(&url);
            }
        });
    }
}

pub struct MapView<'a> {
    pub config: &'a MapConfig,
    pub pins: &'a [ApprovedPin],
    pub selection: Option<LatLng>,
    pub highlight: Option<LatLng>,
    pub images: &'a ImageCache,
    pub zoom: f64, // Fractional zoom (e.g., 4.5)
    pub center: LatLng,
}

#[derive(Debug, Clone, Copy, Default)]
struct MapState {
    is_dragging: bool,
    press_position: Option<iced::Point>,
    last_cursor: Option<iced::Point>,
    // Track values between prop updates to handle multiple events per frame
    current_center: (f64, f64), // (lat, lon)
    current_zoom: f64,
    last_prop_center: Option<(f64, f64)>,
    last_prop_zoom: Option<f64>,
}

/// World-to-screen projection for one frame.
#[derive(Debug, Clone, Copy)]
struct Camera {
    x: f64,
    y: f64,
    scale: f64,
    bounds: Rectangle,
}

impl Camera {
    fn new(bounds: Rectangle, center: (f64, f64), zoom: f64) -> Self {
        Self {
            x: lon_to_x(center.1, 0.0),
            y: lat_to_y(center.0, 0.0),
            scale: 2.0f64.powf(zoom),
            bounds,
        }
    }

    fn project(&self, at: LatLng) -> (f32, f32) {
        let wx = lon_to_x(at.lng, 0.0);
        let wy = lat_to_y(at.lat, 0.0);
        (
            self.bounds.x + (self.bounds.width / 2.0) + ((wx - self.x) * self.scale) as f32,
            self.bounds.y + (self.bounds.height / 2.0) + ((wy - self.y) * self.scale) as f32,
        )
    }

    /// Inverse of `project` for a point relative to the widget's top-left corner.
    fn unproject(&self, p: iced::Point) -> Option<LatLng> {
        let rx = (p.x as f64) - (self.bounds.width as f64 / 2.0);
        let ry = (p.y as f64) - (self.bounds.height as f64 / 2.0);
        let lng = x_to_lon(self.x + rx / self.scale, 0.0);
        let lat = y_to_lat(self.y + ry / self.scale, 0.0);

        if (-180.0..=180.0).contains(&lng) && (-MAX_LAT..=MAX_LAT).contains(&lat) {
            Some(LatLng::new(lat, lng))
        } else {
            None
        }
    }
}

impl<'a> MapView<'a> {
    fn draw_marker<Renderer>(&self, renderer: &mut Renderer, icon: &MarkerIcon, x: f32, y: f32)
    where
        Renderer: renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
    {
        let (left, top) = icon.top_left(x, y);
        let rect = Rectangle {
            x: left,
            y: top,
            width: icon.size[0],
            height: icon.size[1],
        };

        if let Some(handle) = self.images.get(icon.image_url) {
            renderer.draw_image(
                advanced::image::Image {
                    handle,
                    filter_method: image::FilterMethod::Linear,
                    rotation: Radians(0.0),
                    opacity: 1.0,
                    snap: false,
                },
                rect,
            );
        } else {
            let [r, g, b] = icon.fallback_rgb;
            let dot = icon.size[0] / 2.0;
            renderer.fill_quad(
                renderer::Quad {
                    bounds: Rectangle {
                        x: x - dot / 2.0,
                        y: y - dot,
                        width: dot,
                        height: dot,
                    },
                    border: Border {
                        color: Color::BLACK,
                        width: 1.0,
                        radius: (dot / 2.0).into(),
                    },
                    ..Default::default()
                },
                Color::from_rgb(r, g, b),
            );
            self.images.request(icon.image_url);
        }
    }

    /// Topmost marker under the cursor: the selection wins over approved pins.
    fn hit_test(&self, camera: &Camera, p: iced::Point) -> Option<Message> {
        if let Some(sel) = self.selection {
            let (x, y) = camera.project(sel);
            if PROPOSAL_ICON.hit(x, y, p.x, p.y) {
                return Some(Message::SelectionClicked);
            }
        }
        self.pins.iter().enumerate().rev().find_map(|(i, pin)| {
            let (x, y) = camera.project(pin.position());
            APPROVED_ICON
                .hit(x, y, p.x, p.y)
                .then_some(Message::PinClicked(i))
        })
    }
}

impl<'a, Theme, Renderer> Widget<Message, Theme, Renderer> for MapView<'a>
where
    Renderer: renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn size(&self) -> iced::Size<Length> {
        iced::Size {
            width: Length::Fill,
            height: Length::Fill,
        }
    }

    fn tag(&self) -> widget::tree::Tag {
        widget::tree::Tag::of::<MapState>()
    }

    fn state(&self) -> widget::tree::State {
        widget::tree::State::new(MapState::default())
    }

    fn layout(
        &self,
        _tree: &mut widget::Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::Node::new(limits.max())
    }

    fn draw(
        &self,
        tree: &widget::Tree,
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        let state = tree.state.downcast_ref::<MapState>();
        let bounds = layout.bounds();

        // Prefer internal state for zero-latency feedback during interactions
        let zoom = if state.last_prop_zoom.is_some() {
            state.current_zoom
        } else {
            self.zoom
        };
        let center = if state.last_prop_center.is_some() {
            state.current_center
        } else {
            (self.center.lat, self.center.lng)
        };
        let camera = Camera::new(bounds, center, zoom);

        renderer.with_layer(bounds, |renderer| {
            renderer.fill_quad(
                renderer::Quad {
                    bounds,
                    border: Border::default(),
                    ..Default::default()
                },
                Color::from_rgb(0.05, 0.05, 0.05),
            );

            // --- Tile Layer ---
            let z = zoom.floor().clamp(0.0, MAX_ZOOM) as u32;
            let num_tiles = 2u32.pow(z);
            let tile_size_z0 = TILE_SIZE / 2.0f64.powf(z as f64);

            let half_w = (bounds.width as f64 / 2.0) / camera.scale;
            let half_h = (bounds.height as f64 / 2.0) / camera.scale;

            let min_tx = ((camera.x - half_w) / tile_size_z0).floor() as i32;
            let max_tx = ((camera.x + half_w) / tile_size_z0).ceil() as i32;
            let min_ty = ((camera.y - half_h) / tile_size_z0).floor() as i32;
            let max_ty = ((camera.y + half_h) / tile_size_z0).ceil() as i32;

            for tx in min_tx..=max_tx {
                if tx < 0 || tx >= num_tiles as i32 {
                    continue;
                }
                for ty in min_ty..=max_ty {
                    if ty < 0 || ty >= num_tiles as i32 {
                        continue;
                    }

                    let coords = TileCoords {
                        x: tx as u32,
                        y: ty as u32,
                        z,
                    };
                    let url = self.config.tile_url_for(coords.z, coords.x, coords.y);

                    let screen_x = bounds.x
                        + (bounds.width / 2.0)
                        + ((tx as f64 * tile_size_z0 - camera.x) * camera.scale) as f32;
                    let screen_y = bounds.y
                        + (bounds.height / 2.0)
                        + ((ty as f64 * tile_size_z0 - camera.y) * camera.scale) as f32;
                    let current_tile_size = (tile_size_z0 * camera.scale) as f32;

                    let tile_rect = Rectangle {
                        x: screen_x,
                        y: screen_y,
                        width: current_tile_size,
                        height: current_tile_size,
                    };

                    if let Some(handle) = self.images.get(&url) {
                        renderer.draw_image(
                            advanced::image::Image {
                                handle,
                                filter_method: image::FilterMethod::Linear,
                                rotation: Radians(0.0),
                                opacity: 1.0,
                                snap: false,
                            },
                            tile_rect,
                        );
                    } else {
                        renderer.fill_quad(
                            renderer::Quad {
                                bounds: tile_rect,
                                ..Default::default()
                            },
                            Color::from_rgb(0.1, 0.1, 0.1),
                        );
                        self.images.request(&url);
                    }
                }
            }
        });

        // --- Marker Layer ---
        renderer.with_layer(bounds, |renderer| {
            for pin in self.pins {
                let (x, y) = camera.project(pin.position());
                if bounds.contains(iced::Point::new(x, y)) {
                    self.draw_marker(renderer, &APPROVED_ICON, x, y);
                }
            }

            if let Some(sel) = self.selection {
                let (x, y) = camera.project(sel);
                self.draw_marker(renderer, &PROPOSAL_ICON, x, y);
            }

            // Locate highlight: translucent ring around the found position
            if let Some(at) = self.highlight {
                let (x, y) = camera.project(at);
                let radius = 24.0;
                let (ring, fill) = highlight_colors();
                renderer.fill_quad(
                    renderer::Quad {
                        bounds: Rectangle {
                            x: x - radius,
                            y: y - radius,
                            width: radius * 2.0,
                            height: radius * 2.0,
                        },
                        border: Border {
                            color: ring,
                            width: 2.0,
                            radius: radius.into(),
                        },
                        ..Default::default()
                    },
                    fill,
                );
            }
        });
    }

    fn on_event(
        &mut self,
        tree: &mut widget::Tree,
        event: Event,
        layout: iced::advanced::Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn advanced::Clipboard,
        shell: &mut advanced::Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> advanced::graphics::core::event::Status {
        let state = tree.state.downcast_mut::<MapState>();
        let bounds = layout.bounds();
        let zoom_prop = self.zoom;
        let center_prop = (self.center.lat, self.center.lng);

        // Initialize or sync internal state from props if props changed externally
        if state.last_prop_center != Some(center_prop) || state.last_prop_zoom != Some(zoom_prop) {
            state.current_center = center_prop;
            state.current_zoom = zoom_prop;
            state.last_prop_center = Some(center_prop);
            state.last_prop_zoom = Some(zoom_prop);
        }

        let current_zoom = state.current_zoom;
        let camera = Camera::new(bounds, state.current_center, current_zoom);
        let cursor_point = cursor.position_in(bounds);

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(p) = cursor_point {
                    let d = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y as f64,
                        mouse::ScrollDelta::Pixels { y, .. } => (y as f64) / 100.0,
                    };
                    let min_zoom = (bounds.width as f64 / TILE_SIZE).log2().max(0.0);
                    let new_zoom = (current_zoom + d * 0.2).clamp(min_zoom, MAX_ZOOM);

                    if (new_zoom - current_zoom).abs() > 0.001 {
                        let new_scale = 2.0f64.powf(new_zoom);

                        // Keep the point under the cursor fixed while zooming
                        let mx = (p.x as f64) - (bounds.width as f64 / 2.0);
                        let my = (p.y as f64) - (bounds.height as f64 / 2.0);

                        let new_camera_x = camera.x + mx / camera.scale - mx / new_scale;
                        let new_camera_y = camera.y + my / camera.scale - my / new_scale;

                        let new_half_w = (bounds.width as f64 / 2.0) / new_scale;
                        let new_camera_x_clamped = if new_half_w * 2.0 >= TILE_SIZE {
                            TILE_SIZE / 2.0
                        } else {
                            new_camera_x.clamp(new_half_w, TILE_SIZE - new_half_w)
                        };
                        let new_camera_y_clamped = new_camera_y.clamp(0.0, TILE_SIZE);

                        let new_center = (
                            y_to_lat(new_camera_y_clamped, 0.0),
                            x_to_lon(new_camera_x_clamped, 0.0),
                        );

                        // Update internal state immediately for next event in same frame
                        state.current_center = new_center;
                        state.current_zoom = new_zoom;

                        shell.publish(Message::MapMoved {
                            center: LatLng::new(new_center.0, new_center.1),
                            zoom: new_zoom,
                        });
                        return advanced::graphics::core::event::Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if cursor.is_over(bounds) {
                    if let Some(position) = cursor.position() {
                        state.is_dragging = true;
                        state.press_position = Some(position);
                        state.last_cursor = Some(position);
                        return advanced::graphics::core::event::Status::Captured;
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let was_dragging = state.is_dragging;
                let press_pos = state.press_position;
                let release_pos = cursor.position();

                state.is_dragging = false;
                state.press_position = None;
                state.last_cursor = None;

                if was_dragging {
                    // Minimal movement between press and release counts as a click
                    if let (Some(p1), Some(p2), Some(local)) = (press_pos, release_pos, cursor_point)
                    {
                        if (p1.x - p2.x).hypot(p1.y - p2.y) < 5.0 {
                            let screen = iced::Point::new(bounds.x + local.x, bounds.y + local.y);
                            if let Some(msg) = self.hit_test(&camera, screen) {
                                shell.publish(msg);
                            } else if let Some(at) = camera.unproject(local) {
                                shell.publish(Message::MapClicked(at));
                            }
                        }
                    }
                    return advanced::graphics::core::event::Status::Captured;
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging {
                    if let Some(last_pos) = state.last_cursor {
                        let delta = position - last_pos;
                        state.last_cursor = Some(position);

                        let new_wx = camera.x - delta.x as f64 / camera.scale;
                        let new_wy = camera.y - delta.y as f64 / camera.scale;

                        let half_vw = (bounds.width as f64 / 2.0) / camera.scale;
                        let half_vh = (bounds.height as f64 / 2.0) / camera.scale;

                        // Center the world when the viewport is larger than it
                        let clamped_wx = if half_vw * 2.0 >= TILE_SIZE {
                            TILE_SIZE / 2.0
                        } else {
                            new_wx.clamp(half_vw, TILE_SIZE - half_vw)
                        };
                        let clamped_wy = if half_vh * 2.0 >= TILE_SIZE {
                            TILE_SIZE / 2.0
                        } else {
                            new_wy.clamp(half_vh, TILE_SIZE - half_vh)
                        };

                        let new_center = (y_to_lat(clamped_wy, 0.0), x_to_lon(clamped_wx, 0.0));
                        state.current_center = new_center;

                        shell.publish(Message::MapMoved {
                            center: LatLng::new(new_center.0, new_center.1),
                            zoom: current_zoom,
                        });
                        return advanced::graphics::core::event::Status::Captured;
                    }
                }
            }
            _ => {}
        }

        advanced::graphics::core::event::Status::Ignored
    }

    fn mouse_interaction(
        &self,
        tree: &widget::Tree,
        layout: iced::advanced::Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        let state = tree.state.downcast_ref::<MapState>();
        if state.is_dragging {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(layout.bounds()) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a, Theme, Renderer> From<MapView<'a>> for Element<'a, Message, Theme, Renderer>
where
    Theme: 'a,
    Renderer: 'a + renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn from(map_view: MapView<'a>) -> Self {
        Self::new(map_view)
    }
}
