use haunt_map_core::locate::geolocator_from_config;
use haunt_map_core::pins::{load_approved_pins, ApprovedPin, HttpPinSource};
use haunt_map_core::submit::{self, HttpFormTransport, SUCCESS_NOTICE};
use haunt_map_core::{LatLng, MapConfig, MapSession};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::{
    button, column, container, horizontal_space, opaque, row, stack, text, text_input,
};
use iced::{Element, Length, Task, Theme};
use log::{error, warn, LevelFilter};

mod map;
mod style;
use map::{ImageCache, MapView};

fn main() -> iced::Result {
    init_logging();
    iced::application("Haunt Map", App::update, App::view)
        .theme(|_| Theme::Dark)
        .run_with(App::new)
}

fn init_logging() {
    use simplelog::{
        ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_dir = haunt_map_core::get_config_root();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        if let Ok(file) = std::fs::File::create(log_dir.join("haunt-map.log")) {
            loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
        }
    }

    let _ = CombinedLogger::init(loggers);
}

#[derive(Debug, Clone)]
enum Message {
    PinsLoaded(Vec<ApprovedPin>),

    // Map surface
    MapMoved { center: LatLng, zoom: f64 },
    MapClicked(LatLng),
    PinClicked(usize),
    ClosePinPopup,

    // Selection popup
    SelectionClicked,
    AffirmSelection,
    DismissSelectionPopup,

    // Drawer
    ToggleDrawer,
    DescriptionChanged(String),
    SubmittedByChanged(String),
    AddressChanged(String),
    Submit,
    Submitted(Result<(), String>),

    // Locate control
    Locate,
    Located(Result<LatLng, String>),
    HighlightExpired(u64),

    DismissAlert,
}

struct App {
    session: MapSession,
    images: ImageCache,
    status: String,
    open_pin: Option<usize>,
    alert: Option<String>,
    submitting: bool,
    locating: bool,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let (config, alert) = match MapConfig::load(None) {
            Ok(c) => (c, None),
            Err(e) => {
                error!("Config error, falling back to defaults: {:#}", e);
                (MapConfig::default(), Some(format!("{:#}", e)))
            }
        };

        let app = Self::with_config(config.clone(), alert);
        (
            app,
            Task::perform(load_pins(config), Message::PinsLoaded),
        )
    }

    fn with_config(config: MapConfig, alert: Option<String>) -> Self {
        Self {
            images: ImageCache::new(config.user_agent.clone()),
            status: "Loading pins...".to_string(),
            open_pin: None,
            alert,
            submitting: false,
            locating: false,
            session: MapSession::new(config),
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PinsLoaded(pins) => {
                self.status = format!("{} approved pins", pins.len());
                self.session.show_pins(pins);
                Task::none()
            }
            Message::MapMoved { center, zoom } => {
                self.session.set_view(center, zoom);
                Task::none()
            }
            Message::MapClicked(at) => {
                self.open_pin = None;
                self.session.click_map(at);
                Task::none()
            }
            Message::PinClicked(i) => {
                // Only one popup at a time; a pending confirmation popup closes like its close button
                self.session.dismiss_popup();
                self.open_pin = Some(i);
                Task::none()
            }
            Message::ClosePinPopup => {
                self.open_pin = None;
                Task::none()
            }
            Message::SelectionClicked => {
                self.open_pin = None;
                self.session.reopen_selection_popup();
                Task::none()
            }
            Message::AffirmSelection => {
                self.session.affirm_selection();
                Task::none()
            }
            Message::DismissSelectionPopup => {
                self.session.dismiss_popup();
                Task::none()
            }
            Message::ToggleDrawer => {
                self.session.toggle_drawer();
                Task::none()
            }
            Message::DescriptionChanged(v) => {
                self.session.form_mut().description = v;
                Task::none()
            }
            Message::SubmittedByChanged(v) => {
                self.session.form_mut().submitted_by = v;
                Task::none()
            }
            Message::AddressChanged(v) => {
                self.session.form_mut().address = v;
                Task::none()
            }
            Message::Submit if self.submitting => Task::none(),
            Message::Submit => match self.session.prepare_submission() {
                Ok(payload) => {
                    self.submitting = true;
                    self.status = "Sending...".to_string();
                    Task::perform(
                        post_submission(self.session.config.clone(), payload),
                        Message::Submitted,
                    )
                }
                Err(e) => {
                    self.alert = Some(e.alert_text());
                    Task::none()
                }
            },
            Message::Submitted(result) => {
                self.submitting = false;
                match result {
                    Ok(()) => {
                        self.session.complete_submission();
                        self.status = "Submission sent".to_string();
                        self.alert = Some(SUCCESS_NOTICE.to_string());
                    }
                    Err(alert) => {
                        self.status = "Submission failed".to_string();
                        self.alert = Some(alert);
                    }
                }
                Task::none()
            }
            Message::Locate => {
                if self.locating {
                    return Task::none();
                }
                self.locating = true;
                Task::perform(
                    locate_position(self.session.config.clone()),
                    Message::Located,
                )
            }
            Message::Located(result) => {
                self.locating = false;
                match result {
                    Ok(at) => {
                        let recenter = self.session.apply_located(at);
                        let generation = recenter.highlight.generation;
                        Task::perform(tokio::time::sleep(recenter.highlight_for), move |_| {
                            Message::HighlightExpired(generation)
                        })
                    }
                    Err(alert) => {
                        self.alert = Some(alert);
                        Task::none()
                    }
                }
            }
            Message::HighlightExpired(generation) => {
                self.session.expire_highlight(generation);
                Task::none()
            }
            Message::DismissAlert => {
                self.alert = None;
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let header = container(
            row![
                text("Haunt Map").size(20),
                text(&self.status).size(12).color(style::palette::TEXT_SECONDARY),
                horizontal_space(),
                button(text(self.session.drawer.toggle_label()).size(13))
                    .on_press(Message::ToggleDrawer)
                    .style(style::button_primary)
                    .padding([6, 12]),
            ]
            .spacing(15)
            .align_y(iced::Alignment::Center),
        )
        .padding([10, 15])
        .width(Length::Fill)
        .style(style::container_drawer);

        let map_area = self.view_map();

        let body: Element<'_, Message> = if self.session.drawer.open {
            row![map_area, self.view_drawer()].into()
        } else {
            map_area
        };

        let content = column![header, body];

        match &self.alert {
            Some(alert) => stack![content, self.view_alert(alert)].into(),
            None => content.into(),
        }
    }

    fn view_map(&self) -> Element<'_, Message> {
        let surface = &self.session.surface;
        let map_view = MapView {
            config: &self.session.config,
            pins: &surface.pins,
            selection: self.session.selection.position(),
            highlight: self.session.highlight.map(|h| h.at),
            images: &self.images,
            zoom: surface.zoom,
            center: surface.center,
        };

        let locate_btn = button(text("◎ Locate me").size(12))
            .on_press_maybe((!self.locating).then_some(Message::Locate))
            .style(style::button_secondary)
            .padding([6, 10]);

        let controls = container(opaque(locate_btn))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(12)
            .align_x(Horizontal::Left)
            .align_y(Vertical::Top);

        let attribution = container(
            container(text("© OpenStreetMap contributors").size(10))
                .padding([2, 6])
                .style(style::container_attribution),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Right)
        .align_y(Vertical::Bottom);

        let mut layers = stack![map_view, controls, attribution]
            .width(Length::Fill)
            .height(Length::Fill);

        if let Some(popup) = self.view_popup() {
            layers = layers.push(
                container(opaque(popup))
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .padding(12)
                    .align_x(Horizontal::Center)
                    .align_y(Vertical::Top),
            );
        }

        layers.into()
    }

    fn view_popup(&self) -> Option<Element<'_, Message>> {
        let close = |msg: Message| {
            button(text("×").size(16))
                .on_press(msg)
                .style(style::button_ghost)
                .padding([0, 6])
        };

        if self.session.selection.popup_open() {
            let at = self.session.selection.position()?;
            let card = column![
                row![
                    text("🎃 Selected location").size(15),
                    horizontal_space(),
                    close(Message::DismissSelectionPopup),
                ]
                .align_y(iced::Alignment::Center),
                text(at.to_string())
                    .size(11)
                    .color(style::palette::TEXT_SECONDARY),
                button(text("Submit this location").size(13))
                    .on_press(Message::AffirmSelection)
                    .style(style::button_primary)
                    .padding([6, 12]),
            ]
            .spacing(8)
            .width(Length::Fixed(260.0));

            return Some(
                container(card)
                    .padding(12)
                    .style(style::container_popup)
                    .into(),
            );
        }

        let pin = self.open_pin.and_then(|i| self.session.pins().get(i))?;
        let card = column![
            row![
                text(&pin.description).size(16),
                horizontal_space(),
                close(Message::ClosePinPopup),
            ]
            .align_y(iced::Alignment::Center),
            text(&pin.address).size(13),
            text(format!("Submitted by: {}", pin.name))
                .size(12)
                .color(style::palette::TEXT_SECONDARY),
        ]
        .spacing(6)
        .width(Length::Fixed(280.0));

        Some(
            container(card)
                .padding(12)
                .style(style::container_popup)
                .into(),
        )
    }

    fn view_drawer(&self) -> Element<'_, Message> {
        let form = &self.session.drawer.form;

        let location = match self.session.selection.position() {
            Some(at) => format!("Location: {}", at),
            None => "Click the map to drop a pin.".to_string(),
        };

        let submit = button(
            text(if self.submitting { "Sending..." } else { "Submit" })
                .size(13)
                .align_x(Horizontal::Center),
        )
        .on_press_maybe((!self.submitting).then_some(Message::Submit))
        .style(style::button_primary)
        .width(Length::Fill)
        .padding([8, 12]);

        container(
            column![
                text("Submit a New House").size(18),
                text(location).size(12).color(style::palette::TEXT_SECONDARY),
                text("Description").size(12),
                text_input("What makes it spooky?", &form.description)
                    .on_input(Message::DescriptionChanged)
                    .padding(8),
                text("Your Name").size(12),
                text_input("Name", &form.submitted_by)
                    .on_input(Message::SubmittedByChanged)
                    .padding(8),
                text("Address").size(12),
                text_input("Street address (optional)", &form.address)
                    .on_input(Message::AddressChanged)
                    .on_submit_maybe((!self.submitting).then_some(Message::Submit))
                    .padding(8),
                submit,
            ]
            .spacing(10),
        )
        .padding(15)
        .width(Length::Fixed(320.0))
        .height(Length::Fill)
        .style(style::container_drawer)
        .into()
    }

    fn view_alert<'a>(&self, alert: &'a str) -> Element<'a, Message> {
        let card = container(
            column![
                text(alert).size(14),
                button(text("OK").size(13).align_x(Horizontal::Center))
                    .on_press(Message::DismissAlert)
                    .style(style::button_primary)
                    .padding([6, 24]),
            ]
            .spacing(15)
            .align_x(Horizontal::Center),
        )
        .padding(20)
        .max_width(420.0)
        .style(style::container_popup);

        opaque(
            container(card)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center)
                .style(style::container_backdrop),
        )
    }
}

async fn load_pins(config: MapConfig) -> Vec<ApprovedPin> {
    let result = tokio::task::spawn_blocking(move || match HttpPinSource::new(&config) {
        Ok(source) => load_approved_pins(&source),
        Err(e) => {
            error!("Failed to load pins: {}", e);
            Vec::new()
        }
    })
    .await;

    result.unwrap_or_else(|e| {
        error!("Pin loader task failed: {}", e);
        Vec::new()
    })
}

async fn post_submission(config: MapConfig, payload: Vec<(String, String)>) -> Result<(), String> {
    tokio::task::spawn_blocking(move || {
        let result =
            HttpFormTransport::new(&config).and_then(|t| submit::send(&t, &payload));
        result.map_err(|e| {
            error!("Submission failed: {}", e);
            e.alert_text()
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

async fn locate_position(config: MapConfig) -> Result<LatLng, String> {
    tokio::task::spawn_blocking(move || {
        geolocator_from_config(&config).locate().map_err(|e| {
            warn!("Locate failed: {}", e);
            e.alert_text()
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_to_submit() -> App {
        let mut app = App::with_config(MapConfig::default(), None);
        app.session.click_map(LatLng::new(10.0, 20.0));
        app.session.affirm_selection();
        let form = app.session.form_mut();
        form.description = "D".to_string();
        form.submitted_by = "S".to_string();
        app
    }

    #[test]
    fn test_submit_while_in_flight_is_ignored() {
        let mut app = ready_to_submit();

        let _ = app.update(Message::Submit);
        assert!(app.submitting);
        assert_eq!(app.status, "Sending...");

        app.status = "in flight".to_string();
        let _ = app.update(Message::Submit);
        assert_eq!(app.status, "in flight");
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_failed_post_allows_retry() {
        let mut app = ready_to_submit();

        let _ = app.update(Message::Submit);
        let _ = app.update(Message::Submitted(Err(
            "Error connecting to Google Form.".to_string()
        )));
        assert!(!app.submitting);
        assert_eq!(app.session.selection.position(), Some(LatLng::new(10.0, 20.0)));

        let _ = app.update(Message::Submit);
        assert!(app.submitting);
    }
}
