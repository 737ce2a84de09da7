// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration of the capture, analyze and
//! present flow.
//!
//! The `App` struct wires together the flow session, localization, the
//! analysis client and the camera backend, and translates messages into side
//! effects like HTTP requests, file dialogs or state persistence.

mod message;
pub mod paths;
pub mod persisted_state;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message};

use crate::analysis::AnalysisClient;
use crate::capture::camera::{CameraBackend, CameraSettings, NokhwaBackend};
use crate::capture::ImageSource;
use crate::config::{self, Config};
use crate::flow::Session;
use crate::i18n::fluent::I18n;
use crate::report::Report;
use crate::ui::notifications::{self, Notification};
use crate::ui::theming::ThemeMode;
use iced::widget::image;
use iced::{window, Element, Subscription, Task, Theme};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Root Iced application state.
pub struct App {
    pub i18n: I18n,
    config: Config,
    session: Session,
    /// `None` when the endpoint could not be turned into a client; analysis
    /// then reports the construction error.
    client: Option<AnalysisClient>,
    camera_backend: Arc<dyn CameraBackend>,
    camera_settings: CameraSettings,
    /// Decoded preview of the pending image.
    preview: Option<image::Handle>,
    /// Latest live camera frame.
    camera_frame: Option<image::Handle>,
    drop_hovered: bool,
    /// The current drag already delivered its file.
    drop_taken: bool,
    spinner_rotation: f32,
    /// Report snapshot waiting for the save dialog.
    pending_export: Option<Report>,
    theme_mode: ThemeMode,
    /// Persisted application state (last dialog directories).
    app_state: persisted_state::AppState,
    /// The notification banner.
    notifications: notifications::Manager,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("phase", &self.session.phase())
            .field("has_image", &self.session.pending_image().is_some())
            .field("endpoint", &self.client.as_ref().map(AnalysisClient::endpoint))
            .finish()
    }
}

pub const WINDOW_DEFAULT_HEIGHT: u32 = 820;
pub const WINDOW_DEFAULT_WIDTH: u32 = 760;
pub const MIN_WINDOW_HEIGHT: u32 = 560;
pub const MIN_WINDOW_WIDTH: u32 = 560;

/// Builds the window settings.
///
/// Close requests are routed through the app so the camera is released
/// before the window goes away.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced 0.14 requires an Fn boot closure; the flags are consumed once.
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl Default for App {
    fn default() -> Self {
        Self::with_config(Config::default(), I18n::default())
    }
}

impl App {
    fn with_config(config: Config, i18n: I18n) -> Self {
        let client = match AnalysisClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::error!(error = %err, "failed to build analysis client");
                None
            }
        };
        Self {
            i18n,
            camera_settings: CameraSettings::from_config(&config),
            theme_mode: config.general.theme_mode,
            config,
            session: Session::new(),
            client,
            camera_backend: Arc::new(NokhwaBackend),
            preview: None,
            camera_frame: None,
            drop_hovered: false,
            drop_taken: false,
            spinner_rotation: 0.0,
            pending_export: None,
            app_state: persisted_state::AppState::default(),
            notifications: notifications::Manager::new(),
        }
    }

    /// Initializes application state and optionally kicks off loading the
    /// image passed on the command line.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (mut config, config_warning) = config::load();
        if let Some(endpoint) = flags.endpoint {
            config.analysis.endpoint = Some(endpoint);
        }
        let i18n = I18n::new(flags.lang, &config);

        let mut app = Self::with_config(config, i18n);

        let (app_state, state_warning) = persisted_state::AppState::load();
        app.app_state = app_state;

        if let Some(key) = config_warning {
            app.notifications.push(Notification::error(key));
        }
        if let Some(key) = state_warning {
            app.notifications.push(Notification::error(key));
        }

        tracing::info!(
            endpoint = %app.config.endpoint(),
            locale = %app.i18n.current_locale(),
            "application started"
        );

        let task = match flags.file_path {
            Some(path) => update::load_image(&mut app, ImageSource::File(PathBuf::from(path))),
            None => Task::none(),
        };

        (app, task)
    }

    fn title(&self) -> String {
        let app_name = self.i18n.tr("window-title");
        match self.session.pending_image() {
            Some(image) => format!("{} - {app_name}", image.source()),
            None => app_name,
        }
    }

    fn theme(&self) -> Theme {
        self.theme_mode.theme()
    }

    fn subscription(&self) -> Subscription<Message> {
        let event_sub = subscription::create_event_subscription();
        let tick_sub = subscription::create_tick_subscription(
            self.session.is_loading(),
            self.notifications.has_notifications(),
        );
        let camera_sub =
            subscription::create_camera_subscription(!self.session.camera().is_inactive());

        Subscription::batch([event_sub, tick_sub, camera_sub])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        update::update(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(self)
    }
}
