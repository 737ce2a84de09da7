// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! The page is a single scrollable column (header, upload, form and, once
//! available, results). The loading overlay and the notification banner are
//! stacked on top of it.

use super::{App, Message};
use crate::capture::camera::CameraState;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::notifications::Toast;
use crate::ui::styles;
use crate::ui::widgets::Spinner;
use crate::ui::{form, results, upload};
use iced::widget::{opaque, Column, Container, Id, Scrollable, Stack, Text};
use iced::{alignment::Horizontal, Element, Length};

/// Identifies the page scrollable for programmatic scrolling.
pub const SCROLLABLE_ID: &str = "eye-fatigue-page";

/// Renders the whole window.
pub fn view(app: &App) -> Element<'_, Message> {
    let camera = match app.session.camera() {
        CameraState::Inactive => upload::CameraView::Inactive,
        CameraState::Starting(_) => upload::CameraView::Starting,
        CameraState::Active(_) => upload::CameraView::Live(app.camera_frame.as_ref()),
    };

    let upload_panel = upload::view(upload::ViewContext {
        i18n: &app.i18n,
        preview: app.preview.as_ref(),
        source_label: app
            .session
            .pending_image()
            .map(|image| image.source().to_string()),
        drop_hovered: app.drop_hovered,
        camera,
    })
    .map(Message::Upload);

    let form_panel = form::view(form::ViewContext {
        i18n: &app.i18n,
        screen_time_input: app.session.screen_time_input(),
        condition: app.session.condition(),
        can_analyze: app.session.can_analyze(),
        can_export: app.session.result().is_some(),
    })
    .map(Message::Form);

    let mut page = Column::new()
        .spacing(spacing::LG)
        .padding(spacing::LG)
        .max_width(sizing::CONTENT_MAX_WIDTH)
        .push(header(&app.i18n))
        .push(upload_panel)
        .push(form_panel);

    if let Some(result) = app.session.result() {
        page = page.push(results::view(results::ViewContext {
            i18n: &app.i18n,
            result,
        }));
    }

    let scrollable = Scrollable::new(Container::new(page).center_x(Length::Fill))
        .id(Id::new(SCROLLABLE_ID))
        .width(Length::Fill)
        .height(Length::Fill);

    let mut stack = Stack::new()
        .width(Length::Fill)
        .height(Length::Fill)
        .push(scrollable);

    if app.session.is_loading() {
        stack = stack.push(loading_overlay(&app.i18n, app.spinner_rotation));
    }

    stack = stack.push(Toast::view_overlay(&app.notifications, &app.i18n).map(Message::Notification));

    stack.into()
}

fn header(i18n: &I18n) -> Element<'_, Message> {
    Column::new()
        .spacing(spacing::XXS)
        .align_x(Horizontal::Center)
        .width(Length::Fill)
        .push(Text::new(i18n.tr("app-title")).size(typography::TITLE_LG))
        .push(Text::new(i18n.tr("app-subtitle")).size(typography::BODY))
        .into()
}

/// Dims the page and blocks input while a request is in flight.
fn loading_overlay(i18n: &I18n, rotation: f32) -> Element<'_, Message> {
    let indicator = Column::new()
        .spacing(spacing::SM)
        .align_x(Horizontal::Center)
        .push(Spinner::new(rotation, palette::PRIMARY_400, sizing::ICON_XL).into_element())
        .push(Text::new(i18n.tr("loading-analyzing")).size(typography::BODY_LG));

    let card = Container::new(indicator)
        .padding(spacing::LG)
        .style(styles::overlay::indicator);

    opaque(
        Container::new(card)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(styles::overlay::backdrop),
    )
}
