// SPDX-License-Identifier: MPL-2.0
//! Image input panel: drop zone, file picker, preview and live camera.

use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::styles;
use iced::widget::image::{self, Image};
use iced::widget::{button, text, Column, Container, Row, Text};
use iced::{alignment::Horizontal, ContentFit, Element, Length};

/// What the camera part of the panel shows.
#[derive(Debug, Clone, Copy)]
pub enum CameraView<'a> {
    Inactive,
    /// Waiting for the device to open.
    Starting,
    /// Streaming; the frame is `None` until the first one arrives.
    Live(Option<&'a image::Handle>),
}

/// Contextual data needed to render the panel.
pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub preview: Option<&'a image::Handle>,
    /// File name or "camera", shown under the preview.
    pub source_label: Option<String>,
    pub drop_hovered: bool,
    pub camera: CameraView<'a>,
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenFileDialog,
    RemoveImage,
    StartCamera,
    CapturePhoto,
    CancelCamera,
}

#[must_use]
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let title = Text::new(ctx.i18n.tr("upload-title")).size(typography::TITLE_MD);

    let body: Element<'_, Message> = match ctx.camera {
        CameraView::Starting => camera_view(ctx.i18n, None, true),
        CameraView::Live(frame) => camera_view(ctx.i18n, frame, false),
        CameraView::Inactive => match ctx.preview {
            Some(handle) => preview_view(ctx.i18n, handle, ctx.source_label),
            None => drop_zone_view(ctx.i18n, ctx.drop_hovered),
        },
    };

    let content = Column::new()
        .spacing(spacing::SM)
        .push(title)
        .push(body);

    Container::new(content)
        .width(Length::Fill)
        .padding(spacing::MD)
        .style(styles::container::panel)
        .into()
}

fn drop_zone_view(i18n: &I18n, hovered: bool) -> Element<'_, Message> {
    let prompt_key = if hovered {
        "upload-drop-release"
    } else {
        "upload-drop-prompt"
    };

    let zone = Column::new()
        .spacing(spacing::SM)
        .align_x(Horizontal::Center)
        .push(Text::new("👁").size(sizing::ICON_XL))
        .push(Text::new(i18n.tr(prompt_key)).size(typography::BODY_LG))
        .push(Text::new(i18n.tr("upload-formats-hint")).size(typography::CAPTION));

    let zone = Container::new(zone)
        .width(Length::Fill)
        .height(Length::Fixed(sizing::PREVIEW_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(sizing::PREVIEW_HEIGHT))
        .style(styles::container::drop_zone(hovered));

    let actions = Row::new()
        .spacing(spacing::SM)
        .push(
            button(text(i18n.tr("upload-choose-file")))
                .on_press(Message::OpenFileDialog)
                .padding(spacing::XS)
                .style(styles::button::primary),
        )
        .push(
            button(text(i18n.tr("upload-use-camera")))
                .on_press(Message::StartCamera)
                .padding(spacing::XS)
                .style(styles::button::secondary),
        );

    Column::new()
        .spacing(spacing::SM)
        .push(zone)
        .push(actions)
        .into()
}

fn preview_view<'a>(
    i18n: &'a I18n,
    handle: &'a image::Handle,
    source_label: Option<String>,
) -> Element<'a, Message> {
    let picture = Image::new(handle.clone())
        .content_fit(ContentFit::Contain)
        .width(Length::Fill)
        .height(Length::Fixed(sizing::PREVIEW_HEIGHT));

    let mut column = Column::new().spacing(spacing::SM).push(picture);
    if let Some(label) = source_label {
        column = column.push(Text::new(label).size(typography::CAPTION));
    }

    let actions = Row::new()
        .spacing(spacing::SM)
        .push(
            button(text(i18n.tr("upload-remove")))
                .on_press(Message::RemoveImage)
                .padding(spacing::XS)
                .style(styles::button::secondary),
        )
        .push(
            button(text(i18n.tr("upload-use-camera")))
                .on_press(Message::StartCamera)
                .padding(spacing::XS)
                .style(styles::button::secondary),
        );

    column.push(actions).into()
}

fn camera_view<'a>(
    i18n: &'a I18n,
    frame: Option<&'a image::Handle>,
    starting: bool,
) -> Element<'a, Message> {
    let live: Element<'a, Message> = match frame {
        Some(handle) => Image::new(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fixed(sizing::PREVIEW_HEIGHT))
            .into(),
        None => {
            let key = if starting {
                "camera-starting"
            } else {
                "camera-waiting-frame"
            };
            Container::new(Text::new(i18n.tr(key)).size(typography::BODY))
                .width(Length::Fill)
                .height(Length::Fixed(sizing::PREVIEW_HEIGHT))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(sizing::PREVIEW_HEIGHT))
                .style(styles::container::drop_zone(false))
                .into()
        }
    };

    // Capture needs a frame to take
    let capture = button(text(i18n.tr("camera-capture")))
        .padding(spacing::XS)
        .style(styles::button::primary)
        .on_press_maybe(frame.map(|_| Message::CapturePhoto));

    let actions = Row::new()
        .spacing(spacing::SM)
        .push(capture)
        .push(
            button(text(i18n.tr("camera-cancel")))
                .on_press(Message::CancelCamera)
                .padding(spacing::XS)
                .style(styles::button::secondary),
        );

    Column::new()
        .spacing(spacing::SM)
        .push(live)
        .push(actions)
        .into()
}
