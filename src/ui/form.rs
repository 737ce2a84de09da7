// SPDX-License-Identifier: MPL-2.0
//! Analysis parameters form and the action bar.

use crate::analysis::EyeCondition;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::styles;
use iced::widget::{button, pick_list, text, text_input, Column, Container, Row, Space, Text};
use iced::{alignment::Vertical, Element, Length};

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub screen_time_input: &'a str,
    pub condition: EyeCondition,
    pub can_analyze: bool,
    pub can_export: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    ScreenTimeChanged(String),
    ConditionSelected(EyeCondition),
    Analyze,
    ExportReport,
    Reset,
}

#[must_use]
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let title = Text::new(ctx.i18n.tr("form-title")).size(typography::TITLE_MD);

    let screen_time = field_row(
        ctx.i18n.tr("form-screen-time-label"),
        text_input(&ctx.i18n.tr("form-screen-time-placeholder"), ctx.screen_time_input)
            .on_input(Message::ScreenTimeChanged)
            .on_submit(Message::Analyze)
            .padding(spacing::XS)
            .width(Length::Fill)
            .into(),
    );

    let condition = field_row(
        ctx.i18n.tr("form-condition-label"),
        pick_list(&EyeCondition::ALL[..], Some(ctx.condition), Message::ConditionSelected)
            .padding(spacing::XS)
            .width(Length::Fill)
            .into(),
    );

    let analyze = button(text(ctx.i18n.tr("form-analyze")).size(typography::BODY_LG))
        .padding(spacing::SM)
        .style(styles::button::primary)
        .on_press_maybe(ctx.can_analyze.then_some(Message::Analyze));

    let export = button(text(ctx.i18n.tr("form-export")))
        .padding(spacing::SM)
        .style(styles::button::secondary)
        .on_press_maybe(ctx.can_export.then_some(Message::ExportReport));

    let reset = button(text(ctx.i18n.tr("form-reset")))
        .padding(spacing::SM)
        .style(styles::button::secondary)
        .on_press(Message::Reset);

    let actions = Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .push(analyze)
        .push(Space::new().width(Length::Fill))
        .push(export)
        .push(reset);

    let content = Column::new()
        .spacing(spacing::SM)
        .push(title)
        .push(screen_time)
        .push(condition)
        .push(actions);

    Container::new(content)
        .width(Length::Fill)
        .padding(spacing::MD)
        .style(styles::container::panel)
        .into()
}

fn field_row<'a>(label: String, input: Element<'a, Message>) -> Element<'a, Message> {
    Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .push(
            Text::new(label)
                .size(typography::BODY)
                .width(Length::Fixed(sizing::FIELD_LABEL_WIDTH)),
        )
        .push(input)
        .into()
}
