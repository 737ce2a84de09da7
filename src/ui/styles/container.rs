// SPDX-License-Identifier: MPL-2.0
//! Container styles.

use crate::ui::design_tokens::{border, opacity, palette, radius};
use iced::widget::container;
use iced::{Background, Border, Color, Theme};

/// Card surface for the upload, form and results panels.
///
/// Derived from the theme background so panels read well in light and dark
/// modes.
pub fn panel(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    let base = palette.background.weak.color;

    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::SURFACE,
            ..base
        })),
        border: Border {
            radius: radius::LG.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Dashed-look drop zone; brand-colored while a file hovers over the window.
pub fn drop_zone(hovered: bool) -> impl Fn(&Theme) -> container::Style {
    move |theme: &Theme| {
        let (border_color, width, background) = if hovered {
            (
                palette::PRIMARY_500,
                border::WIDTH_MD,
                Some(Background::Color(Color {
                    a: opacity::OVERLAY_SUBTLE,
                    ..palette::PRIMARY_100
                })),
            )
        } else {
            (palette::GRAY_400, border::WIDTH_SM, None)
        };

        container::Style {
            background,
            border: Border {
                color: border_color,
                width,
                radius: radius::MD.into(),
            },
            text_color: Some(theme.palette().text),
            ..Default::default()
        }
    }
}

/// Warning strip shown when results come from the service's demo mode.
pub fn demo_banner(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::OVERLAY_SUBTLE,
            ..palette::WARNING_500
        })),
        border: Border {
            color: palette::WARNING_500,
            width: border::WIDTH_SM,
            radius: radius::SM.into(),
        },
        ..Default::default()
    }
}

/// Pill around the emoji and fatigue level.
pub fn level_badge(theme: &Theme) -> container::Style {
    let accent = theme.extended_palette().primary.base.color;
    container::Style {
        border: Border {
            color: accent,
            width: border::WIDTH_MD,
            radius: radius::FULL.into(),
        },
        ..Default::default()
    }
}
