// SPDX-License-Identifier: MPL-2.0
//! Results panel.
//!
//! Rebuilt from the [`AnalysisResult`] on every frame, so the recommendations
//! list always mirrors the latest result exactly.

use crate::analysis::{format_hours, AnalysisResult, Score, SCORE_SCALE_MAX};
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::styles;
use iced::widget::{progress_bar, Column, Container, Row, Text};
use iced::{alignment::Vertical, Element, Length};

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub result: &'a AnalysisResult,
}

/// Labelled scores, in display order.
#[must_use]
pub fn score_rows(result: &AnalysisResult) -> [(&'static str, Score); 4] {
    [
        ("results-redness", result.redness),
        ("results-dryness", result.dryness),
        ("results-fatigue", result.fatigue),
        ("results-final-fatigue", result.final_fatigue),
    ]
}

#[must_use]
pub fn view<'a, Message: 'a>(ctx: ViewContext<'a>) -> Element<'a, Message> {
    let i18n = ctx.i18n;
    let result = ctx.result;

    let mut content = Column::new()
        .spacing(spacing::SM)
        .push(Text::new(i18n.tr("results-title")).size(typography::TITLE_MD));

    if result.demo_mode {
        content = content.push(
            Container::new(Text::new(i18n.tr("results-demo-banner")).size(typography::BODY))
                .width(Length::Fill)
                .padding(spacing::XS)
                .style(styles::container::demo_banner),
        );
    }

    content = content.push(
        Container::new(Text::new(result.level_display()).size(typography::TITLE_SM))
            .padding([spacing::XXS, spacing::SM])
            .style(styles::container::level_badge),
    );

    for (key, score) in score_rows(result) {
        content = content.push(score_row(i18n.tr(key), score));
    }

    content = content
        .push(detail_row(
            i18n.tr("results-screen-time"),
            i18n.tr_with_args(
                "results-screen-time-value",
                &[("hours", format_hours(result.screen_time).as_str())],
            ),
        ))
        .push(detail_row(i18n.tr("results-condition"), result.condition.clone()));

    content = content.push(
        Text::new(i18n.tr("results-recommendations")).size(typography::BODY_LG),
    );
    let recommendations = result.recommendations.iter().fold(
        Column::new().spacing(spacing::XXS),
        |list, item| {
            list.push(
                Row::new()
                    .spacing(spacing::XS)
                    .push(Text::new("•").size(typography::BODY))
                    .push(Text::new(item.clone()).size(typography::BODY)),
            )
        },
    );
    content = content.push(recommendations);

    Container::new(content)
        .width(Length::Fill)
        .padding(spacing::MD)
        .style(styles::container::panel)
        .into()
}

fn score_row<'a, Message: 'a>(label: String, score: Score) -> Element<'a, Message> {
    Row::new()
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .push(
            Text::new(label)
                .size(typography::BODY)
                .width(Length::Fixed(sizing::SCORE_LABEL_WIDTH)),
        )
        .push(progress_bar(0.0..=SCORE_SCALE_MAX as f32, score.bar_value()))
        .push(
            Text::new(score.display())
                .size(typography::BODY)
                .width(Length::Fixed(sizing::SCORE_VALUE_WIDTH)),
        )
        .into()
}

fn detail_row<'a, Message: 'a>(label: String, value: String) -> Element<'a, Message> {
    Row::new()
        .spacing(spacing::SM)
        .push(
            Text::new(label)
                .size(typography::BODY)
                .width(Length::Fixed(sizing::SCORE_LABEL_WIDTH)),
        )
        .push(Text::new(value).size(typography::BODY))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rows_follow_display_order() {
        let result = AnalysisResult {
            redness: Score(1.0),
            dryness: Score(2.0),
            fatigue: Score(3.0),
            final_fatigue: Score(4.0),
            emoji: String::new(),
            fatigue_level: "Low".into(),
            screen_time: 8.0,
            condition: "Normal".into(),
            demo_mode: false,
            recommendations: Vec::new(),
        };
        let rows = score_rows(&result);
        let displayed: Vec<String> = rows.iter().map(|(_, s)| s.display()).collect();
        assert_eq!(displayed, ["1.0/10", "2.0/10", "3.0/10", "4.0/10"]);
        assert_eq!(rows[3].0, "results-final-fatigue");
    }
}
