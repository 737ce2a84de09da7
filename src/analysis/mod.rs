// SPDX-License-Identifier: MPL-2.0
//! Analysis parameters, wire types and the scored result.
//!
//! The scoring itself happens in the remote service; this module only
//! describes what is sent ([`AnalysisRequest`]), what comes back
//! ([`AnalysisResponse`]), and the validated [`AnalysisResult`] the rest of
//! the application works with.

pub mod client;

pub use client::AnalysisClient;

use crate::config::DEFAULT_SCREEN_TIME_HOURS;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Upper bound of the score scale.
pub const SCORE_SCALE_MAX: f64 = 10.0;

/// Eye-condition categories offered by the form.
///
/// Serialized with the exact labels the service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EyeCondition {
    #[default]
    Normal,
    #[serde(rename = "Dry Eyes")]
    DryEyes,
    Myopia,
    Hyperopia,
    Astigmatism,
}

impl EyeCondition {
    pub const ALL: [EyeCondition; 5] = [
        EyeCondition::Normal,
        EyeCondition::DryEyes,
        EyeCondition::Myopia,
        EyeCondition::Hyperopia,
        EyeCondition::Astigmatism,
    ];

    /// Label sent to the service and shown in the form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EyeCondition::Normal => "Normal",
            EyeCondition::DryEyes => "Dry Eyes",
            EyeCondition::Myopia => "Myopia",
            EyeCondition::Hyperopia => "Hyperopia",
            EyeCondition::Astigmatism => "Astigmatism",
        }
    }
}

impl fmt::Display for EyeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated daily screen time, in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTime(f64);

impl ScreenTime {
    /// Interprets raw form input.
    ///
    /// Missing, unparseable or non-finite input yields the default of 8
    /// hours. Any other number is sent as typed.
    #[must_use]
    pub fn parse_or_default(input: &str) -> Self {
        input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|hours| hours.is_finite())
            .map_or_else(Self::default, Self)
    }

    #[must_use]
    pub fn hours(self) -> f64 {
        self.0
    }
}

impl Default for ScreenTime {
    fn default() -> Self {
        Self(DEFAULT_SCREEN_TIME_HOURS)
    }
}

/// The two user-supplied values sent alongside the image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisParameters {
    pub screen_time: ScreenTime,
    pub condition: EyeCondition,
}

/// Formats hours the way they are echoed on screen: `10`, `7.5`.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    format!("{}", hours)
}

/// JSON body of the analysis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    /// Image as a base64 data URL.
    pub image: String,
    #[serde(serialize_with = "serialize_hours")]
    pub screen_time: f64,
    pub condition: EyeCondition,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(image: impl Into<String>, parameters: AnalysisParameters) -> Self {
        Self {
            image: image.into(),
            screen_time: parameters.screen_time.hours(),
            condition: parameters.condition,
        }
    }
}

/// Whole hours go out as JSON integers (`10`, not `10.0`).
fn serialize_hours<S: Serializer>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if hours.fract() == 0.0 && hours.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*hours as i64)
    } else {
        serializer.serialize_f64(*hours)
    }
}

/// JSON body returned by the service.
///
/// Every field except `success` is optional on the wire; [`Self::into_result`]
/// decides what a usable success looks like.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redness_score: Option<f64>,
    #[serde(default)]
    pub dryness_score: Option<f64>,
    #[serde(default)]
    pub fatigue_score: Option<f64>,
    #[serde(default)]
    pub final_fatigue: Option<f64>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub fatigue_level: Option<String>,
    #[serde(default)]
    pub screen_time: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub demo_mode: bool,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AnalysisResponse {
    /// Validates the response against the request it answers.
    ///
    /// Missing echoes fall back to the submitted values; missing scores or
    /// level make the response malformed.
    pub fn into_result(self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if !self.success {
            return Err(AnalysisError::Service(
                self.error.filter(|msg| !msg.trim().is_empty()),
            ));
        }

        let score = |value: Option<f64>, field: &str| {
            value
                .filter(|v| v.is_finite())
                .map(Score)
                .ok_or_else(|| AnalysisError::Malformed(format!("missing or invalid `{field}`")))
        };

        Ok(AnalysisResult {
            redness: score(self.redness_score, "redness_score")?,
            dryness: score(self.dryness_score, "dryness_score")?,
            fatigue: score(self.fatigue_score, "fatigue_score")?,
            final_fatigue: score(self.final_fatigue, "final_fatigue")?,
            fatigue_level: self
                .fatigue_level
                .ok_or_else(|| AnalysisError::Malformed("missing `fatigue_level`".into()))?,
            emoji: self.emoji.unwrap_or_default(),
            screen_time: self.screen_time.unwrap_or(request.screen_time),
            condition: self
                .condition
                .unwrap_or_else(|| request.condition.label().to_string()),
            demo_mode: self.demo_mode,
            recommendations: self.recommendations,
        })
    }
}

/// A score on the fixed 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(pub f64);

impl Score {
    /// On-screen text: one decimal and the scale suffix, e.g. `6.2/10`.
    #[must_use]
    pub fn display(self) -> String {
        format!("{:.1}/10", self.0)
    }

    /// Value for a 0-10 progress bar.
    #[must_use]
    pub fn bar_value(self) -> f32 {
        self.0.clamp(0.0, SCORE_SCALE_MAX) as f32
    }
}

/// A successful analysis, as rendered and exported.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub redness: Score,
    pub dryness: Score,
    pub fatigue: Score,
    pub final_fatigue: Score,
    pub emoji: String,
    pub fatigue_level: String,
    pub screen_time: f64,
    pub condition: String,
    pub demo_mode: bool,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Emoji and label, as shown in the level badge.
    #[must_use]
    pub fn level_display(&self) -> String {
        if self.emoji.is_empty() {
            self.fatigue_level.clone()
        } else {
            format!("{} {}", self.emoji, self.fatigue_level)
        }
    }
}
