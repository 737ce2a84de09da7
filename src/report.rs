// SPDX-License-Identifier: MPL-2.0
//! The downloadable JSON report.
//!
//! Field values are the strings shown on screen, not the raw numbers, so a
//! report reads the same as the results panel it was exported from.

use crate::analysis::{format_hours, AnalysisResult};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

const FILENAME_PREFIX: &str = "eye-fatigue-report-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// ISO-8601 generation time, UTC, millisecond precision.
    pub timestamp: String,
    pub redness_score: String,
    pub dryness_score: String,
    pub fatigue_score: String,
    pub final_fatigue_score: String,
    pub fatigue_level: String,
    pub screen_time: String,
    pub eye_condition: String,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(result: &AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            redness_score: result.redness.display(),
            dryness_score: result.dryness.display(),
            fatigue_score: result.fatigue.display(),
            final_fatigue_score: result.final_fatigue.display(),
            fatigue_level: result.fatigue_level.clone(),
            screen_time: format!("{} hours", format_hours(result.screen_time)),
            eye_condition: result.condition.clone(),
            recommendations: result.recommendations.clone(),
            generated_at: now,
        }
    }

    /// `eye-fatigue-report-<YYYY-MM-DD>.json`, dated like the timestamp.
    pub fn filename(&self) -> String {
        format!("{}{}.json", FILENAME_PREFIX, self.generated_at.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document to `path`, replacing any existing file.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}
