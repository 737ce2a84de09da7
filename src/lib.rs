// SPDX-License-Identifier: MPL-2.0
//! `eye_fatigue` is a desktop client for an eye-fatigue analysis service,
//! built with the Iced GUI framework.
//!
//! A photo of an eye (picked from disk, dropped on the window or taken with
//! the camera) is sent with the user's daily screen time and eye condition to
//! an HTTP endpoint. The returned scores, fatigue level and recommendations
//! are shown and can be exported as a JSON report.

pub mod analysis;
pub mod app;
pub mod capture;
pub mod config;
pub mod error;
pub mod flow;
pub mod i18n;
pub mod report;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_utils;
