// SPDX-License-Identifier: MPL-2.0
//! User interface components.
//!
//! Panels follow the Elm-style "state down, messages up" pattern: each takes
//! a borrowed `ViewContext` and emits its own `Message`, which the app maps
//! into the top-level message.
//!
//! # Panels
//!
//! - [`upload`] - Drop zone, file picker, image preview and live camera
//! - [`form`] - Screen time and eye condition, plus Analyze/Export/Reset
//! - [`results`] - Scores, level, echoed parameters and recommendations
//!
//! # Shared Infrastructure
//!
//! - [`notifications`] - The single toast banner
//! - [`widgets`] - Canvas spinner for the loading overlay
//! - [`styles`] - Button, container and overlay styles
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)
//! - [`theming`] - Light/Dark/System theme mode

pub mod design_tokens;
pub mod form;
pub mod notifications;
pub mod results;
pub mod styles;
pub mod theming;
pub mod upload;
pub mod widgets;
