// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Analysis**: Service endpoint and request timeout
//! - **Camera**: Device selection, requested resolution, snapshot quality
//! - **Parameters**: Form defaults restored on reset

// ==========================================================================
// Analysis Defaults
// ==========================================================================

/// Default analysis endpoint (a locally running analysis service).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/analyze";

/// Default timeout for one analysis exchange (in seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Minimum allowed timeout (in seconds).
pub const MIN_TIMEOUT_SECS: u64 = 5;

/// Maximum allowed timeout (in seconds).
pub const MAX_TIMEOUT_SECS: u64 = 600;

// ==========================================================================
// Camera Defaults
// ==========================================================================

/// Default camera device index.
pub const DEFAULT_CAMERA_INDEX: u32 = 0;

/// Preferred capture width in pixels.
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;

/// Preferred capture height in pixels.
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;

/// Preferred capture frame rate.
pub const DEFAULT_CAMERA_FPS: u32 = 30;

/// JPEG quality for camera snapshots (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 10;

/// Maximum JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// ==========================================================================
// Parameter Defaults
// ==========================================================================

/// Screen time used when the form value is missing or invalid (hours).
pub const DEFAULT_SCREEN_TIME_HOURS: f64 = 8.0;
