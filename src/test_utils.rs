// SPDX-License-Identifier: MPL-2.0
//! Shared helpers for unit tests.
//!
//! Float assertions go through `approx`; `assert_eq!` on computed floats is
//! brittle.

pub use approx::{assert_abs_diff_eq, assert_relative_eq};

/// Tolerance for f32 values that should be exactly equal.
pub const F32_EPSILON: f32 = 1e-6;
