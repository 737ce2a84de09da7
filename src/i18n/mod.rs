// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the application.
//!
//! Translations are Fluent `.ftl` files embedded from `assets/i18n/`. The
//! active locale is chosen from the CLI `--lang` flag, then the config file,
//! then the OS locale, and finally `en-US`.

pub mod fluent;
