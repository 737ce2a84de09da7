// SPDX-License-Identifier: MPL-2.0
//! Toast notification banner.
//!
//! One banner at a time, informational or error, dismissing itself after
//! five seconds or on click.
//!
//! # Components
//!
//! - [`notification`] - `Notification` with its severity and deadline
//! - [`manager`] - `Manager` holding the single visible banner
//! - [`toast`] - the banner widget
//!
//! # Usage
//!
//! ```ignore
//! let mut manager = Manager::new();
//! manager.push(Notification::error("notification-no-image"));
//!
//! // In the view, layer the banner over the content
//! let overlay = Toast::view_overlay(&manager, &i18n).map(Message::Notification);
//! ```

mod manager;
mod notification;
mod toast;

pub use manager::{Manager, Message as NotificationMessage};
pub use notification::{Notification, NotificationId, Severity, DISPLAY_DURATION};
pub use toast::Toast;
