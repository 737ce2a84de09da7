// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.

use super::Message;
use iced::{event, time, window, Subscription};
use std::time::Duration;

/// Notification expiry and spinner animation.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Live preview refresh while the camera streams.
const CAMERA_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Routes file drag-and-drop and close requests.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, _status, _window_id| match event {
        event::Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        event::Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        event::Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        event::Event::Window(window::Event::CloseRequested) => Some(Message::WindowCloseRequested),
        _ => None,
    })
}

/// Ticks only while something is animating or counting down.
pub fn create_tick_subscription(is_loading: bool, has_notifications: bool) -> Subscription<Message> {
    if is_loading || has_notifications {
        time::every(TICK_INTERVAL).map(Message::Tick)
    } else {
        Subscription::none()
    }
}

pub fn create_camera_subscription(camera_running: bool) -> Subscription<Message> {
    if camera_running {
        time::every(CAMERA_FRAME_INTERVAL).map(|_| Message::CameraFrameTick)
    } else {
        Subscription::none()
    }
}
