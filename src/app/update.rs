// SPDX-License-Identifier: MPL-2.0
//! Update logic and message handlers for the application.
//!
//! This module contains the main `update` function and the specialized
//! handlers for each panel and each asynchronous completion.

use super::view::SCROLLABLE_ID;
use super::{App, Message};
use crate::analysis::AnalysisResult;
use crate::capture::{self, ImageSource, PendingImage, IMAGE_EXTENSIONS};
use crate::error::{AnalysisError, CameraError, InputError};
use crate::flow::{Completion, Generation, LoadId};
use crate::report::Report;
use crate::ui::notifications::Notification;
use crate::ui::widgets::spinner;
use crate::ui::{form, upload};
use chrono::Utc;
use iced::widget::{image, operation, scrollable::RelativeOffset, Id};
use iced::Task;
use std::path::PathBuf;

/// Routes a top-level message to its handler.
pub fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::Upload(msg) => handle_upload_message(app, msg),
        Message::Form(msg) => handle_form_message(app, msg),
        Message::Notification(msg) => {
            app.notifications.handle_message(&msg);
            Task::none()
        }
        Message::OpenFileDialogResult(Some(path)) => load_image(app, ImageSource::File(path)),
        Message::OpenFileDialogResult(None) => Task::none(),
        Message::FileHovered => {
            app.drop_hovered = true;
            app.drop_taken = false;
            Task::none()
        }
        Message::FilesHoveredLeft => {
            app.drop_hovered = false;
            app.drop_taken = false;
            Task::none()
        }
        Message::FileDropped(path) => {
            app.drop_hovered = false;
            // A multi-file drop arrives as one event per file; only the first counts.
            if app.drop_taken {
                tracing::debug!(path = %path.display(), "ignoring extra dropped file");
                return Task::none();
            }
            app.drop_taken = true;
            load_image(app, ImageSource::Dropped(path))
        }
        Message::ImageLoaded { load, result } => handle_image_loaded(app, load, result),
        Message::CameraOpened { id, result } => {
            if let Err(err) = app.session.camera_opened(id, result) {
                app.camera_frame = None;
                push_camera_error(app, &err);
            }
            Task::none()
        }
        Message::CameraFrameTick => {
            handle_camera_frame_tick(app);
            Task::none()
        }
        Message::AnalysisCompleted {
            generation,
            outcome,
        } => handle_analysis_completed(app, generation, outcome),
        Message::ExportDialogResult(path) => handle_export_dialog_result(app, path),
        Message::ReportWritten { path, result } => {
            handle_report_written(app, path, result);
            Task::none()
        }
        Message::Tick(now) => {
            app.notifications.tick_at(now);
            if app.session.is_loading() {
                app.spinner_rotation = spinner::advance(app.spinner_rotation);
            }
            Task::none()
        }
        Message::WindowCloseRequested => handle_close_requested(app),
    }
}

fn handle_upload_message(app: &mut App, message: upload::Message) -> Task<Message> {
    match message {
        upload::Message::OpenFileDialog => {
            handle_open_file_dialog(app.app_state.last_open_directory.clone())
        }
        upload::Message::RemoveImage => {
            app.session.remove_image();
            app.preview = None;
            Task::none()
        }
        upload::Message::StartCamera => handle_start_camera(app),
        upload::Message::CapturePhoto => {
            let quality = app.camera_settings.jpeg_quality;
            match app.session.capture_photo(quality) {
                Ok(()) => {
                    app.camera_frame = None;
                    app.preview = app.session.pending_image().map(preview_handle);
                }
                Err(err) => {
                    if app.session.camera().is_inactive() {
                        app.camera_frame = None;
                    }
                    push_camera_error(app, &err);
                }
            }
            Task::none()
        }
        upload::Message::CancelCamera => {
            app.session.cancel_camera();
            app.camera_frame = None;
            Task::none()
        }
    }
}

fn handle_form_message(app: &mut App, message: form::Message) -> Task<Message> {
    match message {
        form::Message::ScreenTimeChanged(value) => {
            app.session.set_screen_time_input(value);
            Task::none()
        }
        form::Message::ConditionSelected(condition) => {
            app.session.set_condition(condition);
            Task::none()
        }
        form::Message::Analyze => handle_analyze(app),
        form::Message::ExportReport => handle_export(app),
        form::Message::Reset => {
            app.session.reset();
            app.preview = None;
            app.camera_frame = None;
            app.pending_export = None;
            app.spinner_rotation = 0.0;
            tracing::debug!("session reset");
            operation::snap_to(Id::new(SCROLLABLE_ID), RelativeOffset { x: 0.0, y: 0.0 })
        }
    }
}

/// Handles the open file dialog request.
fn handle_open_file_dialog(last_directory: Option<PathBuf>) -> Task<Message> {
    Task::perform(
        async move {
            let mut dialog = rfd::AsyncFileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);

            if let Some(dir) = last_directory {
                if dir.exists() {
                    dialog = dialog.set_directory(&dir);
                }
            }

            dialog.pick_file().await.map(|h| h.path().to_path_buf())
        },
        Message::OpenFileDialogResult,
    )
}

pub(super) fn load_image(app: &mut App, source: ImageSource) -> Task<Message> {
    let load = app.session.begin_load();
    Task::perform(capture::load_file(source), move |result| {
        Message::ImageLoaded { load, result }
    })
}

fn preview_handle(image: &PendingImage) -> image::Handle {
    image::Handle::from_bytes(image.bytes().to_vec())
}

fn handle_image_loaded(
    app: &mut App,
    load: LoadId,
    result: Result<PendingImage, InputError>,
) -> Task<Message> {
    // Superseded by a newer load, a removal, a capture or a reset.
    if !app.session.is_current_load(load) {
        tracing::debug!(ok = result.is_ok(), "ignoring stale image load");
        return Task::none();
    }
    match result {
        Ok(image) => {
            if let Some(path) = image.source().path() {
                app.app_state.set_last_open_directory_from_file(path);
                if let Some(key) = app.app_state.save() {
                    app.notifications.push(Notification::error(key));
                }
            }
            app.preview = Some(preview_handle(&image));
            app.session.finish_load(load, image);
        }
        Err(err) => {
            tracing::warn!(error = %err, "image rejected");
            let notification = match &err {
                InputError::NotAnImage { name } => {
                    Notification::error(err.i18n_key()).with_arg("name", name.clone())
                }
                InputError::Read(detail) => {
                    Notification::error(err.i18n_key()).with_arg("detail", detail.clone())
                }
            };
            app.notifications.push(notification);
        }
    }
    Task::none()
}

fn handle_start_camera(app: &mut App) -> Task<Message> {
    let backend = app.camera_backend.clone();
    match app.session.start_camera(backend, app.camera_settings) {
        Ok(Some((id, opened))) => Task::perform(
            async move { opened.await.unwrap_or(Err(CameraError::WorkerGone)) },
            move |result| Message::CameraOpened { id, result },
        ),
        Ok(None) => Task::none(),
        Err(err) => {
            push_camera_error(app, &err);
            Task::none()
        }
    }
}

fn handle_camera_frame_tick(app: &mut App) {
    if let Some(err) = app.session.poll_camera_failure() {
        app.camera_frame = None;
        push_camera_error(app, &err);
        return;
    }
    let frame = app
        .session
        .camera()
        .session()
        .and_then(|session| session.latest_frame());
    if let Some(frame) = frame {
        app.camera_frame = Some(image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.to_rgba(),
        ));
    }
}

fn push_camera_error(app: &mut App, err: &CameraError) {
    tracing::warn!(error = %err, "camera error");
    let detail = match err {
        CameraError::Open(detail) | CameraError::Stream(detail) | CameraError::Encode(detail) => {
            detail.clone()
        }
        other => other.to_string(),
    };
    app.notifications
        .push(Notification::error(err.i18n_key()).with_arg("detail", detail));
}

fn handle_analyze(app: &mut App) -> Task<Message> {
    let Some(client) = app.client.clone() else {
        app.notifications.push(
            Notification::error("notification-analysis-transport")
                .with_arg("detail", app.config.endpoint()),
        );
        return Task::none();
    };

    let parameters = app.session.parameters();
    match app.session.begin_analysis(parameters) {
        Ok(ticket) => {
            app.spinner_rotation = 0.0;
            tracing::info!(
                endpoint = client.endpoint(),
                screen_time = ticket.request.screen_time,
                condition = %ticket.request.condition,
                "analysis requested"
            );
            let generation = ticket.generation;
            let request = ticket.request;
            Task::perform(
                async move { client.analyze(&request).await },
                move |outcome| Message::AnalysisCompleted {
                    generation,
                    outcome,
                },
            )
        }
        Err(err) => {
            app.notifications.push(Notification::error(err.i18n_key()));
            Task::none()
        }
    }
}

fn handle_analysis_completed(
    app: &mut App,
    generation: Generation,
    outcome: Result<AnalysisResult, AnalysisError>,
) -> Task<Message> {
    match app.session.finish_analysis(generation, outcome) {
        Completion::Ignored => Task::none(),
        Completion::Presented => {
            operation::snap_to(Id::new(SCROLLABLE_ID), RelativeOffset { x: 0.0, y: 1.0 })
        }
        Completion::Failed(err) => {
            let detail = err.detail().map_or_else(|| err.to_string(), str::to_string);
            app.notifications
                .push(Notification::error(err.i18n_key()).with_arg("detail", detail));
            Task::none()
        }
    }
}

fn handle_export(app: &mut App) -> Task<Message> {
    let report = match app.session.export_report(Utc::now()) {
        Ok(report) => report,
        Err(err) => {
            app.notifications.push(Notification::error(err.i18n_key()));
            return Task::none();
        }
    };

    let filename = report.filename();
    let last_directory = app.app_state.last_export_directory.clone();
    app.pending_export = Some(report);

    Task::perform(
        async move {
            let mut dialog = rfd::AsyncFileDialog::new()
                .set_file_name(&filename)
                .add_filter("JSON", &["json"]);

            if let Some(dir) = last_directory {
                if dir.exists() {
                    dialog = dialog.set_directory(&dir);
                }
            }

            dialog.save_file().await.map(|h| h.path().to_path_buf())
        },
        Message::ExportDialogResult,
    )
}

fn handle_export_dialog_result(app: &mut App, path: Option<PathBuf>) -> Task<Message> {
    let report: Option<Report> = app.pending_export.take();
    let (Some(path), Some(report)) = (path, report) else {
        return Task::none();
    };

    Task::perform(
        async move {
            let result = report.write(&path).await.map_err(|e| e.to_string());
            (path, result)
        },
        |(path, result)| Message::ReportWritten { path, result },
    )
}

fn handle_report_written(app: &mut App, path: PathBuf, result: Result<(), String>) {
    match result {
        Ok(()) => {
            tracing::info!(path = %path.display(), "report exported");
            app.app_state.set_last_export_directory_from_file(&path);
            if let Some(key) = app.app_state.save() {
                app.notifications.push(Notification::error(key));
            }
            app.notifications.push(
                Notification::info("notification-report-saved")
                    .with_arg("path", path.display().to_string()),
            );
        }
        Err(detail) => {
            tracing::error!(path = %path.display(), error = %detail, "report export failed");
            app.notifications
                .push(Notification::error("notification-report-error").with_arg("detail", detail));
        }
    }
}

/// Releases the camera and persists state before exiting.
fn handle_close_requested(app: &mut App) -> Task<Message> {
    app.session.cancel_camera();
    if let Some(key) = app.app_state.save() {
        tracing::warn!(key = %key, "state not saved on exit");
    }
    iced::exit()
}
