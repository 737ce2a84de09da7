// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::analysis::AnalysisResult;
use crate::capture::camera::SessionId;
use crate::capture::PendingImage;
use crate::error::{AnalysisError, CameraError, InputError};
use crate::flow::{Generation, LoadId};
use crate::ui::{form, notifications, upload};
use std::path::PathBuf;
use std::time::Instant;

/// Top-level messages consumed by `App::update`. The variants forward
/// panel messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    Upload(upload::Message),
    Form(form::Message),
    Notification(notifications::NotificationMessage),
    /// Result from the open file dialog.
    OpenFileDialogResult(Option<PathBuf>),
    /// A file is being dragged over the window.
    FileHovered,
    /// The drag left the window without dropping.
    FilesHoveredLeft,
    /// A file was dropped on the window.
    FileDropped(PathBuf),
    /// A file finished loading (or was rejected).
    ImageLoaded {
        load: LoadId,
        result: Result<PendingImage, InputError>,
    },
    /// The camera worker reported whether the device opened.
    CameraOpened {
        id: SessionId,
        result: Result<(), CameraError>,
    },
    /// Refresh of the live camera preview.
    CameraFrameTick,
    AnalysisCompleted {
        generation: Generation,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    /// Result from the report save dialog.
    ExportDialogResult(Option<PathBuf>),
    ReportWritten {
        path: PathBuf,
        result: Result<(), String>,
    },
    /// Periodic tick for notification expiry and the spinner.
    Tick(Instant),
    /// Window close was requested.
    WindowCloseRequested,
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `fr`, `en-US`).
    pub lang: Option<String>,
    /// Optional analysis endpoint, overriding the config file.
    pub endpoint: Option<String>,
    /// Optional image path to preload on startup.
    pub file_path: Option<String>,
    /// Optional data directory override (for state files).
    /// Takes precedence over `EYE_FATIGUE_DATA_DIR`.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `EYE_FATIGUE_CONFIG_DIR`.
    pub config_dir: Option<String>,
}
