// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Image(String),
    Report(String),
    Input(InputError),
    Camera(CameraError),
    Analysis(AnalysisError),
}

/// Rejections of a file offered as the pending image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The declared media type is not `image/*`.
    NotAnImage { name: String },

    /// The file could not be read.
    Read(String),
}

impl InputError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            InputError::NotAnImage { .. } => "notification-input-not-image",
            InputError::Read(_) => "notification-input-read-error",
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotAnImage { name } => write!(f, "Not an image file: {}", name),
            InputError::Read(msg) => write!(f, "Failed to read file: {}", msg),
        }
    }
}

/// Camera device and capture failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No camera device matches the configured index.
    NotFound,

    /// The platform refused access to the camera.
    PermissionDenied,

    /// The device exists but could not be opened.
    Open(String),

    /// The stream failed after opening.
    Stream(String),

    /// Capture was requested before the first frame arrived.
    NoFrame,

    /// The captured frame could not be encoded.
    Encode(String),

    /// The capture worker exited unexpectedly.
    WorkerGone,
}

impl CameraError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            CameraError::NotFound => "notification-camera-not-found",
            CameraError::PermissionDenied => "notification-camera-denied",
            CameraError::Open(_) | CameraError::WorkerGone => "notification-camera-open-error",
            CameraError::Stream(_) => "notification-camera-stream-error",
            CameraError::NoFrame => "notification-camera-no-frame",
            CameraError::Encode(_) => "notification-camera-encode-error",
        }
    }

    /// Categorizes a raw backend error message.
    ///
    /// Camera backends report everything as strings, so the wording is the
    /// only signal for telling a refused permission from a missing device.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("permission")
            || msg_lower.contains("denied")
            || msg_lower.contains("not authorized")
            || msg_lower.contains("unauthorized")
        {
            return CameraError::PermissionDenied;
        }

        if msg_lower.contains("not found")
            || msg_lower.contains("no device")
            || msg_lower.contains("could not find")
            || msg_lower.contains("no such")
            || msg_lower.contains("out of range")
        {
            return CameraError::NotFound;
        }

        CameraError::Open(msg.to_string())
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NotFound => write!(f, "No camera found"),
            CameraError::PermissionDenied => write!(f, "Camera access denied"),
            CameraError::Open(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::Stream(msg) => write!(f, "Camera stream failed: {}", msg),
            CameraError::NoFrame => write!(f, "No frame available yet"),
            CameraError::Encode(msg) => write!(f, "Failed to encode frame: {}", msg),
            CameraError::WorkerGone => write!(f, "Camera worker stopped unexpectedly"),
        }
    }
}

/// Failures of the exchange with the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Connection, TLS or other transport-level failure.
    Transport(String),

    /// No response within the configured timeout.
    Timeout,

    /// Non-success HTTP status, with the service message when the body had one.
    Status { code: u16, message: Option<String> },

    /// The body was not the expected JSON shape.
    Malformed(String),

    /// The service answered `success: false`.
    Service(Option<String>),
}

impl AnalysisError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AnalysisError::Transport(_) => "notification-analysis-transport",
            AnalysisError::Timeout => "notification-analysis-timeout",
            AnalysisError::Status { .. } => "notification-analysis-status",
            AnalysisError::Malformed(_) => "notification-analysis-malformed",
            AnalysisError::Service(_) => "notification-analysis-failed",
        }
    }

    /// The most specific human-readable message available.
    ///
    /// A message supplied by the service wins over a transport description.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::Service(message) => message.as_deref(),
            AnalysisError::Status { message, .. } => message.as_deref(),
            AnalysisError::Transport(msg) | AnalysisError::Malformed(msg) => Some(msg),
            AnalysisError::Timeout => None,
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Transport(msg) => write!(f, "Network error: {}", msg),
            AnalysisError::Timeout => write!(f, "Analysis request timed out"),
            AnalysisError::Status { code, message } => match message {
                Some(msg) => write!(f, "HTTP {}: {}", code, msg),
                None => write!(f, "HTTP status {}", code),
            },
            AnalysisError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            AnalysisError::Service(Some(msg)) => write!(f, "{}", msg),
            AnalysisError::Service(None) => write!(f, "Analysis failed"),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout
        } else if err.is_decode() {
            AnalysisError::Malformed(err.to_string())
        } else {
            AnalysisError::Transport(err.to_string())
        }
    }
}

/// Precondition failures of the capture-analyze-present flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    /// Analysis requested without a pending image.
    NoImage,

    /// Export requested before any analysis succeeded.
    NoResult,

    /// Analysis requested while another one is in flight.
    Busy,
}

impl FlowError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            FlowError::NoImage => "notification-no-image",
            FlowError::NoResult => "notification-no-result",
            FlowError::Busy => "notification-analysis-busy",
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::NoImage => write!(f, "No image selected"),
            FlowError::NoResult => write!(f, "No analysis result to export"),
            FlowError::Busy => write!(f, "An analysis is already running"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Image(e) => write!(f, "Image Error: {}", e),
            Error::Report(e) => write!(f, "Report Error: {}", e),
            Error::Input(e) => write!(f, "Input Error: {}", e),
            Error::Camera(e) => write!(f, "Camera Error: {}", e),
            Error::Analysis(e) => write!(f, "Analysis Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<InputError> for Error {
    fn from(err: InputError) -> Self {
        Error::Input(err)
    }
}

impl From<CameraError> for Error {
    fn from(err: CameraError) -> Self {
        Error::Camera(err)
    }
}

impl From<AnalysisError> for Error {
    fn from(err: AnalysisError) -> Self {
        Error::Analysis(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Report(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
