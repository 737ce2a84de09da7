// SPDX-License-Identifier: MPL-2.0
//! Image intake: files, drops and camera frames become a [`PendingImage`].

pub mod camera;

use crate::error::{CameraError, InputError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::ExtendedColorType;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a pending image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Chosen in the file picker or passed on the command line.
    File(PathBuf),
    /// Dropped onto the window.
    Dropped(PathBuf),
    /// Still frame from the live camera.
    Camera,
}

impl ImageSource {
    /// File system location, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageSource::File(path) | ImageSource::Dropped(path) => Some(path),
            ImageSource::Camera => None,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", display_name(path)),
            None => write!(f, "camera"),
        }
    }
}

/// The encoded image awaiting analysis.
#[derive(Clone, PartialEq)]
pub struct PendingImage {
    bytes: Vec<u8>,
    mime: String,
    source: ImageSource,
}

impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("source", &self.source)
            .finish()
    }
}

impl PendingImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, source: ImageSource) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            source,
        }
    }

    /// Encoded bytes, as read from disk or produced by the JPEG encoder.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// The payload sent to the service: `data:<mime>;base64,<bytes>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Extensions offered by the file picker filter.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "heic", "avif",
];

/// Checks the declared media type of a path.
///
/// Returns the `image/*` type, or [`InputError::NotAnImage`] for anything
/// else, including files without a recognizable extension.
pub fn image_mime_for(path: &Path) -> Result<String, InputError> {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| InputError::NotAnImage {
            name: display_name(path),
        })
}

/// Reads a file into a pending image, rejecting non-image types before any
/// I/O happens.
pub async fn load_file(source: ImageSource) -> Result<PendingImage, InputError> {
    let Some(path) = source.path().map(Path::to_path_buf) else {
        return Err(InputError::Read("no file path".into()));
    };
    let mime = image_mime_for(&path)?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "image read failed");
        InputError::Read(e.to_string())
    })?;
    tracing::debug!(path = %path.display(), len = bytes.len(), %mime, "image loaded");
    Ok(PendingImage::new(bytes, mime, source))
}

/// One decoded RGB8 camera frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({}x{})", self.width, self.height)
    }
}

impl Frame {
    /// RGBA copy of the pixels for the live preview.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.rgb.len() / 3 * 4);
        for px in self.rgb.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
        }
        rgba
    }

    /// Encodes the frame at its native resolution as a lossy JPEG.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CameraError> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.width == 0 || self.height == 0 || self.rgb.len() != expected {
            return Err(CameraError::Encode(format!(
                "frame buffer of {} bytes does not match {}x{}",
                self.rgb.len(),
                self.width,
                self.height
            )));
        }

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode(&self.rgb, self.width, self.height, ExtendedColorType::Rgb8)
            .map_err(|e| CameraError::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Encodes the frame into a camera-sourced pending image.
    pub fn into_pending_image(self, quality: u8) -> Result<PendingImage, CameraError> {
        let jpeg = self.encode_jpeg(quality)?;
        Ok(PendingImage::new(jpeg, "image/jpeg", ImageSource::Camera))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
