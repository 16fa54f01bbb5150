//! Camera stream status and the most recently captured photo.
//!
//! # Responsibility
//! - Record the outcome of the platform camera request.
//! - Validate captured frames before they can be attached to a reminder.
//!
//! # Invariants
//! - `current_photo` only ever holds a well-formed `data:image/...;base64,` URI.

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IMAGE_DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/]+={0,2}$")
        .expect("valid data uri regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user or platform refused access.
    PermissionDenied(String),
    /// No camera on this device or API missing.
    Unsupported(String),
    /// Capture attempted while no stream is available.
    Unavailable,
    /// Frame is not an image data URI.
    InvalidPhoto,
}

impl Display for CameraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied(reason) => write!(f, "camera permission denied: {reason}"),
            Self::Unsupported(reason) => write!(f, "camera not supported: {reason}"),
            Self::Unavailable => write!(f, "camera stream is not available"),
            Self::InvalidPhoto => write!(f, "captured frame is not an image data URI"),
        }
    }
}

impl Error for CameraError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraStatus {
    /// Stream request has not resolved yet.
    #[default]
    Pending,
    Ready,
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    status: CameraStatus,
    photo: Option<String>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    /// Applies the resolved camera request.
    ///
    /// Returns the user-facing notice when the camera cannot be used.
    pub fn on_stream_result(&mut self, result: Result<(), CameraError>) -> Option<String> {
        match result {
            Ok(()) => {
                info!("event=camera_stream module=capture status=ok");
                self.status = CameraStatus::Ready;
                None
            }
            Err(err) => {
                warn!("event=camera_stream module=capture status=error error={}", err);
                self.status = CameraStatus::Unavailable;
                Some(format!("Camera access denied or not supported: {err}"))
            }
        }
    }

    /// Stores a captured frame as the current photo.
    ///
    /// # Errors
    /// - `Unavailable` when the stream failed.
    /// - `InvalidPhoto` when `data_uri` is not a base64 image data URI.
    pub fn capture(&mut self, data_uri: &str) -> Result<&str, CameraError> {
        if self.status == CameraStatus::Unavailable {
            return Err(CameraError::Unavailable);
        }
        let data_uri = data_uri.trim();
        if !IMAGE_DATA_URI_RE.is_match(data_uri) {
            return Err(CameraError::InvalidPhoto);
        }
        let photo = self.photo.insert(data_uri.to_string());
        Ok(photo.as_str())
    }

    /// Photo attached to the next submitted reminder.
    pub fn current_photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraError, CameraStatus, CaptureSession};

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn capture_stores_valid_data_uri() {
        let mut session = CaptureSession::new();
        assert_eq!(session.on_stream_result(Ok(())), None);
        assert_eq!(session.capture(PNG), Ok(PNG));
        assert_eq!(session.current_photo(), Some(PNG));
    }

    #[test]
    fn capture_rejects_non_image_payloads() {
        let mut session = CaptureSession::new();
        assert_eq!(
            session.capture("data:text/plain;base64,aGk="),
            Err(CameraError::InvalidPhoto)
        );
        assert_eq!(session.capture(""), Err(CameraError::InvalidPhoto));
        assert_eq!(session.current_photo(), None);
    }

    #[test]
    fn denied_stream_blocks_capture_and_returns_notice() {
        let mut session = CaptureSession::new();
        let notice = session
            .on_stream_result(Err(CameraError::PermissionDenied("NotAllowedError".into())))
            .expect("denied stream should produce a notice");
        assert!(notice.starts_with("Camera access denied or not supported"));
        assert_eq!(session.status(), CameraStatus::Unavailable);
        assert_eq!(session.capture(PNG), Err(CameraError::Unavailable));
    }
}
