//! Facial photo capture. The camera is an external collaborator behind
//! `PhotoSource`; the workflow only ever sees the encoded still.

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use std::{fmt, io, path::PathBuf, time::SystemTime};
use thiserror::Error;
use tracing::{debug, instrument};

/// A still image as a `data:` URL with a base64 payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(String);

impl Photo {
    #[must_use]
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", Base64::encode_string(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// Payloads are large and personal; never print them.
impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Photo({} bytes)", self.0.len())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Camera permission denied.")]
    PermissionDenied,
    #[error("No camera found.")]
    NotFound,
    #[error("The camera is in use by another application.")]
    Busy,
    #[error("Could not access the camera.")]
    Unavailable,
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::WouldBlock => Self::Busy,
            _ => Self::Unavailable,
        }
    }
}

#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Acquire the device, take one still and release it.
    ///
    /// # Errors
    /// Returns a `CaptureError` describing why no still could be taken.
    async fn capture(&self) -> Result<Photo, CaptureError>;
}

/// Takes the most recent still a kiosk camera dropped into a directory.
#[derive(Debug, Clone)]
pub struct FilePhotoSource {
    dir: PathBuf,
}

impl FilePhotoSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn mime_for(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[async_trait]
impl PhotoSource for FilePhotoSource {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn capture(&self) -> Result<Photo, CaptureError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut latest: Option<(SystemTime, PathBuf, &'static str)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(mime) = mime_for(&path) else {
                continue;
            };
            let modified = entry
                .metadata()
                .await
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if latest.as_ref().map_or(true, |(seen, _, _)| modified >= *seen) {
                latest = Some((modified, path, mime));
            }
        }

        let (_, path, mime) = latest.ok_or(CaptureError::Unavailable)?;
        let bytes = tokio::fs::read(&path).await?;
        if bytes.is_empty() {
            return Err(CaptureError::Unavailable);
        }
        debug!("Captured still from {}", path.display());

        Ok(Photo::encode(mime, &bytes))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_builds_data_url() {
        let photo = Photo::encode("image/jpeg", b"hello");
        assert_eq!(photo.as_str(), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn debug_hides_payload() {
        let photo = Photo::from_data_url("data:image/jpeg;base64,c2VjcmV0");
        let printed = format!("{photo:?}");
        assert!(!printed.contains("c2VjcmV0"));
    }

    #[test]
    fn io_errors_map_to_camera_messages() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(CaptureError::from(denied), CaptureError::PermissionDenied);
        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(
            CaptureError::from(missing).to_string(),
            "No camera found."
        );
    }

    #[tokio::test]
    async fn file_source_reads_an_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        std::fs::write(dir.path().join("still.png"), b"png-bytes").unwrap();

        let photo = FilePhotoSource::new(dir.path()).capture().await.unwrap();
        assert!(photo.as_str().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn file_source_without_images_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = FilePhotoSource::new(dir.path()).capture().await;
        assert_eq!(result, Err(CaptureError::Unavailable));
    }

    #[tokio::test]
    async fn missing_directory_means_no_camera() {
        let dir = tempfile::tempdir().unwrap();
        let result = FilePhotoSource::new(dir.path().join("absent"))
            .capture()
            .await;
        assert_eq!(result, Err(CaptureError::NotFound));
    }
}
