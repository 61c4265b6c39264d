//! Upload harness: send gauge photos to the upload endpoint and report the
//! outcome as result panels

use std::path::Path;
use std::sync::Arc;

use pressure_watcher::api::FILE_FIELD;
use pressure_watcher::io::{FilePart, HttpClient};
use pressure_watcher::reading::UploadResponse;
use pressure_watcher::render::{escape_html, format_timestamp};

use crate::dummy_image::{create_dummy_image, ImageBlob, UPLOAD_FILE_NAME};
use crate::error::{HarnessError, Result};
use crate::panel::{ResultDisplay, ResultPanel};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// A file picked by the user, with its declared media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Read `path`, declaring `media_type` or a type guessed from the extension
    pub async fn from_path(path: &Path, media_type: Option<String>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type.unwrap_or_else(|| guess_media_type(path).to_string());
        tracing::debug!("Selected {} ({}, {} bytes)", name, media_type, bytes.len());
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Media type for a file extension
pub fn guess_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Success panel body for an upload response
pub fn success_html(data: &UploadResponse) -> String {
    let mut html = String::from("<h3>Upload Successful!</h3>");
    html.push_str(&format!(
        "<p><strong>Timestamp:</strong> {}</p>",
        escape_html(&format_timestamp(data.timestamp.as_ref()))
    ));
    let pressure = data
        .pressure
        .map(|p| p.to_string())
        .unwrap_or_else(|| "undefined".to_string());
    html.push_str(&format!(
        "<p><strong>Pressure Reading:</strong> {} PSI</p>",
        pressure
    ));
    html.push_str(&format!(
        "<p><strong>Status:</strong> {}</p>",
        escape_html(data.status.as_deref().unwrap_or("undefined"))
    ));

    if let Some(image) = data.image.as_deref().filter(|i| !i.is_empty()) {
        html.push_str("<h4>Image Received:</h4>");
        html.push_str(&format!(
            r#"<img src="data:image/jpeg;base64,{}" class="image-preview" alt="Received image">"#,
            escape_html(image)
        ));
    }
    html
}

/// Error panel with a heading and a message
pub fn error_html(heading: &str, message: &str) -> String {
    format!("<h3>{}</h3><p>{}</p>", heading, escape_html(message))
}

/// Drives uploads against one API base URL
pub struct Harness {
    api_url: String,
    http: Arc<dyn HttpClient>,
    display: Arc<dyn ResultDisplay>,
}

impl Harness {
    pub fn new(
        api_url: impl Into<String>,
        http: Arc<dyn HttpClient>,
        display: Arc<dyn ResultDisplay>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            api_url,
            http,
            display,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn upload_url(&self) -> String {
        format!("{}/upload-image", self.api_url)
    }

    async fn post(&self, blob: &ImageBlob) -> Result<UploadResponse> {
        let url = self.upload_url();
        let part = FilePart {
            field: FILE_FIELD.to_string(),
            file_name: UPLOAD_FILE_NAME.to_string(),
            media_type: blob.media_type.clone(),
            bytes: blob.bytes.clone(),
        };

        let response = self.http.post_multipart(&url, part).await?;
        if !response.is_success() {
            return Err(HarnessError::Status(response.status));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Upload `blob` and show the outcome
    pub async fn upload_image(&self, blob: &ImageBlob) -> Result<UploadResponse> {
        self.display.show(&ResultPanel::info("Uploading image..."));

        match self.post(blob).await {
            Ok(data) => {
                tracing::info!(
                    "Upload succeeded: pressure={:?}, status={:?}",
                    data.pressure,
                    data.status
                );
                self.display.show(&ResultPanel::success(success_html(&data)));
                Ok(data)
            }
            Err(e) => {
                tracing::warn!("Upload to {} failed: {}", self.api_url, e);
                self.display
                    .show(&ResultPanel::error(error_html("Upload Failed", &e.to_string())));
                Err(e)
            }
        }
    }

    /// Synthesize a test card and upload it
    pub async fn test_with_dummy_image(&self) -> Result<UploadResponse> {
        match create_dummy_image() {
            Ok(blob) => self.upload_image(&blob).await,
            Err(e) => {
                tracing::warn!("Failed to create dummy image: {}", e);
                self.display.show(&ResultPanel::error(error_html(
                    "Error Creating Dummy Image",
                    &e.to_string(),
                )));
                Err(e)
            }
        }
    }

    /// Upload the first selected file. `Ok(None)` when nothing was selected.
    pub async fn test_with_real_image(
        &self,
        files: &[SelectedFile],
    ) -> Result<Option<UploadResponse>> {
        let Some(file) = files.first() else {
            tracing::debug!("No file selected");
            return Ok(None);
        };

        if !file.is_image() {
            let err = HarnessError::InvalidFile;
            tracing::warn!("Rejected {} ({})", file.name, file.media_type);
            self.display
                .show(&ResultPanel::error(error_html("Error", &err.to_string())));
            return Err(err);
        }

        let blob = ImageBlob {
            media_type: file.media_type.clone(),
            file_name: UPLOAD_FILE_NAME.to_string(),
            bytes: file.bytes.clone(),
        };
        self.upload_image(&blob).await.map(Some)
    }

    /// Select the file at `path` and upload it. An unreadable file is shown
    /// as an error panel.
    pub async fn test_with_path(
        &self,
        path: &Path,
        media_type: Option<String>,
    ) -> Result<Option<UploadResponse>> {
        match SelectedFile::from_path(path, media_type).await {
            Ok(file) => self.test_with_real_image(&[file]).await,
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                self.display
                    .show(&ResultPanel::error(error_html("Error", &e.to_string())));
                Err(e)
            }
        }
    }
}
