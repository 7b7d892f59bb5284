use std::path::{Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use crate::{Error, Result};

/// Upper bound on files accepted by a single multi-file upload.
pub const MAX_FILES: usize = 5;

#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_file_size: usize,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>, max_file_size: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_file_size,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Writes one image under a fresh name and returns that name.
    pub async fn store(
        &self,
        content_type: Option<&str>,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String> {
        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(Error::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_file_size {
            return Err(Error::BadRequest(format!(
                "File too large, the limit is {} bytes",
                self.max_file_size
            )));
        }

        let filename = format!(
            "{}.{}",
            Uuid::now_v7(),
            extension_for(content_type, original_name)
        );
        tokio::fs::write(self.upload_dir.join(&filename), bytes).await?;

        tracing::info!(%filename, size = bytes.len(), "Image stored");
        Ok(filename)
    }

    /// Removes files stored earlier in a request that ended up failing.
    pub async fn discard(&self, filenames: &[String]) {
        for filename in filenames {
            if let Err(err) = tokio::fs::remove_file(self.upload_dir.join(filename)).await {
                tracing::warn!(%filename, "Failed to remove discarded upload: {:?}", err);
            }
        }
    }
}

fn extension_for(content_type: &str, original_name: Option<&str>) -> String {
    if let Some(ext) = ImageFormat::from_mime_type(content_type)
        .and_then(|format| format.extensions_str().first())
    {
        return ext.to_string();
    }

    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "img".to_string())
}

pub fn public_url(base_url: &str, filename: &str) -> String {
    format!("{}/uploads/{}", base_url.trim_end_matches('/'), filename)
}
