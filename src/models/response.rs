use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadedFileDto {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponseDto {
    pub message: String,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MultiUploadResponseDto {
    pub message: String,
    pub files: Vec<UploadedFileDto>,
}
