//! Upload error types
//!
//! Every way an upload can be refused before it reaches the scanner. The
//! `Display` text is what the client sees in the JSON `error` field.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// Request was not multipart, or carried no file part
    #[error("No file provided")]
    NoFile,

    /// A file under a field other than the upload field, or a second file
    #[error("Upload error: Unexpected field")]
    UnexpectedField,

    /// Neither the content type nor the file name says MP3
    #[error("Invalid file type. Upload MP3 files only.")]
    InvalidType,

    /// File part exceeds the configured limit
    #[error("File too large. Max is {limit_mb}MB")]
    TooLarge { limit_mb: usize },

    /// Broken multipart framing
    #[error("Upload error: {0}")]
    Malformed(String),

    /// Reading the request body failed
    #[error("Upload error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// HTTP status to answer with
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::TooLarge { .. } => 413,
            _ => 400,
        }
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
