use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported image type")]
    UnsupportedType(String),

    #[error("dataBase64 is not valid base64")]
    InvalidData,

    #[error("Uploaded file is empty")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some(".png"),
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/webp" => Some(".webp"),
        "image/svg+xml" => Some(".svg"),
        _ => None,
    }
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL
pub fn decode_base64(data: &str) -> Result<Vec<u8>, UploadError> {
    let raw = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| UploadError::InvalidData)?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(bytes)
}

/// Files written under the uploads directory and served at `/uploads`
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Stores an image under a generated name and returns its public URL
    pub async fn save_image(&self, mime_type: &str, data_base64: &str) -> Result<String, UploadError> {
        let ext = extension_for(mime_type).ok_or_else(|| UploadError::UnsupportedType(mime_type.to_string()))?;
        let bytes = decode_base64(data_base64)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}-{}{}", Utc::now().timestamp_millis(), Uuid::new_v4(), ext);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!("Stored upload {}", file_name);
        Ok(format!("{}/uploads/{}", self.public_base_url, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_mime_types() {
        assert_eq!(extension_for("image/png"), Some(".png"));
        assert_eq!(extension_for("image/jpg"), Some(".jpg"));
        assert_eq!(extension_for("IMAGE/JPEG"), Some(".jpg"));
        assert_eq!(extension_for("image/svg+xml"), Some(".svg"));
        assert_eq!(extension_for("image/gif"), None);
    }

    #[test]
    fn decodes_plain_and_data_url_base64() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_base64("data:image/png;base64,aGVsbG8=").unwrap(), b"hello");
        assert!(matches!(decode_base64("not base64!"), Err(UploadError::InvalidData)));
        assert!(matches!(decode_base64(""), Err(UploadError::Empty)));
    }

    #[tokio::test]
    async fn writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), "http://localhost:4000/");
        let url = store.save_image("image/png", "aGVsbG8=").await.unwrap();
        assert!(url.starts_with("http://localhost:4000/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(written, b"hello");
    }
}
