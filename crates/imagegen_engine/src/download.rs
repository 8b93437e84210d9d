use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use engine_logging::engine_info;
use futures_util::StreamExt;

use crate::{create_unique, PersistError, ServiceSettings};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid image reference: {0}")]
    InvalidReference(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("image too large (max {max_bytes}, actual {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error("download timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("could not save image: {0}")]
    Persist(#[from] PersistError),
}

/// Saves generated images to a local directory.
///
/// Handles both remote URLs and inline `data:` references, which the
/// generation service may return instead of a hosted file.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: reqwest::Client,
    download_dir: PathBuf,
    max_bytes: u64,
    file_prefix: String,
}

impl ImageDownloader {
    pub fn new(settings: &ServiceSettings, download_dir: PathBuf) -> Result<Self, DownloadError> {
        let client = settings
            .build_client()
            .map_err(|err| DownloadError::Network(err.to_string()))?;
        Ok(Self {
            client,
            download_dir,
            max_bytes: settings.max_download_bytes,
            file_prefix: "image".to_string(),
        })
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Fetches `image_ref` and writes it as `<prefix>-<unix-millis>.<ext>`,
    /// with a numeric suffix if that name is already taken.
    pub async fn download(&self, image_ref: &str) -> Result<PathBuf, DownloadError> {
        let (bytes, extension) = if image_ref.starts_with("data:") {
            decode_data_url(image_ref, self.max_bytes)?
        } else {
            (self.fetch(image_ref).await?, "png")
        };

        let stem = format!(
            "{}-{}",
            self.file_prefix,
            chrono::Utc::now().timestamp_millis()
        );
        let path = create_unique(&self.download_dir, &stem, extension, &bytes)?;
        engine_info!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }

    async fn fetch(&self, image_ref: &str) -> Result<Vec<u8>, DownloadError> {
        let url = reqwest::Url::parse(image_ref)
            .map_err(|err| DownloadError::InvalidReference(err.to_string()))?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(DownloadError::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: content_len,
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(DownloadError::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: next_len,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn decode_data_url(
    data_url: &str,
    max_bytes: u64,
) -> Result<(Vec<u8>, &'static str), DownloadError> {
    let (header, payload) = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .ok_or_else(|| DownloadError::InvalidReference("unsupported data url".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| DownloadError::InvalidReference(err.to_string()))?;
    if bytes.len() as u64 > max_bytes {
        return Err(DownloadError::TooLarge {
            max_bytes,
            actual: bytes.len() as u64,
        });
    }
    Ok((bytes, extension_for(header)))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::Timeout;
    }
    DownloadError::Network(err.to_string())
}
