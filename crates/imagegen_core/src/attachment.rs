use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Default upper bound for an inlined source image.
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// A source image inlined as a `data:` reference. It travels inside the
/// generation request body; there is no separate upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    content_type: String,
    data_url: String,
    byte_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("invalid file type {content_type:?}")]
    InvalidFileType { content_type: String },
    #[error("attachment too large ({actual} bytes, max {max_bytes})")]
    TooLarge { max_bytes: usize, actual: usize },
}

impl ImageAttachment {
    pub fn from_bytes(
        content_type: &str,
        bytes: &[u8],
        max_bytes: usize,
    ) -> Result<Self, AttachmentError> {
        let content_type = validate_content_type(content_type)?;
        if bytes.len() > max_bytes {
            return Err(AttachmentError::TooLarge {
                max_bytes,
                actual: bytes.len(),
            });
        }
        let data_url = format!("data:{content_type};base64,{}", STANDARD.encode(bytes));
        Ok(Self {
            content_type,
            data_url,
            byte_len: bytes.len(),
        })
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

fn validate_content_type(content_type: &str) -> Result<String, AttachmentError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    match essence.strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() => Ok(essence),
        _ => Err(AttachmentError::InvalidFileType {
            content_type: content_type.to_owned(),
        }),
    }
}
