use actix_multipart::Multipart;
use actix_web::web::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const FILE_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    MissingFile,
    #[error("Unsupported file type: {0}. Upload a .dcm or .dicom file")]
    UnsupportedType(String),
    #[error("File is larger than the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Failed to read upload: {0}")]
    Payload(String),
}

#[derive(Clone, Copy, Debug)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

/// One upload, held fully in memory. The normalizer borrows the slice and the
/// classification client takes a clone of the same buffer.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub upload_id: Uuid,
    pub file_name: String,
    bytes: Bytes,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            upload_id: Uuid::new_v4(),
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Reads the `file` field out of a multipart body. Other fields are drained and ignored.
pub async fn read_upload(
    mut payload: Multipart,
    policy: UploadPolicy,
) -> Result<UploadedImage, UploadError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Payload(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| UploadError::Payload(e.to_string()))?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned)
            .unwrap_or_default();

        if !shared::is_accepted_file_name(&file_name) {
            return Err(UploadError::UnsupportedType(file_name));
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| UploadError::Payload(e.to_string()))?;
            if buffer.len() + data.len() > policy.max_bytes {
                return Err(UploadError::TooLarge {
                    limit: policy.max_bytes,
                });
            }
            buffer.extend_from_slice(&data);
        }

        if buffer.is_empty() {
            return Err(UploadError::Empty);
        }

        return Ok(UploadedImage::new(file_name, buffer.freeze()));
    }

    Err(UploadError::MissingFile)
}
