use actix_web::web::Bytes;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const FORWARD_PATH: &str = "/forward";
pub const HISTORY_PATH: &str = "/history";
const UPLOAD_MIME: &str = "application/dicom";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Could not connect to backend at {url}")]
    Connect { url: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("{status} - {body}")]
    Server { status: u16, body: String },
    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
    #[error("Request failed: {0}")]
    Request(String),
}

impl BackendError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            BackendError::Connect {
                url: url.to_string(),
            }
        } else {
            BackendError::Request(err.to_string())
        }
    }

    /// Connection-level failure: the backend was never reached or never answered.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            BackendError::Connect { .. } | BackendError::Timeout { .. }
        )
    }
}

/// HTTP client for the classification backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    forward_url: String,
    history_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            forward_url: format!("{}{}", base_url, FORWARD_PATH),
            history_url: format!("{}{}", base_url, HISTORY_PATH),
        })
    }

    pub fn forward_url(&self) -> &str {
        &self.forward_url
    }

    pub fn history_url(&self) -> &str {
        &self.history_url
    }

    /// Sends the file bytes as multipart field `file`.
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<T, BackendError> {
        let url = &self.forward_url;
        let length = bytes.len() as u64;
        let part = Part::stream_with_length(bytes, length)
            .file_name(file_name.to_string())
            .mime_str(UPLOAD_MIME)
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(url, e))?;

        Self::read_json(url, response).await
    }

    pub async fn get_history<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        let url = &self.history_url;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(url, e))?;

        Self::read_json(url, response).await
    }

    async fn read_json<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(url, e))?;

        if !status.is_success() {
            return Err(BackendError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
