use serde::Deserialize;
use serde_json::Value;
use shared::{ClassificationState, ClassificationView, NOT_AVAILABLE};

use crate::backend_client::{BackendClient, BackendError};
use crate::upload::UploadedImage;

pub const DEFAULT_PROBABILITY: f64 = 0.0;

/// Body of a successful `/forward` reply. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForwardResponse {
    pub prediction: Option<Value>,
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Negative,
    Positive,
    Unavailable,
    /// Anything other than 0 or 1, shown as the backend sent it.
    Other(String),
}

impl Prediction {
    pub fn from_json(value: Option<&Value>) -> Self {
        let value = match value {
            None | Some(Value::Null) => return Prediction::Unavailable,
            Some(value) => value,
        };

        let numeric = match value {
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::Number(number) => number.as_f64(),
            _ => None,
        };

        match numeric {
            Some(n) if n == 0.0 => Prediction::Negative,
            Some(n) if n == 1.0 => Prediction::Positive,
            _ => match value {
                Value::String(text) => Prediction::Other(text.clone()),
                other => Prediction::Other(other.to_string()),
            },
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Prediction::Negative => "Negative",
            Prediction::Positive => "Positive",
            Prediction::Unavailable => NOT_AVAILABLE,
            Prediction::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub prediction: Prediction,
    pub probability: f64,
}

impl From<ForwardResponse> for ClassificationResult {
    fn from(response: ForwardResponse) -> Self {
        Self {
            prediction: Prediction::from_json(response.prediction.as_ref()),
            probability: response.probability.unwrap_or(DEFAULT_PROBABILITY),
        }
    }
}

impl ClassificationResult {
    pub fn to_view(&self) -> ClassificationView {
        ClassificationView {
            prediction: self.prediction.label().to_string(),
            probability: self.probability,
            probability_text: format_probability(self.probability),
        }
    }
}

/// `0.8734` -> `"87.34%"`
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Sends the untouched upload to the backend's forward endpoint.
pub async fn classify(
    client: &BackendClient,
    upload: &UploadedImage,
) -> Result<ClassificationResult, BackendError> {
    let response: ForwardResponse = client
        .post_file(&upload.file_name, upload.bytes())
        .await?;
    Ok(response.into())
}

pub fn failure_message(err: &BackendError) -> String {
    match err {
        BackendError::Server { status, body } => {
            format!("Error from server: {} - {}", status, body)
        }
        other => other.to_string(),
    }
}

pub fn into_state(result: Result<ClassificationResult, BackendError>) -> ClassificationState {
    match result {
        Ok(result) => ClassificationState::Ready(result.to_view()),
        Err(err) => {
            if err.is_network() {
                log::warn!("Classification backend unreachable: {}", err);
            } else {
                log::error!("Classification request failed: {}", err);
            }
            ClassificationState::Failed {
                message: failure_message(&err),
            }
        }
    }
}
