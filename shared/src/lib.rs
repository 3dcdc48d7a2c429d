use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// File extensions accepted by the upload widget and the dashboard server.
/// Both name the same DICOM container format.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["dcm", "dicom"];

/// Display value for anything the backend did not report.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn is_accepted_file_name(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Value for the `accept` attribute of a file input.
pub fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Tab {
    #[strum(serialize = "Classification")]
    Classification,
    #[strum(serialize = "History")]
    History,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PreviewImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub bits_allocated: u16,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PreviewState {
    Ready(PreviewImage),
    Failed { message: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassificationView {
    pub prediction: String,
    pub probability: f64,
    pub probability_text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationState {
    Ready(ClassificationView),
    Failed { message: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadOutcome {
    pub upload_id: String,
    pub file_name: String,
    pub size_bytes: usize,
    pub sha256: String,
    pub preview: PreviewState,
    pub classification: ClassificationState,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DisplayRecord {
    pub id: String,
    pub timestamp: String,
    pub image_size: String,
    pub result: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistoryView {
    Empty,
    Records { records: Vec<DisplayRecord> },
    Failed { message: String },
}
