use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{ErrorResponse, HistoryView, UploadOutcome};

const CLASSIFY_URL: &str = "/api/classify";
const HISTORY_URL: &str = "/api/history";

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e));
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    // Rejected uploads come back as {"error": "..."}
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(rejection) => Err(rejection.error),
        Err(_) => Err(format!("Server error: {} - {}", status, body)),
    }
}

pub async fn upload_file(file: &GlooFile) -> Result<UploadOutcome, String> {
    let form_data =
        web_sys::FormData::new().map_err(|_| "Failed to build upload form".to_string())?;
    form_data
        .append_with_blob_and_filename("file", file.as_ref(), &file.name())
        .map_err(|_| "Failed to attach file to upload form".to_string())?;

    let request = Request::post(CLASSIFY_URL)
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = request
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read_json(response).await
}

pub async fn fetch_history() -> Result<HistoryView, String> {
    let response = Request::get(HISTORY_URL)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read_json(response).await
}
