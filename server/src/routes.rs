use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use log::{info, warn};
use shared::{ErrorResponse, PreviewState, UploadOutcome};
use std::path::PathBuf;

use crate::backend_client::BackendClient;
use crate::upload::{UploadError, UploadPolicy, UploadedImage, read_upload};
use crate::{classification, history, imaging};

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/classify").route(web::post().to(handle_classify)))
        .service(web::resource("/api/history").route(web::get().to(handle_history)));
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

fn rejection(err: &UploadError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        UploadError::TooLarge { .. } => HttpResponse::PayloadTooLarge().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

async fn build_preview(upload: UploadedImage) -> PreviewState {
    let upload_id = upload.upload_id;
    let rendered = web::block(move || {
        let image = imaging::normalize(upload.as_slice())?;
        imaging::render_preview(&image)
    })
    .await;

    match rendered {
        Ok(Ok(preview)) => PreviewState::Ready(preview),
        Ok(Err(e)) => {
            warn!("Upload {} has no preview: {}", upload_id, e);
            PreviewState::Failed {
                message: e.to_string(),
            }
        }
        Err(e) => {
            warn!("Preview task for upload {} did not finish: {}", upload_id, e);
            PreviewState::Failed {
                message: "Preview could not be generated".to_string(),
            }
        }
    }
}

async fn handle_classify(
    backend: web::Data<BackendClient>,
    policy: web::Data<UploadPolicy>,
    payload: Multipart,
) -> HttpResponse {
    let upload = match read_upload(payload, **policy).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return rejection(&e);
        }
    };

    let sha256 = upload.sha256();
    info!(
        "Upload {}: {} ({} bytes, sha256 {})",
        upload.upload_id,
        upload.file_name,
        upload.len(),
        sha256
    );

    // Preview and classification are independent and run side by side.
    let (preview, classification) = tokio::join!(
        build_preview(upload.clone()),
        classification::classify(&backend, &upload)
    );

    HttpResponse::Ok().json(UploadOutcome {
        upload_id: upload.upload_id.to_string(),
        file_name: upload.file_name.clone(),
        size_bytes: upload.len(),
        sha256,
        preview,
        classification: classification::into_state(classification),
    })
}

async fn handle_history(backend: web::Data<BackendClient>) -> HttpResponse {
    HttpResponse::Ok().json(history::load_history_view(&backend).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::dicom_reader::fixtures::monochrome16;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use shared::{ClassificationState, HistoryView};
    use std::time::Duration;

    const BOUNDARY: &str = "----dashboard-test-boundary";

    fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(field: &str, file_name: &str, bytes: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/classify")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(field, file_name, bytes))
    }

    fn backend(url: &str) -> web::Data<BackendClient> {
        web::Data::new(BackendClient::new(url, Duration::from_secs(5)).unwrap())
    }

    fn policy(max_bytes: usize) -> web::Data<UploadPolicy> {
        web::Data::new(UploadPolicy { max_bytes })
    }

    #[actix_web::test]
    async fn classify_returns_preview_and_verdict() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/forward")
            .with_status(200)
            .with_body(r#"{"prediction": 0, "probability": 0.125}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(backend(&server.url()))
                .app_data(policy(1024 * 1024))
                .configure(configure_api),
        )
        .await;

        let raw = monochrome16(2, 2, &[0, 10, 20, 30]);
        let outcome: UploadOutcome = test::call_and_read_body_json(
            &app,
            upload_request("file", "chest.dcm", &raw).to_request(),
        )
        .await;

        assert_eq!(outcome.file_name, "chest.dcm");
        assert_eq!(outcome.size_bytes, raw.len());
        match outcome.preview {
            PreviewState::Ready(preview) => {
                assert_eq!((preview.width, preview.height), (2, 2));
                assert!(preview.data_url.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected preview, got {other:?}"),
        }
        match outcome.classification {
            ClassificationState::Ready(view) => {
                assert_eq!(view.prediction, "Negative");
                assert_eq!(view.probability_text, "12.50%");
            }
            other => panic!("expected verdict, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn undecodable_file_is_still_classified() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/forward")
            .match_body(mockito::Matcher::Regex("not-really-dicom".into()))
            .with_status(200)
            .with_body(r#"{"prediction": 1, "probability": 0.75}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(backend(&server.url()))
                .app_data(policy(1024))
                .configure(configure_api),
        )
        .await;

        let outcome: UploadOutcome = test::call_and_read_body_json(
            &app,
            upload_request("file", "scan.DICOM", b"not-really-dicom").to_request(),
        )
        .await;

        assert!(matches!(outcome.preview, PreviewState::Failed { .. }));
        assert!(matches!(
            outcome.classification,
            ClassificationState::Ready(ref view) if view.prediction == "Positive"
        ));
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn backend_failure_is_inline_and_history_still_works() {
        let mut server = mockito::Server::new_async().await;
        let _forward = server
            .mock("POST", "/forward")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;
        let _history = server
            .mock("GET", "/history")
            .with_status(200)
            .with_body(r#"{"requests": []}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(backend(&server.url()))
                .app_data(policy(1024))
                .configure(configure_api),
        )
        .await;

        let resp = test::call_service(
            &app,
            upload_request("file", "chest.dcm", b"bytes").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let outcome: UploadOutcome = test::read_body_json(resp).await;
        match outcome.classification {
            ClassificationState::Failed { message } => {
                assert!(message.contains("500"));
                assert!(message.contains("internal error"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        let view: HistoryView = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/history").to_request(),
        )
        .await;
        assert_eq!(view, HistoryView::Empty);
    }

    #[actix_web::test]
    async fn unreachable_backend_is_reported_inline() {
        let app = test::init_service(
            App::new()
                .app_data(backend("http://127.0.0.1:1"))
                .app_data(policy(1024))
                .configure(configure_api),
        )
        .await;

        let view: HistoryView = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/history").to_request(),
        )
        .await;
        assert_eq!(
            view,
            HistoryView::Failed {
                message: "Could not connect to backend at http://127.0.0.1:1/history".into()
            }
        );
    }

    #[actix_web::test]
    async fn rejects_wrong_extension_and_missing_field() {
        let app = test::init_service(
            App::new()
                .app_data(backend("http://127.0.0.1:1"))
                .app_data(policy(1024))
                .configure(configure_api),
        )
        .await;

        let resp = test::call_service(
            &app,
            upload_request("file", "chest.png", b"png").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.contains("chest.png"));

        let resp = test::call_service(
            &app,
            upload_request("image", "chest.dcm", b"dcm").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "No file was uploaded");
    }

    #[actix_web::test]
    async fn rejects_oversized_upload() {
        let app = test::init_service(
            App::new()
                .app_data(backend("http://127.0.0.1:1"))
                .app_data(policy(4))
                .configure(configure_api),
        )
        .await;

        let resp = test::call_service(
            &app,
            upload_request("file", "chest.dcm", b"0123456789").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
