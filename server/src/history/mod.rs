pub mod format;
pub mod models;

use shared::HistoryView;

use crate::backend_client::{BackendClient, BackendError};
use format::format_record;
use models::{HistoryRecord, HistoryResponse};

/// Newest first. Stable, so equal timestamps keep the order the backend sent;
/// records without a timestamp end up last.
pub fn sort_by_recency(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
}

/// One full snapshot of the backend's request log, newest first.
pub async fn fetch_history(client: &BackendClient) -> Result<Vec<HistoryRecord>, BackendError> {
    let response: HistoryResponse = client.get_history().await?;
    let mut records = response.requests;
    sort_by_recency(&mut records);
    Ok(records)
}

pub fn reconcile(records: &[HistoryRecord]) -> HistoryView {
    if records.is_empty() {
        return HistoryView::Empty;
    }
    HistoryView::Records {
        records: records.iter().map(format_record).collect(),
    }
}

pub fn failure_message(err: &BackendError) -> String {
    match err {
        BackendError::Server { status, body } => {
            format!("Error fetching history: {} - {}", status, body)
        }
        other => other.to_string(),
    }
}

/// Fetches, sorts and formats. Failures become an inline view state.
pub async fn load_history_view(client: &BackendClient) -> HistoryView {
    match fetch_history(client).await {
        Ok(records) => {
            log::info!("Fetched {} history record(s)", records.len());
            reconcile(&records)
        }
        Err(err) => {
            if err.is_network() {
                log::warn!("History backend unreachable: {}", err);
            } else {
                log::error!("Failed to fetch history: {}", err);
            }
            HistoryView::Failed {
                message: failure_message(&err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Truthiness;
    use std::time::Duration;

    fn stamped(id: &str, timestamp: Option<&str>) -> HistoryRecord {
        HistoryRecord {
            id: Some(id.to_string()),
            timestamp: timestamp.map(str::to_string),
            ..HistoryRecord::default()
        }
    }

    fn ids(records: &[HistoryRecord]) -> Vec<&str> {
        records.iter().filter_map(|r| r.id.as_deref()).collect()
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let mut records = vec![
            stamped("undated", None),
            stamped("old", Some("2023-01-01T00:00:00Z")),
            stamped("blank", Some("")),
            stamped("new", Some("2024-06-01T08:00:00Z")),
            stamped("mid", Some("2024-01-15T12:00:00Z")),
        ];
        sort_by_recency(&mut records);
        assert_eq!(ids(&records), vec!["new", "mid", "old", "undated", "blank"]);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let mut records = vec![
            stamped("first", Some("2024-01-01T00:00:00Z")),
            stamped("no-ts-1", None),
            stamped("second", Some("2024-01-01T00:00:00Z")),
            stamped("no-ts-2", None),
            stamped("third", Some("2024-01-01T00:00:00Z")),
        ];
        sort_by_recency(&mut records);
        assert_eq!(
            ids(&records),
            vec!["first", "second", "third", "no-ts-1", "no-ts-2"]
        );
        assert!(records.windows(2).all(|w| w[0].sort_key() >= w[1].sort_key()));
    }

    #[test]
    fn empty_snapshot_is_the_empty_state() {
        assert_eq!(reconcile(&[]), HistoryView::Empty);
    }

    #[test]
    fn reconcile_formats_every_record() {
        let mut record = stamped("r1", Some("2024-03-05T14:30:00Z"));
        record.result = Truthiness(true);
        match reconcile(&[record]) {
            HistoryView::Records { records } => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].timestamp, "Mar 05, 2024, 02:30 PM");
                assert_eq!(records[0].result, "Positive");
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn loads_sorted_snapshot_from_backend() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/history")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"requests": [
                    {"id": "a", "timestamp": "2024-01-01T10:00:00Z", "img_width": 512, "img_height": 512, "result": false},
                    {"id": "b", "timestamp": "2024-03-05T14:30:00Z", "img_width": 1024, "result": 1},
                    {"id": "c"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let view = load_history_view(&client).await;

        let HistoryView::Records { records } = view else {
            panic!("expected records, got {view:?}");
        };
        let order: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(records[0].image_size, "1024 x N/A");
        assert_eq!(records[0].result, "Positive");
        assert_eq!(records[1].result, "Negative");
        assert_eq!(records[2].timestamp, "N/A");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn odd_dimension_values_keep_the_rest_of_the_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/history")
            .with_status(200)
            .with_body(
                r#"{"requests": [
                    {"id": "odd", "timestamp": "2024-01-01T10:00:00Z", "img_width": "1024", "img_height": 512.0},
                    {"id": "good", "timestamp": "2024-02-01T10:00:00Z", "img_width": 640, "img_height": 480, "result": true}
                ]}"#,
            )
            .create_async()
            .await;

        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let view = load_history_view(&client).await;

        let HistoryView::Records { records } = view else {
            panic!("expected records, got {view:?}");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "good");
        assert_eq!(records[0].image_size, "640 x 480");
        assert_eq!(records[1].id, "odd");
        assert_eq!(records[1].image_size, "1024 x 512.0");
    }

    #[tokio::test]
    async fn empty_list_from_backend_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/history")
            .with_status(200)
            .with_body(r#"{"requests": []}"#)
            .create_async()
            .await;

        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(load_history_view(&client).await, HistoryView::Empty);
    }

    #[tokio::test]
    async fn server_error_is_reported_inline() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/history")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            load_history_view(&client).await,
            HistoryView::Failed {
                message: "Error fetching history: 500 - internal error".into()
            }
        );
    }

    #[tokio::test]
    async fn each_refresh_is_a_fresh_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/history")
            .with_status(200)
            .with_body(r#"{"requests": []}"#)
            .expect(1)
            .create_async()
            .await;

        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(load_history_view(&client).await, HistoryView::Empty);
        first.assert_async().await;
        first.remove_async().await;

        let _second = server
            .mock("GET", "/history")
            .with_status(200)
            .with_body(r#"{"requests": [{"id": "late", "timestamp": "2024-05-05T05:05:05Z"}]}"#)
            .create_async()
            .await;

        let HistoryView::Records { records } = load_history_view(&client).await else {
            panic!("expected records after refresh");
        };
        assert_eq!(records[0].id, "late");
    }
}
