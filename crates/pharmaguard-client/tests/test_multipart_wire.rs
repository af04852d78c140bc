//! Wire-level tests against an in-process analysis service.
//!
//! The axum server records every multipart field it receives so the tests
//! can check the exact shape the HTTP client puts on the socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use pharmaguard_client::{
    AnalysisDispatcher, DrugSelection, GenomicFile, HttpAnalysisClient, JsonFileHistory,
    HistoryRepository, RunOutcome,
};
use pharmaguard_common::{DrugCode, PharmaGuardError, GENERIC_FAILURE_MESSAGE};
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
struct CapturedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

type Captured = Arc<Mutex<Vec<CapturedField>>>;

async fn capture(State(captured): State<Captured>, mut multipart: Multipart) -> impl IntoResponse {
    let mut drugs = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        if name == "drugs" {
            drugs.push(String::from_utf8(data.clone()).unwrap());
        }
        captured.lock().unwrap().push(CapturedField { name, file_name, content_type, data });
    }

    let body: Vec<_> = drugs
        .iter()
        .map(|d| json!({"drug": d, "risk_assessment": {"risk_label": "Normal Metabolizer"}}))
        .collect();
    Json(body)
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn html() -> impl IntoResponse {
    "<html>maintenance</html>"
}

async fn spawn_service(captured: Captured) -> String {
    let app = Router::new()
        .route("/full-analysis", post(capture))
        .route("/fail", post(server_error))
        .route("/html", post(html))
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn dispatcher_for(url: &str) -> AnalysisDispatcher {
    let client = HttpAnalysisClient::new(Some(url), Some(Duration::from_secs(10))).unwrap();
    AnalysisDispatcher::new(Arc::new(client))
}

fn patient_file() -> GenomicFile {
    GenomicFile::new("patient_001.vcf", b"##fileformat=VCFv4.2\n#CHROM\tPOS\n".to_vec())
}

#[tokio::test]
async fn test_repeated_drugs_fields_in_selection_order() {
    let captured = Captured::default();
    let base = spawn_service(captured.clone()).await;
    let dispatcher = dispatcher_for(&format!("{base}/full-analysis"));

    let drugs: DrugSelection = [DrugCode::Warfarin, DrugCode::Codeine, DrugCode::Fluorouracil]
        .into_iter()
        .collect();
    let file = patient_file();
    let outcome = dispatcher.run(Some(&file), &drugs).await.unwrap();

    let fields = captured.lock().unwrap().clone();
    let files: Vec<_> = fields.iter().filter(|f| f.name == "file").collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name.as_deref(), Some("patient_001.vcf"));
    assert_eq!(files[0].content_type.as_deref(), Some("text/x-vcf"));
    assert_eq!(files[0].data, file.content());

    let sent: Vec<_> = fields
        .iter()
        .filter(|f| f.name == "drugs")
        .map(|f| String::from_utf8(f.data.clone()).unwrap())
        .collect();
    assert_eq!(sent, vec!["WARFARIN", "CODEINE", "FLUOROURACIL"]);

    let RunOutcome::Completed(result) = outcome else { panic!("expected completion") };
    assert_eq!(result.drugs(), vec!["WARFARIN", "CODEINE", "FLUOROURACIL"]);
}

#[tokio::test]
async fn test_non_success_status_is_request_error() {
    let base = spawn_service(Captured::default()).await;
    let dispatcher = dispatcher_for(&format!("{base}/fail"));
    let drugs: DrugSelection = [DrugCode::Codeine].into_iter().collect();

    let err = dispatcher.run(Some(&patient_file()), &drugs).await.unwrap_err();
    assert!(matches!(err, PharmaGuardError::Request { status: 500 }));
    assert_eq!(dispatcher.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(!dispatcher.is_busy());
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let base = spawn_service(Captured::default()).await;
    let dispatcher = dispatcher_for(&format!("{base}/html"));
    let drugs: DrugSelection = [DrugCode::Codeine].into_iter().collect();

    let err = dispatcher.run(Some(&patient_file()), &drugs).await.unwrap_err();
    assert!(matches!(err, PharmaGuardError::Parse(_)));
    assert!(dispatcher.result().is_none());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dispatcher = dispatcher_for(&format!("http://{addr}/full-analysis"));
    let drugs: DrugSelection = [DrugCode::Codeine].into_iter().collect();

    let err = dispatcher.run(Some(&patient_file()), &drugs).await.unwrap_err();
    assert!(matches!(err, PharmaGuardError::Transport(_)));
    assert_eq!(dispatcher.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(!dispatcher.is_busy());
}

#[tokio::test]
async fn test_success_lands_in_json_history() {
    let base = spawn_service(Captured::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(JsonFileHistory::new(dir.path().join("history.json")));
    let client = HttpAnalysisClient::new(Some(&format!("{base}/full-analysis")), None).unwrap();
    let dispatcher = AnalysisDispatcher::new(Arc::new(client))
        .with_history(history.clone(), Some("user_7".to_string()));

    let drugs: DrugSelection = [DrugCode::Simvastatin].into_iter().collect();
    dispatcher.run(Some(&patient_file()), &drugs).await.unwrap();

    let records = history.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "patient_001.vcf");
    assert_eq!(records[0].result.drugs(), vec!["SIMVASTATIN"]);
}
