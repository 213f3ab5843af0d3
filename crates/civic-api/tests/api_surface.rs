//! Router-level tests for the HTTP surface, driven through oneshot
//! requests with a stubbed vision analyzer.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use civic_api::{create_app, AppState};
use civic_core::{Complaint, ComplaintStatus, Detection, SeverityLevel};
use civic_vision::{AnalysisOutcome, ImageAnalyzer, VisionError};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "civic-test-boundary";

struct StubAnalyzer(AnalysisOutcome);

#[async_trait]
impl ImageAnalyzer for StubAnalyzer {
    async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<AnalysisOutcome, VisionError> {
        Ok(self.0.clone())
    }
}

struct FailingAnalyzer;

#[async_trait]
impl ImageAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<AnalysisOutcome, VisionError> {
        Err(VisionError::Upstream(
            "gemini request timed out: simulated".to_string(),
        ))
    }
}

fn pothole_outcome() -> AnalysisOutcome {
    AnalysisOutcome {
        civic_issues: vec!["Pothole".to_string()],
        detections: vec![Detection::new("Pothole", 0.92)],
        explanation: Some("cracked asphalt across the lane".to_string()),
    }
}

fn state_with(analyzer: Option<Arc<dyn ImageAnalyzer>>) -> AppState {
    AppState::new(analyzer)
}

fn multipart_request(location: Option<&str>, file: Option<(&[u8], &str)>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    if let Some(location) = location {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"location\"\r\n\r\n",
        );
        body.extend_from_slice(location.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((bytes, content_type)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn seed(state: &AppState, issues: &[&str], score: u8, status: ComplaintStatus) -> String {
    let mut complaint = Complaint::from_analysis(
        "MG Road, Pune",
        issues.iter().map(|s| s.to_string()).collect(),
        issues.iter().map(|s| Detection::new(*s, 0.9)).collect(),
        score,
        SeverityLevel::from_score(score),
        vec!["Public Works Department".to_string()],
    );
    complaint.status = status;
    let id = complaint.complaint_id.clone();
    state.store.insert(complaint).unwrap();
    id
}

#[tokio::test]
async fn test_health_reports_key_state() {
    let app = create_app(state_with(Some(Arc::new(StubAnalyzer(pothole_outcome())))));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api_key_configured"], true);

    let app = create_app(state_with(None));
    let body = json_body(app.oneshot(get("/health")).await.unwrap()).await;
    assert_eq!(body["api_key_configured"], false);
}

#[tokio::test]
async fn test_analyze_happy_path() {
    let state = state_with(Some(Arc::new(StubAnalyzer(pothole_outcome()))));
    let app = create_app(state.clone());

    let response = app
        .oneshot(multipart_request(
            Some("MG Road, Pune"),
            Some((b"\xFF\xD8fakejpeg", "image/jpeg")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["issue_detected"], true);
    assert_eq!(body["civic_issues"], serde_json::json!(["Pothole"]));
    assert_eq!(body["location"], "MG Road, Pune");
    assert_eq!(body["status"], "Pending");
    let level = body["severity_level"].as_str().unwrap();
    assert!(level == "Medium" || level == "High");
    assert!(body["assigned_authorities"]
        .as_array()
        .unwrap()
        .contains(&Value::from("Public Works Department")));
    let id = body["complaint_id"].as_str().unwrap();
    assert!(id.starts_with("CIV-"));

    // The record is visible through the admin surface
    let fetched = state.store.get(id).unwrap();
    assert_eq!(fetched.location, "MG Road, Pune");
}

#[tokio::test]
async fn test_analyze_upstream_failure_still_returns_complaint() {
    let state = state_with(Some(Arc::new(FailingAnalyzer)));
    let app = create_app(state.clone());

    let response = app
        .oneshot(multipart_request(
            Some("MG Road"),
            Some((b"\xFF\xD8fakejpeg", "image/jpeg")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["issue_detected"], false);
    assert_eq!(body["severity_score"], 1);
    assert_eq!(body["severity_level"], "Low");
    assert_eq!(
        body["assigned_authorities"],
        serde_json::json!(["Municipal Corporation"])
    );
    assert!(!body["error"].as_str().unwrap().is_empty());
    // Degraded complaints are still stored
    assert_eq!(state.store.len(), 1);
}

#[tokio::test]
async fn test_analyze_missing_location_rejected() {
    let app = create_app(state_with(Some(Arc::new(StubAnalyzer(pothole_outcome())))));
    let response = app
        .oneshot(multipart_request(None, Some((b"img", "image/png"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn test_analyze_non_image_rejected() {
    let app = create_app(state_with(Some(Arc::new(StubAnalyzer(pothole_outcome())))));
    let response = app
        .oneshot(multipart_request(
            Some("MG Road"),
            Some((b"not an image", "text/plain")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_analyze_without_api_key_is_503() {
    let state = state_with(None);
    let app = create_app(state.clone());
    let response = app
        .oneshot(multipart_request(
            Some("MG Road"),
            Some((b"img", "image/jpeg")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    // Nothing half-written
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_admin_list_filters_and_limit() {
    let state = state_with(None);
    for i in 0..12 {
        let status = if i % 2 == 0 {
            ComplaintStatus::Resolved
        } else {
            ComplaintStatus::Pending
        };
        let score = if i < 8 { 9 } else { 3 };
        seed(&state, &["Pothole"], score, status);
    }

    let app = create_app(state);
    let response = app
        .oneshot(get("/admin/complaints?status=Resolved&severity=High&limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let listed = body.as_array().unwrap();
    assert!(listed.len() <= 5);
    assert!(!listed.is_empty());
    for complaint in listed {
        assert_eq!(complaint["status"], "Resolved");
        assert_eq!(complaint["severity_level"], "High");
    }
}

#[tokio::test]
async fn test_admin_list_rejects_unknown_status() {
    let app = create_app(state_with(None));
    let response = app
        .oneshot(get("/admin/complaints?status=Closed"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_get_unknown_id_is_404() {
    let app = create_app(state_with(None));
    let response = app.oneshot(get("/admin/complaints/CIV-404")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_update_status_flow() {
    let state = state_with(None);
    let id = seed(&state, &["Pothole"], 6, ComplaintStatus::Pending);
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/admin/complaints/{id}/status?status=In%20Progress"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "In Progress");

    // Unknown status is rejected and leaves the record unchanged
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/admin/complaints/{id}/status?status=Closed"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.store.get(&id).unwrap().status, ComplaintStatus::InProgress);

    // Unknown ID is a 404
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/admin/complaints/CIV-404/status?status=Resolved")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_delete_flow() {
    let state = state_with(None);
    let id = seed(&state, &["Pothole"], 6, ComplaintStatus::Pending);
    let app = create_app(state.clone());

    let delete = |id: String| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/admin/complaints/{id}"))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete(id.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["deleted"], id.as_str());

    let response = app
        .clone()
        .oneshot(get(&format!("/admin/complaints/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(delete(id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let listed = json_body(app.oneshot(get("/admin/complaints")).await.unwrap()).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_statistics() {
    let state = state_with(None);
    seed(&state, &["Pothole"], 6, ComplaintStatus::Resolved);
    seed(&state, &["Pothole", "Open Drain"], 9, ComplaintStatus::Pending);
    let app = create_app(state);

    let body = json_body(app.oneshot(get("/admin/statistics")).await.unwrap()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["by_status"]["Resolved"], 1);
    assert_eq!(body["by_issue_type"]["Pothole"], 2);
    assert_eq!(body["resolution_rate"], 0.5);
}

#[tokio::test]
async fn test_admin_export_keeps_insertion_order() {
    let state = state_with(None);
    let first = seed(&state, &["Pothole"], 6, ComplaintStatus::Pending);
    let second = seed(&state, &["Open Drain"], 8, ComplaintStatus::Pending);
    let app = create_app(state);

    let body = json_body(app.oneshot(get("/admin/export")).await.unwrap()).await;
    let exported = body.as_array().unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0]["complaint_id"], first.as_str());
    assert_eq!(exported[1]["complaint_id"], second.as_str());
}

#[tokio::test]
async fn test_statistics_empty_store_has_zero_rate() {
    let app = create_app(state_with(None));
    let body = json_body(app.oneshot(get("/admin/statistics")).await.unwrap()).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["resolution_rate"], 0.0);
}
