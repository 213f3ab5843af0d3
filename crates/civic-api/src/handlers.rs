//! API Handlers
use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use civic_core::{Complaint, ComplaintStatus, SeverityLevel};
use civic_store::{ComplaintStatistics, ListQuery};
use civic_triage::{triage, FALLBACK_AUTHORITY};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crate::MAX_UPLOAD_BYTES;

/// Submit a photo and a location for analysis. The response is always
/// a complaint record: an upstream vision failure is recorded in the
/// complaint's `error` field rather than surfaced as a 5xx.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Complaint>, ApiError> {
    let upload = Upload::read(multipart).await?;

    let analyzer = state.analyzer.as_ref().ok_or_else(|| {
        ApiError::Config("GEMINI_API_KEY is not configured; analysis is unavailable".to_string())
    })?;

    let complaint = match analyzer.analyze(&upload.image, &upload.content_type).await {
        Ok(outcome) => {
            let resolved = triage(&outcome.civic_issues, outcome.explanation.as_deref());
            Complaint::from_analysis(
                upload.location,
                outcome.civic_issues,
                outcome.detections,
                resolved.severity_score,
                resolved.severity_level,
                resolved.assigned_authorities,
            )
        }
        Err(err) => {
            tracing::warn!(error = %err, "vision call failed, returning fallback complaint");
            Complaint::from_failure(upload.location, FALLBACK_AUTHORITY, err.to_string())
        }
    };

    state.store.insert(complaint.clone())?;
    tracing::info!(
        complaint_id = %complaint.complaint_id,
        issue_detected = complaint.issue_detected,
        severity = complaint.severity_score,
        "complaint recorded"
    );
    Ok(Json(complaint))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "api_key_configured": state.api_key_configured(),
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_complaints(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<ComplaintStatus>())
        .transpose()?;
    let severity = params
        .severity
        .as_deref()
        .map(|s| {
            SeverityLevel::parse_filter(s).ok_or_else(|| {
                ApiError::Validation(format!(
                    "invalid severity '{s}', expected one of: Low, Medium, High"
                ))
            })
        })
        .transpose()?;

    let query = ListQuery {
        status,
        severity,
        limit: params.limit,
    };
    Ok(Json(state.store.list(&query)))
}

pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Complaint>, ApiError> {
    Ok(Json(state.store.get(&id)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<StatusParams>,
) -> Result<Json<Complaint>, ApiError> {
    let new_status: ComplaintStatus = params.status.parse()?;
    let updated = state.store.update_status(&id, new_status)?;
    tracing::info!(complaint_id = %id, status = %new_status, "status updated");
    Ok(Json(updated))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete(&id)?;
    tracing::info!(complaint_id = %id, "complaint deleted");
    Ok(Json(json!({ "deleted": id })))
}

pub async fn statistics(State(state): State<AppState>) -> Json<ComplaintStatistics> {
    Json(state.store.statistics())
}

pub async fn export(State(state): State<AppState>) -> Json<Vec<Complaint>> {
    Json(state.store.export_all())
}

/// Validated multipart upload: the image bytes, their content type,
/// and the location string.
struct Upload {
    image: Vec<u8>,
    content_type: String,
    location: String,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut image: Option<(Vec<u8>, String)> = None;
        let mut location: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::Validation(format!("malformed multipart body: {err}")))?
        {
            match field.name() {
                Some("file") => {
                    let content_type = field
                        .content_type()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            ApiError::Validation("file field has no content type".to_string())
                        })?;
                    let data = field.bytes().await.map_err(|err| {
                        ApiError::Validation(format!("failed to read file field: {err}"))
                    })?;
                    image = Some((data.to_vec(), content_type));
                }
                Some("location") => {
                    let text = field.text().await.map_err(|err| {
                        ApiError::Validation(format!("failed to read location field: {err}"))
                    })?;
                    location = Some(text);
                }
                _ => {}
            }
        }

        let (image, content_type) =
            image.ok_or_else(|| ApiError::Validation("missing 'file' field".to_string()))?;
        let location = location
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("missing 'location' field".to_string()))?;

        if !content_type.starts_with("image/") {
            return Err(ApiError::Validation(format!(
                "file must be an image, got '{content_type}'"
            )));
        }
        if image.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation(
                "image file too large, maximum size is 10MB".to_string(),
            ));
        }
        if image.is_empty() {
            return Err(ApiError::Validation("image file is empty".to_string()));
        }

        Ok(Self {
            image,
            content_type,
            location,
        })
    }
}
