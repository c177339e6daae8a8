use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use minutes_core::extract::{ExtractionBatch, ExtractionCandidate};
use minutes_core::types::{Confidence, Priority};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateNoteBody {
    pub title: String,
    pub body: String,
}

/// POST /meeting-notes — narrow contract: notes exist so extraction has
/// text to work from and so deletion can exercise the orphan policy.
pub async fn create_note(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::validation("note title must not be empty"));
    }
    let store = app.store.clone();
    let note = tokio::task::spawn_blocking(move || store.create_note(&owner, body.title, body.body))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": note })),
    ))
}

/// GET /meeting-notes/:id
pub async fn get_note(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let note = tokio::task::spawn_blocking(move || store.get_note(&owner, id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "data": note })))
}

/// DELETE /meeting-notes/:id — cards that reference the note are preserved;
/// only their ability to resolve the reference is lost.
pub async fn delete_note(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || store.delete_note(&owner, id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /meeting-notes/:id/extract — run the external extraction service
/// over the note's text and return transient candidates for review.
///
/// Zero candidates is a successful response with a message, not an error.
pub async fn extract(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let note = tokio::task::spawn_blocking(move || store.get_note(&owner, id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let resp = app.extractor.extract(&note.body).await?;
    let batch = batch_from_wire(resp);
    tracing::info!(note = %id, candidates = batch.candidates.len(), "extraction completed");

    Ok(Json(serde_json::json!({
        "data": {
            "action_items": batch.candidates,
            "confidence": batch.confidence,
            "message": batch.message,
        }
    })))
}

// ---------------------------------------------------------------------------
// Wire conversions
// ---------------------------------------------------------------------------

fn batch_from_wire(resp: extract_agent::ExtractResponse) -> ExtractionBatch {
    let candidates: Vec<ExtractionCandidate> = resp
        .action_items
        .into_iter()
        .map(|c| ExtractionCandidate {
            title: c.title,
            description: c.description,
            priority: match c.priority {
                Some(extract_agent::Priority::High) => Priority::High,
                Some(extract_agent::Priority::Low) => Priority::Low,
                Some(extract_agent::Priority::Medium) | None => Priority::Medium,
            },
            due_date: c.due_date,
            included: true,
        })
        .collect();

    let message = if candidates.is_empty() {
        Some("No action items were found in this note. Retry, or add cards manually.".to_string())
    } else {
        None
    };

    ExtractionBatch {
        candidates,
        confidence: match resp.confidence {
            extract_agent::Confidence::High => Confidence::High,
            extract_agent::Confidence::Medium => Confidence::Medium,
            extract_agent::Confidence::Low => Confidence::Low,
        },
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_wire_batch_gets_a_message() {
        let batch = batch_from_wire(extract_agent::ExtractResponse {
            action_items: vec![],
            confidence: extract_agent::Confidence::High,
        });
        assert!(batch.is_empty());
        assert!(batch.message.is_some());
    }

    #[test]
    fn candidates_default_to_included_and_medium_priority() {
        let batch = batch_from_wire(extract_agent::ExtractResponse {
            action_items: vec![extract_agent::Candidate {
                title: "Update docs".into(),
                description: None,
                priority: None,
                due_date: None,
            }],
            confidence: extract_agent::Confidence::Medium,
        });
        assert!(batch.candidates[0].included);
        assert_eq!(batch.candidates[0].priority, Priority::Medium);
        assert!(batch.message.is_none());
    }
}
