use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use extract_agent::ExtractError;
use minutes_core::BoardError;

// ---------------------------------------------------------------------------
// Internal sentinel for validation errors
// ---------------------------------------------------------------------------

/// Private sentinel carrying a request-validation failure through the
/// `anyhow::Error` chain. Validation responses use a distinct body shape
/// (`{statusCode, error, message}`) from the regular error envelope.
#[derive(Debug)]
struct ValidationError(String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// ApiError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Regular errors render as `{"error": {"code", "message"}}`; validation
/// failures render as `{"statusCode", "error", "message"}`. Unknown errors
/// collapse to a generic 500 so no internal detail reaches the client.
#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl ApiError {
    /// Construct a 400 validation error with the distinct body shape.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(ValidationError(msg.into()).into())
    }
}

fn envelope(status: StatusCode, code: &str, message: &str) -> Response {
    let body = serde_json::json!({ "error": { "code": code, "message": message } });
    (status, axum::Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(v) = self.0.downcast_ref::<ValidationError>() {
            let body = serde_json::json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": v.0.clone(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<BoardError>() {
            return match e {
                // Missing and not-owned are deliberately the same outcome.
                BoardError::CardNotFound(_) => {
                    envelope(StatusCode::NOT_FOUND, "NOT_FOUND", "action item not found")
                }
                BoardError::NoteNotFound(_) => {
                    envelope(StatusCode::NOT_FOUND, "NOT_FOUND", "meeting note not found")
                }
                BoardError::EmptyTitle
                | BoardError::InvalidStatus(_)
                | BoardError::InvalidPriority(_)
                | BoardError::InvalidDueDate(_)
                | BoardError::NothingSelected => {
                    let body = serde_json::json!({
                        "statusCode": 400,
                        "error": "Bad Request",
                        "message": e.to_string(),
                    });
                    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
                }
                BoardError::PersistenceConflict(_) => envelope(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "the board changed underneath this request; refetch and retry",
                ),
                BoardError::Storage(_)
                | BoardError::Io(_)
                | BoardError::Yaml(_)
                | BoardError::Json(_) => {
                    tracing::error!(error = %e, "storage failure");
                    envelope(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        "internal server error",
                    )
                }
            };
        }

        if let Some(e) = self.0.downcast_ref::<ExtractError>() {
            return match e {
                ExtractError::RateLimited => envelope(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "the extraction service is busy; please try again in a moment",
                ),
                ExtractError::Timeout
                | ExtractError::Service(_)
                | ExtractError::Malformed(_)
                | ExtractError::Http(_) => {
                    tracing::warn!(error = %e, "extraction failed");
                    envelope(
                        StatusCode::BAD_GATEWAY,
                        "EXTRACTION_FAILED",
                        "could not extract action items from this note",
                    )
                }
            };
        }

        tracing::error!(error = %self.0, "unhandled error");
        envelope(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal server error",
        )
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn card_not_found_maps_to_404() {
        let err = ApiError(BoardError::CardNotFound(Uuid::new_v4()).into());
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn note_not_found_maps_to_404() {
        let err = ApiError(BoardError::NoteNotFound(Uuid::new_v4()).into());
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_title_maps_to_400() {
        let err = ApiError(BoardError::EmptyTitle.into());
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_conflict_maps_to_409() {
        let err = ApiError(BoardError::PersistenceConflict("commit".into()).into());
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let err = ApiError(ExtractError::RateLimited.into());
        assert_eq!(status_of(err), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn extractor_failure_maps_to_502() {
        let err = ApiError(ExtractError::Service(500).into());
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_error_maps_to_500_without_detail() {
        let err = ApiError(BoardError::Storage("redb: page corrupted at 0x1f".into()).into());
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_error_maps_to_500() {
        let err = ApiError(anyhow::anyhow!("something unexpected"));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_constructor_uses_distinct_shape() {
        let resp = ApiError::validation("position must be an integer").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
