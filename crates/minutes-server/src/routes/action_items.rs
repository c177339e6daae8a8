use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use minutes_core::card::{CardPatch, NewCard};
use minutes_core::extract::normalize_due_date;
use minutes_core::types::CardStatus;
use minutes_core::BoardError;

use crate::auth::Owner;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub grouped: Option<bool>,
}

/// GET /action-items — the owner's cards, grouped by column when
/// `?grouped=true`, otherwise flat in (column, position) order.
pub async fn list(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let board = tokio::task::spawn_blocking(move || store.list_grouped(&owner))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let data = if query.grouped.unwrap_or(false) {
        serde_json::json!({
            "todo": board.todo,
            "doing": board.doing,
            "done": board.done,
        })
    } else {
        serde_json::json!(board.into_cards())
    };
    Ok(Json(serde_json::json!({ "data": data })))
}

/// GET /action-items/:id — one card plus its resolved source-note info.
pub async fn get_one(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let (card, source) = tokio::task::spawn_blocking(move || store.get(&owner, id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let mut data = serde_json::to_value(&card).map_err(|e| ApiError(e.into()))?;
    data["source_note"] = serde_json::json!(source);
    Ok(Json(serde_json::json!({ "data": data })))
}

#[derive(serde::Deserialize)]
pub struct CreateBody {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub meeting_note_id: Option<Uuid>,
}

impl CreateBody {
    fn into_new_card(self) -> Result<NewCard, BoardError> {
        Ok(NewCard {
            title: self.title,
            description: self.description,
            priority: self.priority.as_deref().map(str::parse).transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
            due_date: self.due_date.as_deref().map(normalize_due_date).transpose()?,
            source_note_id: self.meeting_note_id,
        })
    }
}

/// POST /action-items — create one card, appended to its column.
pub async fn create(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let new = body.into_new_card()?;
    let store = app.store.clone();
    let card = tokio::task::spawn_blocking(move || store.create(&owner, new))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": card })),
    ))
}

#[derive(serde::Deserialize)]
pub struct BulkItem {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    // Status is accepted for shape compatibility but bulk-created cards
    // always land in todo.
    #[allow(dead_code)]
    pub status: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct BulkBody {
    pub meeting_note_id: Uuid,
    pub items: Vec<BulkItem>,
}

/// POST /action-items/bulk — create all accepted extraction candidates in
/// one atomic allocation at the end of the todo column.
pub async fn bulk_create(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(body): Json<BulkBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut items = Vec::with_capacity(body.items.len());
    for item in body.items {
        items.push(NewCard {
            title: item.title,
            description: item.description,
            priority: item.priority.as_deref().map(str::parse).transpose()?,
            status: None,
            due_date: item.due_date.as_deref().map(normalize_due_date).transpose()?,
            source_note_id: None,
        });
    }

    let store = app.store.clone();
    let note_id = body.meeting_note_id;
    let count = tokio::task::spawn_blocking(move || store.bulk_create(&owner, note_id, items))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "created_count": count })),
    ))
}

#[derive(serde::Deserialize)]
pub struct UpdateBody {
    pub title: Option<String>,
    /// `null` clears the description; missing leaves it alone.
    #[serde(default)]
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    /// `null` clears the due date; missing leaves it alone.
    #[serde(default)]
    pub due_date: Option<Option<String>>,
}

/// PUT/PATCH /action-items/:id — field-only edits; never moves the card.
pub async fn update(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let due_date = match body.due_date {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(normalize_due_date(&raw)?)),
    };
    let patch = CardPatch {
        title: body.title,
        description: body.description,
        priority: body.priority.as_deref().map(str::parse).transpose()?,
        due_date,
    };

    let store = app.store.clone();
    let card = tokio::task::spawn_blocking(move || store.update_fields(&owner, id, patch))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "data": card })))
}

#[derive(serde::Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// PATCH /action-items/:id/status — column-only move; the card lands at the
/// end of the target column, both columns renumbered in one transaction.
pub async fn patch_status(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status: CardStatus = body.status.parse()?;
    let store = app.store.clone();
    let card = tokio::task::spawn_blocking(move || store.update_status(&owner, id, status))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "data": card })))
}

#[derive(serde::Deserialize)]
pub struct PositionBody {
    pub position: u32,
}

/// PATCH /action-items/:id/position — reorder within the current column.
pub async fn patch_position(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(body): Json<PositionBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let position = body.position as usize;
    let card = tokio::task::spawn_blocking(move || store.update_position(&owner, id, position))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "data": card })))
}

#[derive(serde::Deserialize)]
pub struct MoveBody {
    pub status: String,
    pub position: u32,
}

/// PATCH /action-items/:id/move — the full drag gesture as one request:
/// target column and target index applied in a single transaction.
pub async fn patch_move(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status: CardStatus = body.status.parse()?;
    let store = app.store.clone();
    let position = body.position as usize;
    let card = tokio::task::spawn_blocking(move || store.move_card(&owner, id, status, position))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "data": card })))
}

/// DELETE /action-items/:id
pub async fn delete(
    State(app): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || store.delete(&owner, id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(StatusCode::NO_CONTENT)
}
