use minutes_core::card::{Card, GroupedBoard, NewCard};
use minutes_core::extract::{ExtractionBatch, ExtractionCandidate};
use minutes_core::types::{CardStatus, Confidence};
use uuid::Uuid;

use crate::error::ClientError;
use crate::Result;

/// The server operations the client-side components need. The trait seam
/// lets the controller and review flow run against a scripted double in
/// tests, with [`HttpBoardApi`] as the real transport.
pub trait BoardApi {
    fn fetch_board(&self) -> impl std::future::Future<Output = Result<GroupedBoard>>;

    /// The one-request move: target column and target index together.
    fn move_card(
        &self,
        id: Uuid,
        status: CardStatus,
        position: u32,
    ) -> impl std::future::Future<Output = Result<Card>>;

    fn bulk_create(
        &self,
        note_id: Uuid,
        items: Vec<NewCard>,
    ) -> impl std::future::Future<Output = Result<usize>>;

    fn extract(&self, note_id: Uuid) -> impl std::future::Future<Output = Result<ExtractionBatch>>;
}

// ---------------------------------------------------------------------------
// HttpBoardApi
// ---------------------------------------------------------------------------

/// reqwest-backed [`BoardApi`] speaking the minutes HTTP API with bearer
/// authentication.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    async fn data(&self, resp: reqwest::Response) -> Result<serde_json::Value> {
        let status = resp.status().as_u16();
        let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await?)?;
        match status {
            200..=299 => Ok(body),
            401 => Err(ClientError::Unauthorized),
            404 => Err(ClientError::NotFound),
            429 => Err(ClientError::RateLimited),
            _ => Err(ClientError::Api {
                status,
                code: body["error"]["code"].as_str().unwrap_or("UNKNOWN").to_string(),
                message: body["error"]["message"]
                    .as_str()
                    .or_else(|| body["message"].as_str())
                    .unwrap_or("unexpected server error")
                    .to_string(),
            }),
        }
    }
}

impl BoardApi for HttpBoardApi {
    async fn fetch_board(&self) -> Result<GroupedBoard> {
        let resp = self
            .http
            .get(format!("{}/action-items?grouped=true", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body = self.data(resp).await?;
        Ok(serde_json::from_value(body["data"].clone())?)
    }

    async fn move_card(&self, id: Uuid, status: CardStatus, position: u32) -> Result<Card> {
        let resp = self
            .http
            .patch(format!("{}/action-items/{id}/move", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "status": status, "position": position }))
            .send()
            .await?;
        let body = self.data(resp).await?;
        Ok(serde_json::from_value(body["data"].clone())?)
    }

    async fn bulk_create(&self, note_id: Uuid, items: Vec<NewCard>) -> Result<usize> {
        let items: Vec<serde_json::Value> = items
            .into_iter()
            .map(|item| {
                serde_json::json!({
                    "title": item.title,
                    "description": item.description,
                    "priority": item.priority.map(|p| p.as_str()),
                    "status": "todo",
                    "due_date": item.due_date.map(|d| d.to_rfc3339()),
                })
            })
            .collect();

        let resp = self
            .http
            .post(format!("{}/action-items/bulk", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "meeting_note_id": note_id, "items": items }))
            .send()
            .await?;
        let body = self.data(resp).await?;
        let count: u64 = serde_json::from_value(body["created_count"].clone())?;
        Ok(count as usize)
    }

    async fn extract(&self, note_id: Uuid) -> Result<ExtractionBatch> {
        let resp = self
            .http
            .post(format!("{}/meeting-notes/{note_id}/extract", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body = self.data(resp).await?;
        let candidates: Vec<ExtractionCandidate> =
            serde_json::from_value(body["data"]["action_items"].clone())?;
        let confidence: Confidence = serde_json::from_value(body["data"]["confidence"].clone())?;
        let message = body["data"]["message"].as_str().map(str::to_string);
        Ok(ExtractionBatch {
            candidates,
            confidence,
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
