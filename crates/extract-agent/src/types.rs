use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /v1/extract`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest<'a> {
    pub text: &'a str,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Batch-level quality signal. Applies to the whole response, never to a
/// single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

fn default_confidence() -> Confidence {
    Confidence::Medium
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One proposed action item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Due date as produced by the service — RFC 3339 or `YYYY-MM-DD`.
    /// Canonicalization is the caller's concern.
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Successful extraction result. `action_items` may legitimately be empty;
/// the service says so rather than erroring when the text holds no tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub action_items: Vec<Candidate>,
    #[serde(default = "default_confidence")]
    pub confidence: Confidence,
}
