//! Extraction review state machine.
//!
//! Extract-and-review is a two-phase flow: the service proposes candidates,
//! a person accepts a subset, and only then do cards exist. The flow never
//! persists anything on its own; [`ExtractionFlow::save`] is the single
//! transition that creates cards, and it creates exactly the included
//! candidates in one bulk request.

use minutes_core::card::NewCard;
use minutes_core::extract::ExtractionCandidate;
use minutes_core::types::Confidence;
use minutes_core::BoardError;
use uuid::Uuid;

use crate::api::BoardApi;
use crate::error::ClientError;
use crate::Result;

/// Why an extraction attempt failed, coarse enough for the UI to pick a
/// message and a retry affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service is throttling; retry after a pause.
    RateLimited,
    /// Timeout, malformed reply, or a service-side error.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Extracting,
    /// Candidates are on screen and editable.
    Reviewing,
    /// The service answered but found nothing actionable.
    Empty { message: String },
    Failed { kind: FailureKind, message: String },
    Saving,
}

/// One review session over a single meeting note.
pub struct ExtractionFlow {
    state: ReviewState,
    note_id: Option<Uuid>,
    candidates: Vec<ExtractionCandidate>,
    confidence: Option<Confidence>,
}

impl Default for ExtractionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionFlow {
    pub fn new() -> Self {
        Self {
            state: ReviewState::Idle,
            note_id: None,
            candidates: Vec::new(),
            confidence: None,
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn candidates(&self) -> &[ExtractionCandidate] {
        &self.candidates
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    pub fn included_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.included).count()
    }

    /// Saving requires at least one included candidate; a review with
    /// everything deselected has nothing to persist.
    pub fn can_save(&self) -> bool {
        self.state == ReviewState::Reviewing && self.included_count() > 0
    }

    /// Run extraction for `note_id`. Lands in `Reviewing`, `Empty`, or
    /// `Failed`; the caller inspects [`Self::state`]. Retrying after a
    /// failure is just calling this again.
    pub async fn start<A: BoardApi>(&mut self, api: &A, note_id: Uuid) {
        self.state = ReviewState::Extracting;
        self.note_id = Some(note_id);
        self.candidates.clear();
        self.confidence = None;

        match api.extract(note_id).await {
            Ok(batch) if batch.is_empty() => {
                let message = batch.message.unwrap_or_else(|| {
                    "No action items were found in this note.".to_string()
                });
                self.state = ReviewState::Empty { message };
            }
            Ok(batch) => {
                self.candidates = batch.candidates;
                self.confidence = Some(batch.confidence);
                self.state = ReviewState::Reviewing;
            }
            Err(error) => {
                let kind = match error {
                    ClientError::RateLimited => FailureKind::RateLimited,
                    _ => FailureKind::Other,
                };
                tracing::warn!(note = %note_id, %error, "extraction failed");
                self.state = ReviewState::Failed {
                    kind,
                    message: error.to_string(),
                };
            }
        }
    }

    /// Mutable access to a candidate for field edits, only while reviewing.
    pub fn candidate_mut(&mut self, index: usize) -> Option<&mut ExtractionCandidate> {
        if self.state != ReviewState::Reviewing {
            return None;
        }
        self.candidates.get_mut(index)
    }

    /// Flip a candidate's selection. Returns whether the index was valid.
    pub fn set_included(&mut self, index: usize, included: bool) -> bool {
        match self.candidate_mut(index) {
            Some(candidate) => {
                candidate.included = included;
                true
            }
            None => false,
        }
    }

    /// Persist the included candidates as cards in one bulk request.
    ///
    /// On success the session ends (back to `Idle`, candidates discarded)
    /// and the number of created cards is returned. On failure the session
    /// stays in `Reviewing` with every candidate and edit intact.
    pub async fn save<A: BoardApi>(&mut self, api: &A) -> Result<usize> {
        if !self.can_save() {
            return Err(BoardError::NothingSelected.into());
        }
        let note_id = self.note_id.ok_or(BoardError::NothingSelected)?;

        let mut items: Vec<NewCard> = Vec::new();
        for candidate in self.candidates.iter().filter(|c| c.included) {
            match candidate.clone().into_new_card() {
                Ok(item) => items.push(item),
                Err(e) => return Err(e.into()),
            }
        }

        self.state = ReviewState::Saving;
        match api.bulk_create(note_id, items).await {
            Ok(created) => {
                self.reset();
                Ok(created)
            }
            Err(error) => {
                self.state = ReviewState::Reviewing;
                Err(error)
            }
        }
    }

    /// Abandon the session, discarding every candidate.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = ReviewState::Idle;
        self.note_id = None;
        self.candidates.clear();
        self.confidence = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
