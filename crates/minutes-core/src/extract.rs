//! Transient extraction-candidate model.
//!
//! Candidates are proposals produced by the external text-understanding
//! service. They live only for the duration of a review session and are
//! discarded after save or cancel; only the cards created from accepted
//! candidates persist.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::card::NewCard;
use crate::error::{BoardError, Result};
use crate::types::{Confidence, Priority};

/// One proposed card, independently editable during review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    /// Raw due-date string as the service produced it; canonicalized by
    /// [`normalize_due_date`] at save time.
    pub due_date: Option<String>,
    /// Review-only selection flag; defaults to true.
    pub included: bool,
}

impl ExtractionCandidate {
    /// Convert an accepted candidate into card-creation input, normalizing
    /// the due date to a canonical UTC timestamp.
    pub fn into_new_card(self) -> Result<NewCard> {
        let due_date = match self.due_date.as_deref() {
            Some(raw) => Some(normalize_due_date(raw)?),
            None => None,
        };
        Ok(NewCard {
            title: self.title,
            description: self.description,
            priority: Some(self.priority),
            status: None,
            due_date,
            source_note_id: None,
        })
    }
}

/// A whole extraction result. Confidence is computed once for the batch,
/// never per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionBatch {
    pub candidates: Vec<ExtractionCandidate>,
    pub confidence: Confidence,
    pub message: Option<String>,
}

impl ExtractionBatch {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn included_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.included).count()
    }
}

/// Canonicalize a due-date string to a UTC timestamp.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC
/// midnight).
pub fn normalize_due_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
        }
    }
    Err(BoardError::InvalidDueDate(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
