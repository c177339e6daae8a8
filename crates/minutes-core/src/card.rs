use crate::error::{BoardError, Result};
use crate::types::{CardStatus, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single task card on the board.
///
/// `position` orders cards within the (owner, status) partition. After every
/// settled store operation, the positions of a partition of size n are
/// exactly `0..n-1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub owner: String,
    pub status: CardStatus,
    pub position: u32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    /// Non-owning reference to the meeting note that produced this card.
    /// Survives note deletion as a dangling id; `None` for manual cards.
    pub source_note_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a single card. Title is required; everything else
/// falls back to the defaults (priority medium, column todo).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<CardStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub source_note_id: Option<Uuid>,
}

impl NewCard {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        Ok(())
    }
}

/// Field-only partial update. Never touches status or position; those go
/// through the move planner so the column invariant is restored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl CardPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(BoardError::EmptyTitle);
            }
        }
        Ok(())
    }

    pub fn apply(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(priority) = self.priority {
            card.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            card.due_date = due_date;
        }
        card.updated_at = Utc::now();
    }
}

impl Card {
    pub fn new(owner: impl Into<String>, status: CardStatus, position: u32, new: NewCard) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            status,
            position,
            title: new.title,
            description: new.description,
            priority: new.priority.unwrap_or_default(),
            due_date: new.due_date,
            source_note_id: new.source_note_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// GroupedBoard
// ---------------------------------------------------------------------------

/// One owner's board, grouped by column and sorted ascending by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedBoard {
    pub todo: Vec<Card>,
    pub doing: Vec<Card>,
    pub done: Vec<Card>,
}

impl GroupedBoard {
    /// Group a flat list of one owner's cards and sort each column.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut board = GroupedBoard::default();
        for card in cards {
            board.column_mut(card.status).push(card);
        }
        for status in CardStatus::all() {
            board.column_mut(*status).sort_by_key(|c| c.position);
        }
        board
    }

    pub fn column(&self, status: CardStatus) -> &Vec<Card> {
        match status {
            CardStatus::Todo => &self.todo,
            CardStatus::Doing => &self.doing,
            CardStatus::Done => &self.done,
        }
    }

    pub fn column_mut(&mut self, status: CardStatus) -> &mut Vec<Card> {
        match status {
            CardStatus::Todo => &mut self.todo,
            CardStatus::Doing => &mut self.doing,
            CardStatus::Done => &mut self.done,
        }
    }

    /// Locate a card by id, returning its column and index within it.
    pub fn locate(&self, id: Uuid) -> Option<(CardStatus, usize)> {
        for status in CardStatus::all() {
            if let Some(i) = self.column(*status).iter().position(|c| c.id == id) {
                return Some((*status, i));
            }
        }
        None
    }

    pub fn find(&self, id: Uuid) -> Option<&Card> {
        let (status, i) = self.locate(id)?;
        Some(&self.column(status)[i])
    }

    pub fn total_len(&self) -> usize {
        self.todo.len() + self.doing.len() + self.done.len()
    }

    pub fn into_cards(self) -> Vec<Card> {
        let mut cards = self.todo;
        cards.extend(self.doing);
        cards.extend(self.done);
        cards
    }

    /// Panics unless every column's positions are exactly `0..n-1`.
    /// Test-side check for the core invariant.
    #[doc(hidden)]
    pub fn assert_contiguous(&self) {
        for status in CardStatus::all() {
            for (i, card) in self.column(*status).iter().enumerate() {
                assert_eq!(
                    card.position as usize, i,
                    "column {} broke contiguity at index {i}: got position {}",
                    status, card.position
                );
                assert_eq!(card.status, *status, "card {} filed in wrong column", card.id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
