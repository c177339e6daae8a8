//! Persistent card and note storage using redb.
//!
//! # Table design
//!
//! Two tables keyed by `(owner, id)`:
//! ```text
//! cards: (&str, u128) -> JSON-encoded Card
//! notes: (&str, u128) -> JSON-encoded NoteRecord
//! ```
//!
//! The owner occupies the high end of the composite key, so one range scan
//! `(owner, MIN)..=(owner, MAX)` returns exactly that owner's rows and can
//! never leak another owner's data.
//!
//! Every operation that rewrites positions (create, bulk-create, move,
//! reorder, delete) reads the affected columns and writes the renumbered
//! rows inside a single write transaction. Two concurrent appends can never
//! allocate the same position, and a reader never observes a card tagged
//! with a new column but a stale position.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{self, MovePlan, END};
use crate::card::{Card, CardPatch, GroupedBoard, NewCard};
use crate::error::{BoardError, Result};
use crate::types::CardStatus;

const CARDS: TableDefinition<(&str, u128), &[u8]> = TableDefinition::new("cards");
const NOTES: TableDefinition<(&str, u128), &[u8]> = TableDefinition::new("notes");

fn storage<E: std::fmt::Display>(e: E) -> BoardError {
    BoardError::Storage(e.to_string())
}

fn conflict<E: std::fmt::Display>(e: E) -> BoardError {
    BoardError::PersistenceConflict(e.to_string())
}

// ---------------------------------------------------------------------------
// Note record / source reference
// ---------------------------------------------------------------------------

/// Minimal meeting-note record. Notes are an external collaborator; the
/// store keeps just enough (title + body) to feed extraction and to resolve
/// a card's source reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Resolved view of a card's source reference. A dangling reference (the
/// note was deleted after the card was extracted) resolves to
/// `available: false` rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct SourceNote {
    pub id: Uuid,
    pub title: Option<String>,
    pub available: bool,
}

// ---------------------------------------------------------------------------
// CardStore
// ---------------------------------------------------------------------------

/// redb-backed store for cards and notes, scoped by owner on every call.
pub struct CardStore {
    db: Database,
}

impl CardStore {
    /// Open or create the database at `path` and ensure both tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(storage)?;
        let wt = db.begin_write().map_err(storage)?;
        wt.open_table(CARDS).map_err(storage)?;
        wt.open_table(NOTES).map_err(storage)?;
        wt.commit().map_err(storage)?;
        Ok(Self { db })
    }

    // -- reads --------------------------------------------------------------

    /// The owner's full board, grouped by column, sorted by position.
    pub fn list_grouped(&self, owner: &str) -> Result<GroupedBoard> {
        let rt = self.db.begin_read().map_err(storage)?;
        let table = rt.open_table(CARDS).map_err(storage)?;
        Ok(GroupedBoard::from_cards(owner_cards(&table, owner)?))
    }

    /// Fetch one card plus its resolved source-note reference.
    ///
    /// A card that doesn't exist and a card owned by someone else both
    /// return [`BoardError::CardNotFound`].
    pub fn get(&self, owner: &str, id: Uuid) -> Result<(Card, Option<SourceNote>)> {
        let rt = self.db.begin_read().map_err(storage)?;
        let cards = rt.open_table(CARDS).map_err(storage)?;
        let card = match cards.get((owner, id.as_u128())).map_err(storage)? {
            Some(guard) => serde_json::from_slice::<Card>(guard.value())?,
            None => return Err(BoardError::CardNotFound(id)),
        };

        let source = match card.source_note_id {
            None => None,
            Some(note_id) => {
                let notes = rt.open_table(NOTES).map_err(storage)?;
                match notes.get((owner, note_id.as_u128())).map_err(storage)? {
                    Some(guard) => {
                        let note: NoteRecord = serde_json::from_slice(guard.value())?;
                        Some(SourceNote {
                            id: note_id,
                            title: Some(note.title),
                            available: true,
                        })
                    }
                    None => Some(SourceNote {
                        id: note_id,
                        title: None,
                        available: false,
                    }),
                }
            }
        };

        Ok((card, source))
    }

    // -- single create ------------------------------------------------------

    /// Create one card, appended at the end of its target column.
    ///
    /// The column length is read and the new row written in the same
    /// transaction, so the position allocation can't race another append.
    pub fn create(&self, owner: &str, new: NewCard) -> Result<Card> {
        new.validate()?;
        let status = new.status.unwrap_or(CardStatus::Todo);

        let wt = self.db.begin_write().map_err(storage)?;
        let card = {
            let mut table = wt.open_table(CARDS).map_err(storage)?;
            let len = owner_cards(&table, owner)?
                .iter()
                .filter(|c| c.status == status)
                .count();
            let card = Card::new(owner, status, len as u32, new);
            put_card(&mut table, &card)?;
            card
        };
        wt.commit().map_err(conflict)?;
        tracing::debug!(owner, id = %card.id, status = %card.status, "card created");
        Ok(card)
    }

    /// Create all `items` at once, appended to the end of the todo column
    /// with consecutive positions, all referencing `source_note_id`.
    /// All-or-nothing: either every card lands or none do.
    pub fn bulk_create(
        &self,
        owner: &str,
        source_note_id: Uuid,
        items: Vec<NewCard>,
    ) -> Result<usize> {
        if items.is_empty() {
            return Err(BoardError::NothingSelected);
        }
        for item in &items {
            item.validate()?;
        }

        let wt = self.db.begin_write().map_err(storage)?;
        let count = {
            let mut table = wt.open_table(CARDS).map_err(storage)?;
            let base = owner_cards(&table, owner)?
                .iter()
                .filter(|c| c.status == CardStatus::Todo)
                .count();
            let count = items.len();
            for (i, mut item) in items.into_iter().enumerate() {
                item.status = Some(CardStatus::Todo);
                item.source_note_id = Some(source_note_id);
                let card = Card::new(owner, CardStatus::Todo, (base + i) as u32, item);
                put_card(&mut table, &card)?;
            }
            count
        };
        wt.commit().map_err(conflict)?;
        tracing::info!(owner, note = %source_note_id, count, "bulk-created cards");
        Ok(count)
    }

    // -- updates ------------------------------------------------------------

    /// Field-only edit. Status and position are untouched; those go through
    /// the move paths below.
    pub fn update_fields(&self, owner: &str, id: Uuid, patch: CardPatch) -> Result<Card> {
        patch.validate()?;
        let wt = self.db.begin_write().map_err(storage)?;
        let card = {
            let mut table = wt.open_table(CARDS).map_err(storage)?;
            let mut card = get_card(&table, owner, id)?;
            patch.apply(&mut card);
            put_card(&mut table, &card)?;
            card
        };
        wt.commit().map_err(conflict)?;
        Ok(card)
    }

    /// The one-request move: target column and target index applied as a
    /// single transaction that renumbers both affected columns.
    pub fn move_card(
        &self,
        owner: &str,
        id: Uuid,
        status: CardStatus,
        index: usize,
    ) -> Result<Card> {
        self.apply_move(owner, id, Some(status), index)
    }

    /// Column-only move; the card lands at the end of the target column.
    /// Setting the status a card already has is a no-op.
    pub fn update_status(&self, owner: &str, id: Uuid, status: CardStatus) -> Result<Card> {
        self.apply_move(owner, id, Some(status), END)
    }

    /// Reorder within the card's current column.
    pub fn update_position(&self, owner: &str, id: Uuid, position: usize) -> Result<Card> {
        self.apply_move(owner, id, None, position)
    }

    fn apply_move(
        &self,
        owner: &str,
        id: Uuid,
        target_status: Option<CardStatus>,
        target_index: usize,
    ) -> Result<Card> {
        let wt = self.db.begin_write().map_err(storage)?;
        let (card, wrote) = {
            let mut table = wt.open_table(CARDS).map_err(storage)?;
            let board = GroupedBoard::from_cards(owner_cards(&table, owner)?);
            let (from_status, _) = board.locate(id).ok_or(BoardError::CardNotFound(id))?;

            // "Set the status it already has" must not shuffle the card to
            // the end of its column.
            let status = target_status.unwrap_or(from_status);
            if target_index == END && status == from_status {
                let card = board.find(id).cloned().ok_or(BoardError::CardNotFound(id))?;
                (card, false)
            } else {
                let plan = board::plan_move(&board, id, status, target_index)?;
                let wrote = !plan.is_noop();
                (write_plan(&mut table, &board, &plan)?, wrote)
            }
        };
        if wrote {
            wt.commit().map_err(conflict)?;
            tracing::debug!(owner, id = %id, status = %card.status, position = card.position, "card moved");
        } else {
            wt.abort().map_err(storage)?;
        }
        Ok(card)
    }

    /// Delete a card and renumber the column it left.
    pub fn delete(&self, owner: &str, id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(storage)?;
        {
            let mut table = wt.open_table(CARDS).map_err(storage)?;
            let board = GroupedBoard::from_cards(owner_cards(&table, owner)?);
            let (status, _) = board.locate(id).ok_or(BoardError::CardNotFound(id))?;

            table.remove((owner, id.as_u128())).map_err(storage)?;
            for (i, card) in board
                .column(status)
                .iter()
                .filter(|c| c.id != id)
                .enumerate()
            {
                if card.position != i as u32 {
                    let mut renumbered = card.clone();
                    renumbered.position = i as u32;
                    put_card(&mut table, &renumbered)?;
                }
            }
        }
        wt.commit().map_err(conflict)?;
        Ok(())
    }

    // -- notes (narrow contract) --------------------------------------------

    pub fn create_note(&self, owner: &str, title: String, body: String) -> Result<NoteRecord> {
        let note = NoteRecord {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title,
            body,
            created_at: Utc::now(),
        };
        let wt = self.db.begin_write().map_err(storage)?;
        {
            let mut table = wt.open_table(NOTES).map_err(storage)?;
            let value = serde_json::to_vec(&note)?;
            table
                .insert((owner, note.id.as_u128()), value.as_slice())
                .map_err(storage)?;
        }
        wt.commit().map_err(conflict)?;
        Ok(note)
    }

    pub fn get_note(&self, owner: &str, id: Uuid) -> Result<NoteRecord> {
        let rt = self.db.begin_read().map_err(storage)?;
        let table = rt.open_table(NOTES).map_err(storage)?;
        match table.get((owner, id.as_u128())).map_err(storage)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Err(BoardError::NoteNotFound(id)),
        }
    }

    /// Delete a note. Cards referencing it are preserved untouched; their
    /// source reference becomes a dangling pointer (orphan, don't cascade).
    pub fn delete_note(&self, owner: &str, id: Uuid) -> Result<()> {
        let wt = self.db.begin_write().map_err(storage)?;
        let removed = {
            let mut table = wt.open_table(NOTES).map_err(storage)?;
            let removed = table.remove((owner, id.as_u128())).map_err(storage)?.is_some();
            removed
        };
        wt.commit().map_err(conflict)?;
        if !removed {
            return Err(BoardError::NoteNotFound(id));
        }
        Ok(())
    }

    /// Remove everything the owner has. Unlike note deletion, the owner
    /// relationship does cascade.
    pub fn delete_owner(&self, owner: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(storage)?;
        {
            let mut cards = wt.open_table(CARDS).map_err(storage)?;
            for card in owner_cards(&cards, owner)? {
                cards.remove((owner, card.id.as_u128())).map_err(storage)?;
            }
            let mut notes = wt.open_table(NOTES).map_err(storage)?;
            let ids: Vec<u128> = notes
                .range((owner, u128::MIN)..=(owner, u128::MAX))
                .map_err(storage)?
                .map(|entry| entry.map(|(k, _)| k.value().1).map_err(storage))
                .collect::<Result<_>>()?;
            for id in ids {
                notes.remove((owner, id)).map_err(storage)?;
            }
        }
        wt.commit().map_err(conflict)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

fn owner_cards<T>(table: &T, owner: &str) -> Result<Vec<Card>>
where
    T: ReadableTable<(&'static str, u128), &'static [u8]>,
{
    let mut cards = Vec::new();
    for entry in table
        .range((owner, u128::MIN)..=(owner, u128::MAX))
        .map_err(storage)?
    {
        let (_, value) = entry.map_err(storage)?;
        cards.push(serde_json::from_slice(value.value())?);
    }
    Ok(cards)
}

fn get_card<T>(table: &T, owner: &str, id: Uuid) -> Result<Card>
where
    T: ReadableTable<(&'static str, u128), &'static [u8]>,
{
    match table.get((owner, id.as_u128())).map_err(storage)? {
        Some(guard) => Ok(serde_json::from_slice(guard.value())?),
        None => Err(BoardError::CardNotFound(id)),
    }
}

fn put_card(
    table: &mut redb::Table<'_, (&'static str, u128), &'static [u8]>,
    card: &Card,
) -> Result<()> {
    let value = serde_json::to_vec(card)?;
    table
        .insert((card.owner.as_str(), card.id.as_u128()), value.as_slice())
        .map_err(storage)?;
    Ok(())
}

/// Write every rewrite in `plan` and return the moved card's final row.
fn write_plan(
    table: &mut redb::Table<'_, (&'static str, u128), &'static [u8]>,
    board: &GroupedBoard,
    plan: &MovePlan,
) -> Result<Card> {
    let mut moved = board
        .find(plan.card_id)
        .cloned()
        .ok_or(BoardError::CardNotFound(plan.card_id))?;

    for rw in &plan.rewrites {
        let mut card = board
            .find(rw.id)
            .cloned()
            .ok_or(BoardError::CardNotFound(rw.id))?;
        card.status = rw.status;
        card.position = rw.position;
        if card.id == plan.card_id {
            card.updated_at = Utc::now();
            moved = card.clone();
        }
        put_card(table, &card)?;
    }

    if plan.is_noop() {
        moved.status = plan.status;
        moved.position = plan.position;
    }
    Ok(moved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
