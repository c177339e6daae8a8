//! Pure move/reorder planner.
//!
//! Given a board and a drop target, [`plan_move`] computes the minimal set
//! of `(card, status, position)` rewrites that takes the board from its
//! current state to the post-move state, with both affected columns
//! renumbered back to `0..n-1`. The planner does no I/O: the store applies
//! a plan inside one write transaction, and the client applies the same
//! plan locally as its optimistic prediction.

use crate::card::GroupedBoard;
use crate::error::{BoardError, Result};
use crate::types::CardStatus;
use uuid::Uuid;

/// Target index that always clamps to the end of the target column.
pub const END: usize = usize::MAX;

/// One row rewrite produced by a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub id: Uuid,
    pub status: CardStatus,
    pub position: u32,
}

/// The computed outcome of a move: where the card lands and which rows
/// (the moved card included) must be rewritten to get there.
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub card_id: Uuid,
    /// Column and index the card currently occupies.
    pub from: (CardStatus, usize),
    /// Final column of the moved card.
    pub status: CardStatus,
    /// Final index of the moved card, after clamping.
    pub position: u32,
    pub rewrites: Vec<Rewrite>,
}

impl MovePlan {
    /// True when the target equals the current slot and nothing changes.
    pub fn is_noop(&self) -> bool {
        self.rewrites.is_empty()
    }
}

/// Compute the rewrites for moving `card_id` to `target_index` within
/// `target_status`.
///
/// `target_index` is 0-based and refers to the target column's state after
/// the card has been removed from its source column; it is clamped to
/// `[0, len]`. Pass [`END`] to append.
pub fn plan_move(
    board: &GroupedBoard,
    card_id: Uuid,
    target_status: CardStatus,
    target_index: usize,
) -> Result<MovePlan> {
    let (from_status, from_index) = board
        .locate(card_id)
        .ok_or(BoardError::CardNotFound(card_id))?;

    let mut rewrites = Vec::new();

    if target_status == from_status {
        let ids: Vec<Uuid> = board.column(from_status).iter().map(|c| c.id).collect();
        let clamped = target_index.min(ids.len() - 1);
        if clamped == from_index {
            return Ok(MovePlan {
                card_id,
                from: (from_status, from_index),
                status: from_status,
                position: from_index as u32,
                rewrites,
            });
        }
        let mut order = ids.clone();
        order.remove(from_index);
        order.insert(clamped, card_id);
        collect_rewrites(board, from_status, &order, &mut rewrites);
        return Ok(MovePlan {
            card_id,
            from: (from_status, from_index),
            status: from_status,
            position: clamped as u32,
            rewrites,
        });
    }

    // Cross-column: close the gap in the source, open a slot in the target.
    let source_order: Vec<Uuid> = board
        .column(from_status)
        .iter()
        .map(|c| c.id)
        .filter(|id| *id != card_id)
        .collect();
    collect_rewrites(board, from_status, &source_order, &mut rewrites);

    let mut target_order: Vec<Uuid> = board.column(target_status).iter().map(|c| c.id).collect();
    let clamped = target_index.min(target_order.len());
    target_order.insert(clamped, card_id);
    collect_rewrites(board, target_status, &target_order, &mut rewrites);

    Ok(MovePlan {
        card_id,
        from: (from_status, from_index),
        status: target_status,
        position: clamped as u32,
        rewrites,
    })
}

/// Append a rewrite for every card in `order` whose stored row differs from
/// `(status, index-in-order)`.
fn collect_rewrites(
    board: &GroupedBoard,
    status: CardStatus,
    order: &[Uuid],
    out: &mut Vec<Rewrite>,
) {
    for (i, id) in order.iter().enumerate() {
        let stored = board.find(*id).map(|c| (c.status, c.position));
        if stored != Some((status, i as u32)) {
            out.push(Rewrite {
                id: *id,
                status,
                position: i as u32,
            });
        }
    }
}

/// Apply a plan to an in-memory board (the client's optimistic prediction,
/// and the store's in-transaction view).
pub fn apply_plan(board: &mut GroupedBoard, plan: &MovePlan) {
    if plan.is_noop() {
        return;
    }
    let mut cards = std::mem::take(board).into_cards();
    for rw in &plan.rewrites {
        if let Some(card) = cards.iter_mut().find(|c| c.id == rw.id) {
            card.status = rw.status;
            card.position = rw.position;
        }
    }
    *board = GroupedBoard::from_cards(cards);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, NewCard};

    fn board(todo: &[&str], doing: &[&str], done: &[&str]) -> (GroupedBoard, Vec<(String, Uuid)>) {
        let mut cards = Vec::new();
        let mut names = Vec::new();
        for (status, titles) in [
            (CardStatus::Todo, todo),
            (CardStatus::Doing, doing),
            (CardStatus::Done, done),
        ] {
            for (i, title) in titles.iter().enumerate() {
                let card = Card::new(
                    "u1",
                    status,
                    i as u32,
                    NewCard {
                        title: (*title).into(),
                        ..Default::default()
                    },
                );
                names.push(((*title).to_string(), card.id));
                cards.push(card);
            }
        }
        (GroupedBoard::from_cards(cards), names)
    }

    fn id(names: &[(String, Uuid)], title: &str) -> Uuid {
        names.iter().find(|(t, _)| t == title).unwrap().1
    }

    fn titles(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn cross_column_move_renumbers_both_columns() {
        let (mut b, names) = board(&["A", "B"], &[], &[]);
        let plan = plan_move(&b, id(&names, "A"), CardStatus::Doing, END).unwrap();
        assert_eq!(plan.status, CardStatus::Doing);
        assert_eq!(plan.position, 0);
        apply_plan(&mut b, &plan);
        assert_eq!(titles(&b.todo), vec!["B"]);
        assert_eq!(titles(&b.doing), vec!["A"]);
        b.assert_contiguous();
    }

    #[test]
    fn within_column_reorder() {
        let (mut b, names) = board(&["A", "B", "C"], &[], &[]);
        let plan = plan_move(&b, id(&names, "C"), CardStatus::Todo, 0).unwrap();
        apply_plan(&mut b, &plan);
        assert_eq!(titles(&b.todo), vec!["C", "A", "B"]);
        b.assert_contiguous();
    }

    #[test]
    fn noop_when_target_equals_current_slot() {
        let (b, names) = board(&["A", "B", "C"], &[], &[]);
        let plan = plan_move(&b, id(&names, "B"), CardStatus::Todo, 1).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn target_index_clamps_to_column_length() {
        let (mut b, names) = board(&["A"], &["X"], &[]);
        let plan = plan_move(&b, id(&names, "A"), CardStatus::Doing, 99).unwrap();
        assert_eq!(plan.position, 1);
        apply_plan(&mut b, &plan);
        assert_eq!(titles(&b.doing), vec!["X", "A"]);
        b.assert_contiguous();
    }

    #[test]
    fn insert_in_middle_preserves_relative_order() {
        let (mut b, names) = board(&["A"], &["X", "Y", "Z"], &[]);
        let plan = plan_move(&b, id(&names, "A"), CardStatus::Doing, 1).unwrap();
        apply_plan(&mut b, &plan);
        assert_eq!(titles(&b.doing), vec!["X", "A", "Y", "Z"]);
        assert!(b.todo.is_empty());
        b.assert_contiguous();
    }

    #[test]
    fn rewrites_touch_only_shifted_rows() {
        // Moving Z→index 0 of doing shifts X and Y; todo is untouched.
        let (b, names) = board(&["A", "B"], &["X", "Y", "Z"], &[]);
        let plan = plan_move(&b, id(&names, "Z"), CardStatus::Doing, 0).unwrap();
        let rewritten: Vec<Uuid> = plan.rewrites.iter().map(|r| r.id).collect();
        assert!(rewritten.contains(&id(&names, "Z")));
        assert!(!rewritten.contains(&id(&names, "A")));
        assert!(!rewritten.contains(&id(&names, "B")));
    }

    #[test]
    fn unknown_card_is_not_found() {
        let (b, _) = board(&["A"], &[], &[]);
        assert!(matches!(
            plan_move(&b, Uuid::new_v4(), CardStatus::Todo, 0),
            Err(BoardError::CardNotFound(_))
        ));
    }

    #[test]
    fn move_to_empty_column() {
        let (mut b, names) = board(&["A"], &[], &[]);
        let plan = plan_move(&b, id(&names, "A"), CardStatus::Done, 0).unwrap();
        apply_plan(&mut b, &plan);
        assert!(b.todo.is_empty());
        assert_eq!(titles(&b.done), vec!["A"]);
        b.assert_contiguous();
    }
}
