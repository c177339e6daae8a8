//! Optimistic update controller.
//!
//! The drag gesture must feel instantaneous while the server stays the
//! source of truth. Every move follows the same contract:
//!
//! 1. invalidate any board refresh already in flight (so a stale response
//!    can't overwrite the prediction),
//! 2. snapshot the board in full,
//! 3. apply the predicted post-move state locally,
//! 4. issue the one-request move,
//! 5. on failure, restore the snapshot exactly,
//! 6. on settle, refetch the authoritative board and replace the mirror —
//!    the prediction is never final truth.
//!
//! Mutations are serialized: gestures are queued and settled strictly one
//! at a time, so overlapping snapshots and rollbacks can't corrupt each
//! other.

use std::collections::VecDeque;

use minutes_core::board::{apply_plan, plan_move};
use minutes_core::card::GroupedBoard;
use minutes_core::types::CardStatus;
use uuid::Uuid;

use crate::api::BoardApi;
use crate::error::ClientError;

/// One drag gesture: card, target column, target index within it.
#[derive(Debug, Clone)]
pub struct MoveRequest {
    pub card_id: Uuid,
    pub status: CardStatus,
    pub index: usize,
}

/// How a settled move ended.
#[derive(Debug)]
pub enum MoveOutcome {
    /// Persisted; the mirror was replaced with the authoritative board.
    Applied { card_id: Uuid },
    /// The gesture didn't change anything; no request was issued.
    NoOp { card_id: Uuid },
    /// The request failed; the pre-move snapshot was restored.
    RolledBack { card_id: Uuid, error: ClientError },
}

/// Handle for an in-flight board refresh. A refresh completed with a stale
/// ticket is discarded — this is the "cancel pending refresh" step of the
/// move contract.
#[derive(Debug, Clone, Copy)]
pub struct RefreshTicket {
    generation: u64,
}

pub struct BoardController<A: BoardApi> {
    api: A,
    board: GroupedBoard,
    /// Bumped by every mutation; tickets from before the bump are stale.
    generation: u64,
    queue: VecDeque<MoveRequest>,
}

impl<A: BoardApi> BoardController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            board: GroupedBoard::default(),
            generation: 0,
            queue: VecDeque::new(),
        }
    }

    /// The locally rendered board. A mirror of server state, possibly ahead
    /// of it while a prediction is unsettled.
    pub fn board(&self) -> &GroupedBoard {
        &self.board
    }

    pub fn pending_moves(&self) -> usize {
        self.queue.len()
    }

    /// Start a refresh: the returned ticket must accompany the fetched
    /// board in [`Self::complete_refresh`].
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.generation,
        }
    }

    /// Install a fetched board unless a mutation invalidated the ticket.
    /// Returns whether the board was applied.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, board: GroupedBoard) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("discarding stale board refresh");
            return false;
        }
        self.board = board;
        true
    }

    /// Fetch and install the authoritative board.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let ticket = self.begin_refresh();
        let board = self.api.fetch_board().await?;
        self.complete_refresh(ticket, board);
        Ok(())
    }

    /// Record a drag gesture. Nothing is issued until [`Self::settle`];
    /// gestures queued while a move is unsettled keep their order.
    pub fn submit_move(&mut self, request: MoveRequest) {
        self.queue.push_back(request);
    }

    /// Settle all queued moves, strictly one at a time.
    pub async fn settle(&mut self) -> Vec<MoveOutcome> {
        let mut outcomes = Vec::new();
        while let Some(request) = self.queue.pop_front() {
            outcomes.push(self.settle_one(request).await);
        }
        outcomes
    }

    async fn settle_one(&mut self, request: MoveRequest) -> MoveOutcome {
        let plan = match plan_move(&self.board, request.card_id, request.status, request.index) {
            Ok(plan) => plan,
            Err(e) => {
                return MoveOutcome::RolledBack {
                    card_id: request.card_id,
                    error: e.into(),
                }
            }
        };
        if plan.is_noop() {
            return MoveOutcome::NoOp {
                card_id: request.card_id,
            };
        }

        // The board is about to mutate; any refresh in flight must not land
        // on top of the prediction.
        self.generation += 1;

        let snapshot = self.board.clone();
        apply_plan(&mut self.board, &plan);

        let result = self
            .api
            .move_card(request.card_id, plan.status, plan.position)
            .await;

        let outcome = match result {
            Ok(_) => MoveOutcome::Applied {
                card_id: request.card_id,
            },
            Err(error) => {
                tracing::warn!(card = %request.card_id, %error, "move failed; rolling back");
                self.board = snapshot;
                MoveOutcome::RolledBack {
                    card_id: request.card_id,
                    error,
                }
            }
        };

        // Success or failure, the server has the last word.
        let ticket = self.begin_refresh();
        match self.api.fetch_board().await {
            Ok(board) => {
                self.complete_refresh(ticket, board);
            }
            Err(error) => {
                tracing::warn!(%error, "post-settle refresh failed; keeping local state");
            }
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use minutes_core::card::{Card, NewCard};
    use minutes_core::extract::ExtractionBatch;
    use std::cell::{Cell, RefCell};

    /// In-memory stand-in for the server: applies moves with the same
    /// planner the real store uses, and can be told to fail.
    struct ScriptedApi {
        board: RefCell<GroupedBoard>,
        fail_next_move: Cell<bool>,
        fail_fetch: Cell<bool>,
        moves_seen: Cell<usize>,
    }

    impl ScriptedApi {
        fn new(board: GroupedBoard) -> Self {
            Self {
                board: RefCell::new(board),
                fail_next_move: Cell::new(false),
                fail_fetch: Cell::new(false),
                moves_seen: Cell::new(0),
            }
        }
    }

    impl BoardApi for ScriptedApi {
        async fn fetch_board(&self) -> Result<GroupedBoard> {
            if self.fail_fetch.get() {
                return Err(ClientError::Timeout);
            }
            Ok(self.board.borrow().clone())
        }

        async fn move_card(&self, id: Uuid, status: CardStatus, position: u32) -> Result<Card> {
            self.moves_seen.set(self.moves_seen.get() + 1);
            if self.fail_next_move.take() {
                return Err(ClientError::Api {
                    status: 409,
                    code: "CONFLICT".into(),
                    message: "try again".into(),
                });
            }
            let mut board = self.board.borrow_mut();
            let plan = plan_move(&board, id, status, position as usize)?;
            apply_plan(&mut board, &plan);
            Ok(board.find(id).unwrap().clone())
        }

        async fn bulk_create(&self, _note_id: Uuid, _items: Vec<NewCard>) -> Result<usize> {
            unimplemented!("not exercised by controller tests")
        }

        async fn extract(&self, _note_id: Uuid) -> Result<ExtractionBatch> {
            unimplemented!("not exercised by controller tests")
        }
    }

    fn board(todo: &[&str], doing: &[&str]) -> GroupedBoard {
        let mut cards = Vec::new();
        for (status, names) in [(CardStatus::Todo, todo), (CardStatus::Doing, doing)] {
            for (i, name) in names.iter().enumerate() {
                cards.push(Card::new(
                    "u1",
                    status,
                    i as u32,
                    NewCard {
                        title: (*name).into(),
                        ..Default::default()
                    },
                ));
            }
        }
        GroupedBoard::from_cards(cards)
    }

    fn titles(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.title.as_str()).collect()
    }

    fn card_id(board: &GroupedBoard, title: &str) -> Uuid {
        board
            .clone()
            .into_cards()
            .iter()
            .find(|c| c.title == title)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn successful_move_settles_to_server_state() {
        let initial = board(&["A", "B"], &[]);
        let a = card_id(&initial, "A");
        let mut ctl = BoardController::new(ScriptedApi::new(initial));
        ctl.refresh().await.unwrap();

        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Doing,
            index: 0,
        });
        let outcomes = ctl.settle().await;
        assert!(matches!(outcomes[0], MoveOutcome::Applied { .. }));
        assert_eq!(titles(&ctl.board().todo), vec!["B"]);
        assert_eq!(titles(&ctl.board().doing), vec!["A"]);
        ctl.board().assert_contiguous();
    }

    #[tokio::test]
    async fn failed_move_restores_the_snapshot() {
        // todo=[A,B], drag A to doing, server rejects.
        let initial = board(&["A", "B"], &[]);
        let a = card_id(&initial, "A");
        let api = ScriptedApi::new(initial);
        api.fail_next_move.set(true);
        let mut ctl = BoardController::new(api);
        ctl.refresh().await.unwrap();

        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Doing,
            index: 0,
        });
        let outcomes = ctl.settle().await;
        assert!(matches!(outcomes[0], MoveOutcome::RolledBack { .. }));
        assert_eq!(titles(&ctl.board().todo), vec!["A", "B"]);
        assert!(ctl.board().doing.is_empty());
    }

    #[tokio::test]
    async fn failed_move_with_failed_refetch_equals_snapshot_exactly() {
        let initial = board(&["A", "B"], &["X"]);
        let a = card_id(&initial, "A");
        let api = ScriptedApi::new(initial);
        api.fail_next_move.set(true);
        let mut ctl = BoardController::new(api);
        ctl.refresh().await.unwrap();
        let before: Vec<Uuid> = ctl.board().clone().into_cards().iter().map(|c| c.id).collect();

        // Settle refetch fails too: the rollback must stand on its own.
        ctl.api.fail_fetch.set(true);
        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Doing,
            index: 1,
        });
        ctl.settle().await;

        let after: Vec<Uuid> = ctl.board().clone().into_cards().iter().map(|c| c.id).collect();
        assert_eq!(before, after);
        ctl.board().assert_contiguous();
    }

    #[tokio::test]
    async fn queued_moves_settle_in_submission_order() {
        let initial = board(&["A", "B", "C"], &[]);
        let a = card_id(&initial, "A");
        let b = card_id(&initial, "B");
        let mut ctl = BoardController::new(ScriptedApi::new(initial));
        ctl.refresh().await.unwrap();

        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Doing,
            index: 0,
        });
        ctl.submit_move(MoveRequest {
            card_id: b,
            status: CardStatus::Doing,
            index: 0,
        });
        assert_eq!(ctl.pending_moves(), 2);

        let outcomes = ctl.settle().await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(ctl.api.moves_seen.get(), 2);
        assert_eq!(titles(&ctl.board().doing), vec!["B", "A"]);
        assert_eq!(titles(&ctl.board().todo), vec!["C"]);
    }

    #[tokio::test]
    async fn noop_gesture_issues_no_request() {
        let initial = board(&["A", "B"], &[]);
        let a = card_id(&initial, "A");
        let mut ctl = BoardController::new(ScriptedApi::new(initial));
        ctl.refresh().await.unwrap();

        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Todo,
            index: 0,
        });
        let outcomes = ctl.settle().await;
        assert!(matches!(outcomes[0], MoveOutcome::NoOp { .. }));
        assert_eq!(ctl.api.moves_seen.get(), 0);
    }

    #[tokio::test]
    async fn stale_refresh_cannot_overwrite_a_settled_move() {
        let initial = board(&["A", "B"], &[]);
        let a = card_id(&initial, "A");
        let mut ctl = BoardController::new(ScriptedApi::new(initial.clone()));
        ctl.refresh().await.unwrap();

        // A refresh goes out, then a move settles before it returns.
        let stale_ticket = ctl.begin_refresh();
        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Doing,
            index: 0,
        });
        ctl.settle().await;

        // The late response carries the pre-move board; it must be dropped.
        let applied = ctl.complete_refresh(stale_ticket, initial);
        assert!(!applied);
        assert_eq!(titles(&ctl.board().doing), vec!["A"]);
    }

    #[tokio::test]
    async fn noop_gesture_does_not_cancel_a_pending_refresh() {
        let initial = board(&["A", "B"], &[]);
        let a = card_id(&initial, "A");
        let mut ctl = BoardController::new(ScriptedApi::new(initial.clone()));
        ctl.refresh().await.unwrap();

        // A refresh goes out; a gesture that changes nothing settles before
        // it returns. The refresh is still current and must be applied.
        let ticket = ctl.begin_refresh();
        ctl.submit_move(MoveRequest {
            card_id: a,
            status: CardStatus::Todo,
            index: 0,
        });
        let outcomes = ctl.settle().await;
        assert!(matches!(outcomes[0], MoveOutcome::NoOp { .. }));

        assert!(ctl.complete_refresh(ticket, initial));
        assert_eq!(titles(&ctl.board().todo), vec!["A", "B"]);
    }
}
