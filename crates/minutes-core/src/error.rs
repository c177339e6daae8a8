use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BoardError {
    /// Returned both for cards that don't exist and for cards owned by a
    /// different user, so a caller can't distinguish the two.
    #[error("action item not found: {0}")]
    CardNotFound(Uuid),

    #[error("meeting note not found: {0}")]
    NoteNotFound(Uuid),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("invalid status '{0}': expected todo, doing, or done")]
    InvalidStatus(String),

    #[error("invalid priority '{0}': expected high, medium, or low")]
    InvalidPriority(String),

    #[error("invalid due date '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidDueDate(String),

    #[error("no items selected")]
    NothingSelected,

    #[error("position write could not be applied atomically: {0}")]
    PersistenceConflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;
