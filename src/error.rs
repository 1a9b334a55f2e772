use thiserror::Error;

/// Errors raised by the battle core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// A template names a type outside the supported set.
    #[error("invalid type: {0}")]
    InvalidType(String),
    /// A template violates the catalog schema.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    /// No template with this name exists in the catalog.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    /// A move was applied with no uses left. The caller must gate on
    /// [`Move::can_use`](crate::model::Move::can_use) first.
    #[error("illegal state: {0}")]
    IllegalState(String),
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
}

/// Reasons a submitted move is rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("move index {index} is out of range (combatant knows {len} moves)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{name} has no PP left")]
    NoUsesLeft { name: String },
    #[error("no battle is in progress")]
    NoBattleInProgress,
}

pub type BattleResult<T> = Result<T, BattleError>;
