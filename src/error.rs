//! Error taxonomy shared by every scheduling and bracket operation.

use crate::models::TournamentStatus;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
///
/// Every variant renders a human-readable reason; [`TournamentError::kind`]
/// gives the stable machine name callers serialize next to it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TournamentError {
    /// Missing or malformed prerequisite data (no courts, no availability, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("already generated: {0}")]
    AlreadyGenerated(String),

    #[error("already scheduled: {0}")]
    AlreadyScheduled(String),

    #[error("insufficient teams: need at least {needed}, found {found}")]
    InsufficientTeams { needed: usize, found: usize },

    #[error("inconsistent qualification rule: {0}")]
    OddQualificationCount(String),

    #[error("no slots available: {0}")]
    NoSlotsAvailable(String),

    #[error("illegal transition from {from} to {to}: {reason}")]
    IllegalTransition {
        from: TournamentStatus,
        to: TournamentStatus,
        reason: String,
    },

    /// Operation is not permitted while the tournament is in `status`.
    #[error("cannot {action} while tournament is {status}")]
    InvalidState {
        status: TournamentStatus,
        action: String,
    },

    #[error("advancement conflict: {0}")]
    AdvancementConflict(String),

    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// Optimistic commit lost the race `attempts` times in a row.
    #[error("concurrent modification: gave up after {attempts} attempts")]
    TransactionConflict { attempts: u32 },

    #[error("storage error: {0}")]
    Storage(String),
}

impl TournamentError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        TournamentError::NotFound { entity, id }
    }

    /// Stable name of the error kind (used by the HTTP layer).
    pub fn kind(&self) -> &'static str {
        match self {
            TournamentError::InvalidConfiguration(_) => "InvalidConfiguration",
            TournamentError::AlreadyGenerated(_) => "AlreadyGenerated",
            TournamentError::AlreadyScheduled(_) => "AlreadyScheduled",
            TournamentError::InsufficientTeams { .. } => "InsufficientTeams",
            TournamentError::OddQualificationCount(_) => "OddQualificationCount",
            TournamentError::NoSlotsAvailable(_) => "NoSlotsAvailable",
            TournamentError::IllegalTransition { .. } => "IllegalTransition",
            TournamentError::InvalidState { .. } => "InvalidState",
            TournamentError::AdvancementConflict(_) => "AdvancementConflict",
            TournamentError::InvalidResult(_) => "InvalidResult",
            TournamentError::NotFound { .. } => "NotFound",
            TournamentError::TransactionConflict { .. } => "TransactionConflict",
            TournamentError::Storage(_) => "Storage",
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;
