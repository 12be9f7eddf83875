//! Tournament, TournamentStatus and Modality.

use crate::error::{TournamentError, TournamentResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Unique identifier for a modality (discipline + category) within a tournament.
pub type ModalityId = Uuid;

/// Club that owns a tournament.
pub type ClubId = Uuid;

/// Lifecycle status of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Being configured by the club; the only state where it can be deleted.
    #[default]
    Draft,
    /// Registration is open.
    Open,
    /// Registration closed; matches are being played.
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::Open => "OPEN",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// A tournament owned by a club. Modalities, courts and matches reference it by id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub club_id: ClubId,
    pub name: String,
    pub status: TournamentStatus,
    /// First playing day (inclusive).
    pub start_date: NaiveDate,
    /// Last playing day (inclusive).
    pub end_date: NaiveDate,
}

impl Tournament {
    /// Create a new tournament in Draft. Fails if the date span is inverted.
    pub fn new(
        club_id: ClubId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> TournamentResult<Self> {
        if end_date < start_date {
            return Err(TournamentError::InvalidConfiguration(format!(
                "end date {end_date} is before start date {start_date}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            club_id,
            name: name.into(),
            status: TournamentStatus::Draft,
            start_date,
            end_date,
        })
    }
}

/// A (discipline, category) pairing inside a tournament, e.g. VARONIL / 4ta.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Modality {
    pub id: ModalityId,
    pub tournament_id: TournamentId,
    pub discipline: String,
    pub category: String,
    /// Optional cap on registered pairs.
    pub max_pairs: Option<u32>,
}

impl Modality {
    pub fn new(
        tournament_id: TournamentId,
        discipline: impl Into<String>,
        category: impl Into<String>,
        max_pairs: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            discipline: discipline.into(),
            category: category.into(),
            max_pairs,
        }
    }
}
