//! Courts, their availability windows, and the bookable slots derived from them.

use crate::models::game::MatchId;
use crate::models::tournament::TournamentId;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// Unique identifier for a match slot.
pub type SlotId = Uuid;

/// Which days an availability window applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every occurrence of this weekday inside the tournament span.
    Weekly { weekday: Weekday },
    /// One specific calendar date.
    Date { date: NaiveDate },
}

/// A window of time during which a court can host matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtAvailability {
    pub recurrence: Recurrence,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CourtAvailability {
    pub fn weekly(weekday: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            recurrence: Recurrence::Weekly { weekday },
            start_time,
            end_time,
        }
    }

    pub fn on_date(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            recurrence: Recurrence::Date { date },
            start_time,
            end_time,
        }
    }

    /// Whether this window applies on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self.recurrence {
            Recurrence::Weekly { weekday } => date.weekday() == weekday,
            Recurrence::Date { date: d } => d == date,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub indoor: bool,
    pub availability: Vec<CourtAvailability>,
}

impl Court {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        indoor: bool,
        availability: Vec<CourtAvailability>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            indoor,
            availability,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    #[default]
    Available,
    /// Taken out of use by the organizer.
    Blocked,
    /// Held outside of the allocator (e.g. by an admin tool).
    Reserved,
    /// Occupied by exactly one match.
    Assigned,
}

/// A discrete bookable interval on one court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSlot {
    pub id: SlotId,
    pub court_id: CourtId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
    /// Set iff status is Assigned.
    pub match_id: Option<MatchId>,
}

impl MatchSlot {
    pub fn new(court_id: CourtId, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            court_id,
            date,
            start_time,
            end_time,
            status: SlotStatus::Available,
            match_id: None,
        }
    }

    /// Same day and the half-open intervals intersect.
    pub fn overlaps(&self, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> bool {
        self.date == date && self.start_time < end_time && start_time < self.end_time
    }

    /// Whether the slot currently holds a court booking (assigned or reserved).
    pub fn is_occupied(&self) -> bool {
        matches!(self.status, SlotStatus::Assigned | SlotStatus::Reserved)
    }
}
