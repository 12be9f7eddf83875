//! Match (game), Side, scores and the group/knockout phase tag.

use crate::models::court::SlotId;
use crate::models::group::GroupId;
use crate::models::registration::RegistrationId;
use crate::models::tournament::ModalityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two team seats of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    TeamA,
    TeamB,
}

/// Games won by each team in one set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    pub set_a: u32,
    pub set_b: u32,
}

impl SetScore {
    pub fn new(set_a: u32, set_b: u32) -> Self {
        Self { set_a, set_b }
    }

    /// Which side took the set; None for a level entry.
    pub fn taken_by(&self) -> Option<Side> {
        use std::cmp::Ordering::*;
        match self.set_a.cmp(&self.set_b) {
            Greater => Some(Side::TeamA),
            Less => Some(Side::TeamB),
            Equal => None,
        }
    }
}

/// Where the winner of a knockout match goes next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NextMatch {
    pub match_id: MatchId,
    pub side: Side,
}

/// Phase of the tournament this match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    /// Round-robin match; results feed the group standings.
    GroupStage { group_id: GroupId },
    /// Bracket match; `next` is None for the final.
    Knockout { next: Option<NextMatch> },
}

/// A single match between two registrations (either may still be unknown).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub modality_id: ModalityId,
    pub phase: MatchPhase,
    pub round_name: String,
    /// Ascending toward the final.
    pub round_order: u32,
    pub match_order: u32,
    /// None while still to be decided by an earlier match.
    pub team_a: Option<RegistrationId>,
    pub team_b: Option<RegistrationId>,
    /// None if not yet played.
    pub winner: Option<Side>,
    pub scores: Vec<SetScore>,
    pub slot_id: Option<SlotId>,
    pub played_at: Option<DateTime<Utc>>,
    /// Resolved at generation time because one seat had no opponent.
    pub bye: bool,
}

impl GameMatch {
    /// Round-robin match between two placed teams.
    pub fn group_stage(
        modality_id: ModalityId,
        group_id: GroupId,
        round_name: impl Into<String>,
        match_order: u32,
        team_a: RegistrationId,
        team_b: RegistrationId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality_id,
            phase: MatchPhase::GroupStage { group_id },
            round_name: round_name.into(),
            round_order: 1,
            match_order,
            team_a: Some(team_a),
            team_b: Some(team_b),
            winner: None,
            scores: Vec::new(),
            slot_id: None,
            played_at: None,
            bye: false,
        }
    }

    /// Empty bracket match with a pre-allocated id (so earlier rounds can link to it).
    pub fn knockout(
        id: MatchId,
        modality_id: ModalityId,
        round_name: impl Into<String>,
        round_order: u32,
        match_order: u32,
        next: Option<NextMatch>,
    ) -> Self {
        Self {
            id,
            modality_id,
            phase: MatchPhase::Knockout { next },
            round_name: round_name.into(),
            round_order,
            match_order,
            team_a: None,
            team_b: None,
            winner: None,
            scores: Vec::new(),
            slot_id: None,
            played_at: None,
            bye: false,
        }
    }

    pub fn next_match(&self) -> Option<NextMatch> {
        match self.phase {
            MatchPhase::Knockout { next } => next,
            MatchPhase::GroupStage { .. } => None,
        }
    }

    pub fn team(&self, side: Side) -> Option<RegistrationId> {
        match side {
            Side::TeamA => self.team_a,
            Side::TeamB => self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Option<RegistrationId> {
        match side {
            Side::TeamA => &mut self.team_a,
            Side::TeamB => &mut self.team_b,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn has_both_teams(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    /// Both teams known, not played, and not yet bound to a slot.
    pub fn is_schedulable(&self) -> bool {
        self.has_both_teams() && !self.is_decided() && self.slot_id.is_none()
    }

    pub fn winning_team(&self) -> Option<RegistrationId> {
        self.winner.and_then(|side| self.team(side))
    }

    pub fn involves(&self, registration_id: RegistrationId) -> bool {
        self.team_a == Some(registration_id) || self.team_b == Some(registration_id)
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self.phase {
            MatchPhase::GroupStage { group_id } => Some(group_id),
            MatchPhase::Knockout { .. } => None,
        }
    }

    pub fn is_knockout(&self) -> bool {
        matches!(self.phase, MatchPhase::Knockout { .. })
    }
}
