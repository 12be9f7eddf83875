//! Recording a match result and dispatching it to standings or advancement.

use crate::error::{TournamentError, TournamentResult};
use crate::logic::advancement::{advance_winner, Advancement};
use crate::logic::lifecycle::{ensure_status, is_completable};
use crate::logic::standings::{group_standings, Standing};
use crate::models::{GroupId, MatchId, MatchPhase, SetScore, Side, TournamentStatus};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most sets a result may list.
pub const MAX_SETS: usize = 5;

/// Score payload. The winner is taken as given, so walkovers and
/// retirements may disagree with the set tally.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub scores: Vec<SetScore>,
    pub winner: Side,
}

impl ResultPayload {
    pub fn validate(&self) -> TournamentResult<()> {
        if self.scores.is_empty() || self.scores.len() > MAX_SETS {
            return Err(TournamentError::InvalidResult(format!(
                "expected 1 to {MAX_SETS} sets, got {}",
                self.scores.len()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Group {
        group_id: GroupId,
        standings: Vec<Standing>,
    },
    Knockout { advancement: Advancement },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResultOutcome {
    pub match_id: MatchId,
    /// False when the same winner had already been recorded.
    pub recorded: bool,
    pub outcome: PhaseOutcome,
    /// Every modality now has a decided final; ranking updates can run.
    pub tournament_completable: bool,
}

/// Store a result and run the phase-specific follow-up in the same transaction.
pub fn record_result(
    store: &mut Store,
    match_id: MatchId,
    payload: &ResultPayload,
    now: DateTime<Utc>,
) -> TournamentResult<ResultOutcome> {
    payload.validate()?;
    let m = store.game(match_id)?;
    let tournament_id = store.tournament_of_modality(m.modality_id)?.id;
    ensure_status(store, tournament_id, &[TournamentStatus::InProgress], "record results")?;

    let m = store.game(match_id)?;
    if !m.has_both_teams() {
        return Err(TournamentError::InvalidResult(format!(
            "match {match_id} does not have both teams yet"
        )));
    }
    let recorded = match m.winner {
        None => true,
        Some(previous) if previous == payload.winner => false,
        Some(previous) => {
            return Err(TournamentError::AdvancementConflict(format!(
                "match {match_id} already won by {previous:?}"
            )))
        }
    };
    let phase = m.phase;

    if recorded {
        let m = store.game_mut(match_id)?;
        m.winner = Some(payload.winner);
        m.scores = payload.scores.clone();
        m.played_at = Some(now);
    }

    let outcome = match phase {
        MatchPhase::GroupStage { group_id } => PhaseOutcome::Group {
            group_id,
            standings: group_standings(store, group_id)?,
        },
        MatchPhase::Knockout { .. } => PhaseOutcome::Knockout {
            advancement: advance_winner(store, match_id)?,
        },
    };

    Ok(ResultOutcome {
        match_id,
        recorded,
        outcome,
        tournament_completable: is_completable(store, tournament_id),
    })
}
