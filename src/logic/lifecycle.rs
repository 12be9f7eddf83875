//! Tournament state machine: DRAFT -> OPEN -> IN_PROGRESS -> COMPLETED, CANCELLED from any live state.

use crate::error::{TournamentError, TournamentResult};
use crate::models::{GameMatch, ModalityId, TournamentId, TournamentStatus};
use crate::store::Store;

/// Whether `from -> to` is listed in the transition table (preconditions aside).
pub fn is_listed_transition(from: TournamentStatus, to: TournamentStatus) -> bool {
    use TournamentStatus::*;
    matches!(
        (from, to),
        (Draft, Open)
            | (Open, InProgress)
            | (InProgress, Completed)
            | (Draft, Cancelled)
            | (Open, Cancelled)
            | (InProgress, Cancelled)
    )
}

/// Move the tournament to `to`, checking the table and the transition's precondition.
pub fn transition(
    store: &mut Store,
    tournament_id: TournamentId,
    to: TournamentStatus,
) -> TournamentResult<TournamentStatus> {
    let from = store.tournament(tournament_id)?.status;
    let illegal = |reason: &str| TournamentError::IllegalTransition {
        from,
        to,
        reason: reason.to_string(),
    };

    if !is_listed_transition(from, to) {
        return Err(illegal("transition not permitted"));
    }

    match to {
        TournamentStatus::Open => {
            if store.modalities_of(tournament_id).next().is_none() {
                return Err(illegal("no modality configured"));
            }
        }
        TournamentStatus::InProgress => {
            let has_structure = store.modalities_of(tournament_id).any(|m| {
                !store.groups_of(m.id).is_empty() || store.matches_of_modality(m.id).next().is_some()
            });
            if !has_structure {
                return Err(illegal("no groups or bracket generated"));
            }
        }
        TournamentStatus::Completed => {
            if !is_completable(store, tournament_id) {
                return Err(illegal("not every modality with entrants has a decided final"));
            }
        }
        TournamentStatus::Cancelled | TournamentStatus::Draft => {}
    }

    store.tournament_mut(tournament_id)?.status = to;
    Ok(from)
}

/// Fail with `InvalidState` unless the tournament is in one of `allowed`.
pub fn ensure_status(
    store: &Store,
    tournament_id: TournamentId,
    allowed: &[TournamentStatus],
    action: &str,
) -> TournamentResult<()> {
    let status = store.tournament(tournament_id)?.status;
    if allowed.contains(&status) {
        Ok(())
    } else {
        Err(TournamentError::InvalidState {
            status,
            action: action.to_string(),
        })
    }
}

/// The single match of a modality's highest round, if the top round has exactly one match.
pub fn final_match(store: &Store, modality_id: ModalityId) -> Option<&GameMatch> {
    let top = store
        .matches_of_modality(modality_id)
        .map(|m| m.round_order)
        .max()?;
    let mut top_round = store
        .matches_of_modality(modality_id)
        .filter(|m| m.round_order == top);
    match (top_round.next(), top_round.next()) {
        (Some(m), None) => Some(m),
        _ => None,
    }
}

/// Every modality with entrants has a decided final, and at least one final was played.
///
/// Only a modality with neither matches nor eligible registrations is skipped.
pub fn is_completable(store: &Store, tournament_id: TournamentId) -> bool {
    let mut played_any = false;
    for modality in store.modalities_of(tournament_id) {
        let has_matches = store.matches_of_modality(modality.id).next().is_some();
        let has_entrants = store
            .registrations_of(modality.id)
            .any(|r| r.is_eligible());
        if !has_matches && !has_entrants {
            continue;
        }
        match final_match(store, modality.id) {
            Some(m) if m.is_decided() => played_any = true,
            _ => return false,
        }
    }
    played_any
}

/// Remove a tournament and everything hanging off it. Only allowed in Draft.
pub fn delete_tournament(store: &mut Store, tournament_id: TournamentId) -> TournamentResult<()> {
    ensure_status(store, tournament_id, &[TournamentStatus::Draft], "delete tournament")?;

    let modality_ids: Vec<ModalityId> = store.modalities_of(tournament_id).map(|m| m.id).collect();
    let court_ids: Vec<_> = store.courts_of(tournament_id).map(|c| c.id).collect();
    let group_ids: Vec<_> = store
        .groups
        .iter()
        .filter(|g| modality_ids.contains(&g.modality_id))
        .map(|g| g.id)
        .collect();

    store.placements.retain(|p| !group_ids.contains(&p.group_id));
    store.groups.retain(|g| !modality_ids.contains(&g.modality_id));
    store.matches.retain(|m| !modality_ids.contains(&m.modality_id));
    store.registrations.retain(|r| !modality_ids.contains(&r.modality_id));
    store.slots.retain(|s| !court_ids.contains(&s.court_id));
    store.courts.retain(|c| c.tournament_id != tournament_id);
    store.modalities.retain(|m| m.tournament_id != tournament_id);
    store.tournaments.retain(|t| t.id != tournament_id);
    Ok(())
}
