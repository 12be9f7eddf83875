//! Schedule allocation: materialize round-robin matches and greedily place matches onto slots.

use crate::error::{TournamentError, TournamentResult};
use crate::logic::lifecycle::ensure_status;
use crate::models::{
    CourtId, GameMatch, GroupId, MatchId, MatchSlot, ModalityId, RegistrationId, SlotId,
    SlotStatus, TournamentId, TournamentStatus,
};
use crate::store::Store;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of an allocation run. Unscheduled matches are a shortfall, not an error.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScheduleReport {
    /// Round-robin matches created by this run.
    pub created_matches: usize,
    pub scheduled: usize,
    pub unscheduled: usize,
    pub unscheduled_match_ids: Vec<MatchId>,
}

/// Every unordered pair of `n` entries, in generation order: (0,1), (0,2), ..., (n-2,n-1).
pub fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Create the round-robin matches of a group unless it already has some.
pub fn materialize_round_robin(store: &mut Store, group_id: GroupId) -> TournamentResult<usize> {
    if store.matches_of_group(group_id).next().is_some() {
        return Ok(0);
    }
    let group = store.group(group_id)?.clone();
    let teams: Vec<RegistrationId> = store
        .placements_of(group_id)
        .iter()
        .map(|p| p.registration_id)
        .collect();
    let pairs = round_robin_pairs(teams.len());
    for (order, (i, j)) in pairs.iter().enumerate() {
        store.matches.push(GameMatch::group_stage(
            group.modality_id,
            group.id,
            group.name.clone(),
            order as u32 + 1,
            teams[*i],
            teams[*j],
        ));
    }
    Ok(pairs.len())
}

type Interval = (NaiveDate, NaiveTime, NaiveTime);

fn interval(slot: &MatchSlot) -> Interval {
    (slot.date, slot.start_time, slot.end_time)
}

fn clashes(busy: &[Interval], slot: &MatchSlot) -> bool {
    busy.iter().any(|&(d, s, e)| slot.overlaps(d, s, e))
}

/// Materialize group matches for the whole tournament, then assign every
/// schedulable match to the earliest feasible slot.
pub fn allocate_schedule(store: &mut Store, tournament_id: TournamentId) -> TournamentResult<ScheduleReport> {
    ensure_status(
        store,
        tournament_id,
        &[TournamentStatus::Open, TournamentStatus::InProgress],
        "allocate schedule",
    )?;
    let end_date = store.tournament(tournament_id)?.end_date;

    let court_order: Vec<CourtId> = store.courts_of(tournament_id).map(|c| c.id).collect();
    let mut slot_ids: Vec<SlotId> = store
        .slots
        .iter()
        .filter(|s| court_order.contains(&s.court_id))
        .map(|s| s.id)
        .collect();
    if slot_ids.is_empty() {
        return Err(TournamentError::NoSlotsAvailable(
            "tournament has no match slots; generate slots first".to_string(),
        ));
    }

    let mut report = ScheduleReport::default();
    let modality_ids: Vec<_> = store.modalities_of(tournament_id).map(|m| m.id).collect();
    for &modality_id in &modality_ids {
        let group_ids: Vec<GroupId> = store.groups_of(modality_id).iter().map(|g| g.id).collect();
        for group_id in group_ids {
            report.created_matches += materialize_round_robin(store, group_id)?;
        }
    }

    let court_rank = |court_id: CourtId| court_order.iter().position(|c| *c == court_id);
    {
        let slots: HashMap<SlotId, &MatchSlot> = store.slots.iter().map(|s| (s.id, s)).collect();
        slot_ids.sort_by_key(|id| {
            let s = slots[id];
            (s.date, s.start_time, court_rank(s.court_id))
        });
    }

    let candidates = candidate_matches(store, &modality_ids);

    // Busy intervals per team, seeded with matches already sitting in slots.
    let mut team_busy: HashMap<RegistrationId, Vec<Interval>> = HashMap::new();
    for m in store.matches.iter().filter(|m| modality_ids.contains(&m.modality_id)) {
        let Some(slot_id) = m.slot_id else { continue };
        let iv = interval(store.slot(slot_id)?);
        for team in [m.team_a, m.team_b].into_iter().flatten() {
            team_busy.entry(team).or_default().push(iv);
        }
    }

    for match_id in candidates {
        let (team_a, team_b) = {
            let m = store.game(match_id)?;
            (m.team_a, m.team_b)
        };
        let teams: Vec<RegistrationId> = [team_a, team_b].into_iter().flatten().collect();

        let chosen = slot_ids.iter().copied().find(|id| {
            let Ok(slot) = store.slot(*id) else { return false };
            slot.status == SlotStatus::Available
                && slot.date <= end_date
                && !teams
                    .iter()
                    .any(|t| team_busy.get(t).is_some_and(|busy| clashes(busy, slot)))
                && !court_booked(store, slot)
        });

        match chosen {
            Some(slot_id) => {
                store.claim_slot(slot_id, match_id)?;
                store.game_mut(match_id)?.slot_id = Some(slot_id);
                let iv = interval(store.slot(slot_id)?);
                for team in &teams {
                    team_busy.entry(*team).or_default().push(iv);
                }
                log::debug!("match {match_id} -> slot {slot_id}");
                report.scheduled += 1;
            }
            None => {
                report.unscheduled += 1;
                report.unscheduled_match_ids.push(match_id);
            }
        }
    }

    if report.unscheduled > 0 {
        log::warn!(
            "tournament {tournament_id}: {} match(es) could not be scheduled",
            report.unscheduled
        );
    }
    Ok(report)
}

/// Another occupied slot on the same court overlaps this one.
fn court_booked(store: &Store, slot: &MatchSlot) -> bool {
    store.slots_of_court(slot.court_id).any(|other| {
        other.id != slot.id
            && other.is_occupied()
            && other.overlaps(slot.date, slot.start_time, slot.end_time)
    })
}

/// Unscheduled, undecided matches with both teams known: group matches by
/// (modality, group order, generation order), then knockout matches by
/// (modality, round order, match order).
fn candidate_matches(store: &Store, modality_ids: &[ModalityId]) -> Vec<MatchId> {
    let mut out = Vec::new();
    for &modality_id in modality_ids {
        for group in store.groups_of(modality_id) {
            out.extend(
                store
                    .matches_of_group(group.id)
                    .filter(|m| m.is_schedulable())
                    .map(|m| m.id),
            );
        }
        let mut knockout: Vec<&GameMatch> = store
            .matches_of_modality(modality_id)
            .filter(|m| m.is_knockout() && m.is_schedulable())
            .collect();
        knockout.sort_by_key(|m| (m.round_order, m.match_order));
        out.extend(knockout.into_iter().map(|m| m.id));
    }
    out
}

/// Take an undecided match off its slot and return the slot to the pool.
pub fn unassign_match(store: &mut Store, match_id: MatchId) -> TournamentResult<Option<SlotId>> {
    let m = store.game(match_id)?;
    if m.is_decided() {
        return Err(TournamentError::AlreadyScheduled(
            "match already played".to_string(),
        ));
    }
    let Some(slot_id) = m.slot_id else {
        return Ok(None);
    };
    store.release_slot(slot_id)?;
    store.game_mut(match_id)?.slot_id = None;
    Ok(Some(slot_id))
}
