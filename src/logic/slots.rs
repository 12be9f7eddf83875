//! Court & slot generation: expand availability windows into bookable match slots.

use crate::config::SchedulingConfig;
use crate::error::{TournamentError, TournamentResult};
use crate::logic::lifecycle::ensure_status;
use crate::models::{CourtId, MatchSlot, SlotId, SlotStatus, TournamentId, TournamentStatus};
use crate::store::Store;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

const LIVE: &[TournamentStatus] = &[
    TournamentStatus::Draft,
    TournamentStatus::Open,
    TournamentStatus::InProgress,
];

/// Outcome of a slot generation run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SlotReport {
    pub courts: usize,
    /// Slots created by this run.
    pub created: usize,
    /// Slots that already existed for the same (court, date, start) and were left alone.
    pub existing: usize,
}

/// Slice `[start, end)` into back-to-back intervals of `duration` minutes.
///
/// A trailing remainder becomes a shorter interval only if it lasts at least
/// `min_minutes`; anything shorter is dropped.
pub fn slice_window(
    start: NaiveTime,
    end: NaiveTime,
    duration_minutes: u32,
    min_minutes: u32,
) -> Vec<(NaiveTime, NaiveTime)> {
    let duration = Duration::minutes(i64::from(duration_minutes));
    let minimum = Duration::minutes(i64::from(min_minutes.max(1)));
    let mut out = Vec::new();
    if duration <= Duration::zero() {
        return out;
    }
    let mut cursor = start;
    while cursor < end {
        let remaining = end - cursor;
        if remaining >= duration {
            let next = cursor + duration;
            out.push((cursor, next));
            cursor = next;
        } else {
            if remaining >= minimum {
                out.push((cursor, end));
            }
            break;
        }
    }
    out
}

/// Generate slots for every court of the tournament. Additive only.
pub fn generate_slots(
    store: &mut Store,
    tournament_id: TournamentId,
    config: &SchedulingConfig,
) -> TournamentResult<SlotReport> {
    ensure_status(store, tournament_id, LIVE, "generate slots")?;
    let court_ids: Vec<CourtId> = store.courts_of(tournament_id).map(|c| c.id).collect();
    if court_ids.is_empty() {
        return Err(TournamentError::InvalidConfiguration(
            "tournament has no courts".to_string(),
        ));
    }

    let mut report = SlotReport::default();
    for court_id in court_ids {
        let r = expand_court(store, court_id, config)?;
        report.courts += 1;
        report.created += r.created;
        report.existing += r.existing;
    }
    Ok(report)
}

/// Generate slots for a single court (e.g. one added after scheduling already ran elsewhere).
pub fn generate_court_slots(
    store: &mut Store,
    court_id: CourtId,
    config: &SchedulingConfig,
) -> TournamentResult<SlotReport> {
    let tournament_id = store.court(court_id)?.tournament_id;
    ensure_status(store, tournament_id, LIVE, "generate slots")?;
    expand_court(store, court_id, config)
}

fn expand_court(
    store: &mut Store,
    court_id: CourtId,
    config: &SchedulingConfig,
) -> TournamentResult<SlotReport> {
    let court = store.court(court_id)?.clone();
    let tournament = store.tournament(court.tournament_id)?;
    let (first_day, last_day) = (tournament.start_date, tournament.end_date);

    if court.availability.is_empty() {
        return Err(TournamentError::InvalidConfiguration(format!(
            "court '{}' has no availability windows",
            court.name
        )));
    }
    if let Some(w) = court.availability.iter().find(|w| w.end_time <= w.start_time) {
        return Err(TournamentError::InvalidConfiguration(format!(
            "court '{}' has a window ending at {} before it starts at {}",
            court.name, w.end_time, w.start_time
        )));
    }
    if store
        .slots_of_court(court_id)
        .any(|s| s.status == SlotStatus::Assigned)
    {
        return Err(TournamentError::AlreadyScheduled(format!(
            "court '{}' already has matches assigned to its slots",
            court.name
        )));
    }

    let mut report = SlotReport {
        courts: 1,
        ..SlotReport::default()
    };
    let mut day = first_day;
    loop {
        for window in court.availability.iter().filter(|w| w.applies_on(day)) {
            let intervals = slice_window(
                window.start_time,
                window.end_time,
                config.match_duration_minutes,
                config.min_slot_minutes,
            );
            for (start, end) in intervals {
                if slot_exists(store, court_id, day, start) {
                    report.existing += 1;
                } else {
                    store.slots.push(MatchSlot::new(court_id, day, start, end));
                    report.created += 1;
                }
            }
        }
        match next_day(day, last_day) {
            Some(d) => day = d,
            None => break,
        }
    }
    log::debug!(
        "court '{}': {} slot(s) created, {} already present",
        court.name,
        report.created,
        report.existing
    );
    Ok(report)
}

fn slot_exists(store: &Store, court_id: CourtId, date: NaiveDate, start: NaiveTime) -> bool {
    store
        .slots_of_court(court_id)
        .any(|s| s.date == date && s.start_time == start)
}

fn next_day(day: NaiveDate, last_day: NaiveDate) -> Option<NaiveDate> {
    day.succ_opt().filter(|d| *d <= last_day)
}

/// Toggle a slot between Available and Blocked. Assigned and Reserved slots refuse.
pub fn set_slot_blocked(store: &mut Store, slot_id: SlotId, blocked: bool) -> TournamentResult<SlotStatus> {
    let court_id = store.slot(slot_id)?.court_id;
    let tournament_id = store.court(court_id)?.tournament_id;
    ensure_status(store, tournament_id, LIVE, "change slot availability")?;
    let slot = store.slot_mut(slot_id)?;
    let (expected, target) = if blocked {
        (SlotStatus::Available, SlotStatus::Blocked)
    } else {
        (SlotStatus::Blocked, SlotStatus::Available)
    };
    if slot.status == target {
        return Ok(target);
    }
    if slot.status != expected {
        return Err(TournamentError::AlreadyScheduled(format!(
            "slot {slot_id} is {:?} and cannot become {target:?}",
            slot.status
        )));
    }
    slot.status = target;
    Ok(target)
}
