//! Integration tests for round-robin materialization and slot allocation.

mod common;

use chrono::Weekday;
use common::{assert_no_double_booking, time, Fixture};
use padel_scheduler::logic::{
    allocate_schedule, generate_groups, generate_slots, materialize_round_robin, round_robin_pairs,
    unassign_match, GroupBounds,
};
use padel_scheduler::{CourtAvailability, SchedulingConfig, SlotStatus, TournamentError, TournamentStatus};
use std::collections::HashSet;

fn grouped(teams: u32, status: TournamentStatus) -> Fixture {
    let mut f = Fixture::new(status);
    f.add_teams(teams);
    generate_groups(&mut f.store, f.modality_id, GroupBounds::default(), None).unwrap();
    f
}

#[test]
fn round_robin_covers_every_pair_once() {
    for n in 2..8 {
        let pairs = round_robin_pairs(n);
        assert_eq!(pairs.len(), n * (n - 1) / 2);
        let unique: HashSet<_> = pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        assert_eq!(unique.len(), pairs.len());
        assert!(pairs.iter().all(|&(a, b)| a != b));
    }
}

#[test]
fn group_of_five_materializes_ten_matches_once() {
    let mut f = grouped(5, TournamentStatus::Open);
    let group_id = f.group_ids()[0];

    assert_eq!(materialize_round_robin(&mut f.store, group_id).unwrap(), 10);
    assert_eq!(materialize_round_robin(&mut f.store, group_id).unwrap(), 0);

    let matches: Vec<_> = f.store.matches_of_group(group_id).collect();
    assert_eq!(matches.len(), 10);
    assert!(matches.iter().all(|m| m.round_order == 1 && m.round_name == "Group A"));
    assert!(matches.iter().all(|m| m.winner.is_none() && m.slot_id.is_none()));
}

#[test]
fn two_groups_fit_on_two_courts_without_conflicts() {
    let mut f = grouped(8, TournamentStatus::Open);
    f.add_saturday_court();
    f.add_saturday_court();
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();

    let report = allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.created_matches, 12);
    assert_eq!(report.scheduled, 12);
    assert_eq!(report.unscheduled, 0);
    assert_no_double_booking(&f.store);

    let again = allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(again.created_matches, 0);
    assert_eq!(again.scheduled, 0);
    assert_eq!(f.store.matches.len(), 12);
}

#[test]
fn earliest_slot_goes_to_the_first_match() {
    let mut f = grouped(4, TournamentStatus::Open);
    f.add_saturday_court();
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();

    allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    let first = &f.store.matches[0];
    let slot = f.store.slot(first.slot_id.unwrap()).unwrap();
    assert_eq!(slot.start_time, time(9, 0));
}

#[test]
fn shortfall_is_reported_not_raised() {
    let mut f = grouped(4, TournamentStatus::Open);
    f.add_court(vec![CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(12, 0))]);
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();

    let report = allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.created_matches, 6);
    assert_eq!(report.scheduled, 2);
    assert_eq!(report.unscheduled, 4);
    assert_eq!(report.unscheduled_match_ids.len(), 4);
    assert_no_double_booking(&f.store);
}

#[test]
fn overlapping_slots_on_one_court_are_not_double_booked() {
    let mut f = grouped(4, TournamentStatus::Open);
    f.add_court(vec![
        CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(10, 30)),
        CourtAvailability::weekly(Weekday::Sat, time(10, 0), time(11, 30)),
    ]);
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    assert_eq!(f.store.slots.len(), 2);

    let report = allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.scheduled, 1);
    assert_no_double_booking(&f.store);
}

#[test]
fn blocked_and_reserved_slots_are_skipped() {
    let mut f = grouped(4, TournamentStatus::Open);
    f.add_court(vec![CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(13, 30))]);
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    f.store.slots[0].status = SlotStatus::Blocked;
    f.store.slots[1].status = SlotStatus::Reserved;

    let report = allocate_schedule(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.scheduled, 1);
    let used = f.store.matches[0].slot_id.unwrap();
    assert_eq!(used, f.store.slots[2].id);
}

#[test]
fn no_slots_at_all_is_a_hard_failure() {
    let mut f = grouped(4, TournamentStatus::Open);
    let err = allocate_schedule(&mut f.store, f.tournament_id).unwrap_err();
    assert!(matches!(err, TournamentError::NoSlotsAvailable(_)));
    assert!(f.store.matches.is_empty());
}

#[test]
fn unassigning_returns_the_slot() {
    let mut f = grouped(4, TournamentStatus::Open);
    f.add_saturday_court();
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    allocate_schedule(&mut f.store, f.tournament_id).unwrap();

    let match_id = f.store.matches[0].id;
    let slot_id = unassign_match(&mut f.store, match_id).unwrap().unwrap();
    assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Available);
    assert!(f.store.game(match_id).unwrap().slot_id.is_none());
    assert_eq!(unassign_match(&mut f.store, match_id).unwrap(), None);
}
