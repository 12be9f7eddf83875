//! Integration tests for slot generation.

mod common;

use chrono::Weekday;
use common::{date, time, Fixture};
use padel_scheduler::logic::{generate_court_slots, generate_slots, set_slot_blocked, slice_window};
use padel_scheduler::{CourtAvailability, SchedulingConfig, SlotStatus, TournamentError, TournamentStatus};
use uuid::Uuid;

#[test]
fn window_slices_into_full_slots_and_keeps_long_enough_tail() {
    let slices = slice_window(time(9, 0), time(13, 0), 90, 60);
    assert_eq!(
        slices,
        vec![
            (time(9, 0), time(10, 30)),
            (time(10, 30), time(12, 0)),
            (time(12, 0), time(13, 0)),
        ]
    );
}

#[test]
fn short_tail_is_dropped() {
    let slices = slice_window(time(9, 0), time(12, 30), 90, 60);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[1], (time(10, 30), time(12, 0)));
}

#[test]
fn weekly_and_dated_windows_expand_over_the_span() {
    let mut f = Fixture::new(TournamentStatus::Draft);
    f.add_court(vec![
        CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(13, 0)),
        CourtAvailability::on_date(date(2026, 3, 6), time(18, 0), time(21, 0)),
        // outside the tournament span
        CourtAvailability::on_date(date(2026, 4, 1), time(9, 0), time(21, 0)),
    ]);

    let report = generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    assert_eq!(report.courts, 1);
    assert_eq!(report.created, 5);
    assert_eq!(report.existing, 0);

    let friday: Vec<_> = f.store.slots.iter().filter(|s| s.date == date(2026, 3, 6)).collect();
    assert_eq!(friday.len(), 2);
    assert!(f.store.slots.iter().all(|s| s.status == SlotStatus::Available));
    assert!(f.store.slots.iter().all(|s| s.date != date(2026, 3, 8)));
}

#[test]
fn regeneration_is_idempotent() {
    let mut f = Fixture::new(TournamentStatus::Open);
    f.add_saturday_court();
    f.add_saturday_court();
    let config = SchedulingConfig::default();

    let first = generate_slots(&mut f.store, f.tournament_id, &config).unwrap();
    let before = f.store.slots.clone();
    let second = generate_slots(&mut f.store, f.tournament_id, &config).unwrap();

    assert_eq!(first.created, 16);
    assert_eq!(second.created, 0);
    assert_eq!(second.existing, 16);
    assert_eq!(f.store.slots, before);
}

#[test]
fn blocked_slots_are_not_recreated() {
    let mut f = Fixture::new(TournamentStatus::Open);
    f.add_saturday_court();
    let config = SchedulingConfig::default();
    generate_slots(&mut f.store, f.tournament_id, &config).unwrap();

    let slot_id = f.store.slots[0].id;
    assert_eq!(set_slot_blocked(&mut f.store, slot_id, true).unwrap(), SlotStatus::Blocked);
    let report = generate_slots(&mut f.store, f.tournament_id, &config).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Blocked);

    assert_eq!(set_slot_blocked(&mut f.store, slot_id, false).unwrap(), SlotStatus::Available);
}

#[test]
fn court_without_windows_is_invalid() {
    let mut f = Fixture::new(TournamentStatus::Open);
    f.add_saturday_court();
    f.add_court(Vec::new());

    let err = generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidConfiguration(_)));
}

#[test]
fn inverted_window_is_invalid() {
    let mut f = Fixture::new(TournamentStatus::Open);
    f.add_court(vec![CourtAvailability::weekly(Weekday::Sat, time(13, 0), time(9, 0))]);
    let err = generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap_err();
    assert_eq!(err.kind(), "InvalidConfiguration");
}

#[test]
fn tournament_without_courts_is_invalid() {
    let mut f = Fixture::new(TournamentStatus::Open);
    let err = generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidConfiguration(_)));
}

#[test]
fn court_with_assigned_slots_refuses_regeneration() {
    let mut f = Fixture::new(TournamentStatus::Open);
    let court_id = f.add_saturday_court();
    let config = SchedulingConfig::default();
    generate_slots(&mut f.store, f.tournament_id, &config).unwrap();

    let slot_id = f.store.slots[0].id;
    f.store.claim_slot(slot_id, Uuid::new_v4()).unwrap();

    let err = generate_slots(&mut f.store, f.tournament_id, &config).unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyScheduled(_)));

    // a court added later can still get its own slots
    let fresh = f.add_saturday_court();
    let report = generate_court_slots(&mut f.store, fresh, &config).unwrap();
    assert_eq!(report.created, 8);
    assert_eq!(f.store.slots_of_court(court_id).count(), 8);
}

#[test]
fn assigned_slot_cannot_be_blocked() {
    let mut f = Fixture::new(TournamentStatus::Open);
    f.add_saturday_court();
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    let slot_id = f.store.slots[0].id;
    f.store.claim_slot(slot_id, Uuid::new_v4()).unwrap();

    assert!(set_slot_blocked(&mut f.store, slot_id, true).is_err());
    assert!(f.store.claim_slot(slot_id, Uuid::new_v4()).is_err());
}

#[test]
fn cancelled_tournament_refuses_slot_generation() {
    let mut f = Fixture::new(TournamentStatus::Cancelled);
    f.add_saturday_court();
    let err = generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState { .. }));
}

#[test]
fn finished_tournament_slots_stay_as_they_are() {
    let mut f = Fixture::new(TournamentStatus::InProgress);
    f.add_saturday_court();
    generate_slots(&mut f.store, f.tournament_id, &SchedulingConfig::default()).unwrap();
    let slot_id = f.store.slots[0].id;

    f.set_status(TournamentStatus::Completed);
    let err = set_slot_blocked(&mut f.store, slot_id, true).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState { .. }));
    assert_eq!(f.store.slot(slot_id).unwrap().status, SlotStatus::Available);
}
