//! Shared fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Weekday};
use padel_scheduler::logic::materialize_round_robin;
use padel_scheduler::{
    Court, CourtAvailability, CourtId, GroupId, MatchId, Modality, ModalityId, PaymentStatus,
    Registration, RegistrationId, SetScore, Side, SlotStatus, Store, Tournament, TournamentId,
    TournamentStatus,
};
use std::collections::HashSet;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Friday 2026-03-06 .. Sunday 2026-03-08.
pub fn first_day() -> NaiveDate {
    date(2026, 3, 6)
}

pub fn last_day() -> NaiveDate {
    date(2026, 3, 8)
}

/// A store holding one tournament with one modality.
pub struct Fixture {
    pub store: Store,
    pub tournament_id: TournamentId,
    pub modality_id: ModalityId,
}

impl Fixture {
    pub fn new(status: TournamentStatus) -> Self {
        let mut tournament = Tournament::new(Uuid::new_v4(), "Copa Primavera", first_day(), last_day()).unwrap();
        tournament.status = status;
        let modality = Modality::new(tournament.id, "VARONIL", "4ta", None);
        let (tournament_id, modality_id) = (tournament.id, modality.id);
        let mut store = Store::new();
        store.tournaments.push(tournament);
        store.modalities.push(modality);
        Self {
            store,
            tournament_id,
            modality_id,
        }
    }

    pub fn set_status(&mut self, status: TournamentStatus) {
        self.store.tournament_mut(self.tournament_id).unwrap().status = status;
    }

    /// `n` confirmed teams seeded 1..=n, in creation order.
    pub fn add_teams(&mut self, n: u32) -> Vec<RegistrationId> {
        (1..=n).map(|seed| self.add_team(Some(seed))).collect()
    }

    pub fn add_team(&mut self, seed: Option<u32>) -> RegistrationId {
        let mut r = Registration::new(self.modality_id, [Uuid::new_v4(), Uuid::new_v4()], seed);
        r.payment = PaymentStatus::Confirmed;
        let id = r.id;
        self.store.registrations.push(r);
        id
    }

    pub fn add_court(&mut self, availability: Vec<CourtAvailability>) -> CourtId {
        let n = self.store.courts.len() + 1;
        let court = Court::new(self.tournament_id, format!("Court {n}"), n % 2 == 0, availability);
        let id = court.id;
        self.store.courts.push(court);
        id
    }

    /// Court open Saturday 09:00-21:00 (eight 90-minute slots).
    pub fn add_saturday_court(&mut self) -> CourtId {
        self.add_court(vec![CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(21, 0))])
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.store
            .groups_of(self.modality_id)
            .iter()
            .map(|g| g.id)
            .collect()
    }

    /// Materialize every group's round robin and decide each match for the
    /// placement-order stronger side (team A) 6-3 6-4.
    pub fn play_group_stage(&mut self) {
        for group_id in self.group_ids() {
            materialize_round_robin(&mut self.store, group_id).unwrap();
            let ids: Vec<MatchId> = self.store.matches_of_group(group_id).map(|m| m.id).collect();
            for id in ids {
                decide(&mut self.store, id, Side::TeamA, &[(6, 3), (6, 4)]);
            }
        }
    }
}

/// Write a result straight into the store (bypassing status gates).
pub fn decide(store: &mut Store, match_id: MatchId, winner: Side, sets: &[(u32, u32)]) {
    let m = store.game_mut(match_id).unwrap();
    m.winner = Some(winner);
    m.scores = sets.iter().map(|&(a, b)| SetScore::new(a, b)).collect();
    m.played_at = Some(chrono::Utc::now());
}

/// No slot holds two matches, and no team plays in two overlapping slots.
pub fn assert_no_double_booking(store: &Store) {
    let mut seen_slots = HashSet::new();
    for m in store.matches.iter().filter(|m| m.slot_id.is_some()) {
        let slot_id = m.slot_id.unwrap();
        assert!(seen_slots.insert(slot_id), "slot {slot_id} used twice");
        let slot = store.slot(slot_id).unwrap();
        assert_eq!(slot.status, SlotStatus::Assigned);
        assert_eq!(slot.match_id, Some(m.id));
    }

    let booked: Vec<_> = store
        .matches
        .iter()
        .filter_map(|m| m.slot_id.map(|s| (m, store.slot(s).unwrap())))
        .collect();
    for (i, (m1, s1)) in booked.iter().enumerate() {
        for (m2, s2) in booked.iter().skip(i + 1) {
            if s1.overlaps(s2.date, s2.start_time, s2.end_time) {
                let shared = [m1.team_a, m1.team_b]
                    .into_iter()
                    .flatten()
                    .any(|t| m2.involves(t));
                assert!(!shared, "a team plays {} and {} at the same time", m1.id, m2.id);
                assert_ne!(s1.court_id, s2.court_id, "court double-booked");
            }
        }
    }
}
