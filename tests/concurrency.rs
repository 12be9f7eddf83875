//! Concurrent organizer actions against one shared service.

mod common;

use chrono::Weekday;
use common::{first_day, last_day, time};
use padel_scheduler::{
    CourtAvailability, Database, MatchId, PaymentStatus, RegistrationRequest, ResultPayload,
    SchedulingConfig, SetScore, Side, SlotStatus, TournamentError, TournamentId, TournamentService,
    TournamentStatus,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// In-progress tournament with a 4-team direct bracket and slots on two courts.
fn running_bracket() -> (Arc<TournamentService>, TournamentId) {
    let svc = TournamentService::new(Database::new(16), SchedulingConfig::default());
    let t = svc
        .create_tournament(Uuid::new_v4(), "Copa Invierno", first_day(), last_day())
        .unwrap();
    let modality = svc.add_modality(t.id, "FEMENIL", "5ta", None).unwrap();
    for name in ["Uno", "Dos"] {
        svc.add_court(
            t.id,
            name,
            true,
            vec![CourtAvailability::weekly(Weekday::Sat, time(9, 0), time(21, 0))],
        )
        .unwrap();
    }
    for seed in 1..=4 {
        let request = RegistrationRequest {
            players: [Uuid::new_v4(), Uuid::new_v4()],
            seed: Some(seed),
            payment: PaymentStatus::Confirmed,
            admin_override: false,
        };
        svc.register_team(modality.id, &request).unwrap();
    }
    svc.transition(t.id, TournamentStatus::Open).unwrap();
    svc.generate_slots(t.id).unwrap();
    svc.generate_bracket(t.id, modality.id, None).unwrap();
    svc.transition(t.id, TournamentStatus::InProgress).unwrap();
    (Arc::new(svc), t.id)
}

fn first_semifinal(svc: &TournamentService, tid: TournamentId) -> MatchId {
    let view = svc.tournament_view(tid).unwrap();
    view.matches
        .iter()
        .find(|m| m.round_order == 1 && m.match_order == 1)
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_allocations_never_share_a_slot() {
    let (svc, tid) = running_bracket();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = Arc::clone(&svc);
            tokio::task::spawn_blocking(move || svc.allocate_schedule(tid))
        })
        .collect();

    let mut scheduled = 0;
    for handle in handles {
        scheduled += handle.await.unwrap().unwrap().scheduled;
    }
    assert_eq!(scheduled, 2);

    let view = svc.tournament_view(tid).unwrap();
    let used: Vec<_> = view.matches.iter().filter_map(|m| m.slot_id).collect();
    let unique: HashSet<_> = used.iter().collect();
    assert_eq!(used.len(), 2);
    assert_eq!(unique.len(), 2);
    let assigned = view.slots.iter().filter(|s| s.status == SlotStatus::Assigned).count();
    assert_eq!(assigned, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn conflicting_results_keep_the_first_winner() {
    let (svc, tid) = running_bracket();
    let semifinal = first_semifinal(&svc, tid);

    let submit = |winner: Side| {
        let svc = Arc::clone(&svc);
        let payload = ResultPayload {
            scores: vec![SetScore::new(6, 4), SetScore::new(4, 6), SetScore::new(10, 8)],
            winner,
        };
        tokio::task::spawn_blocking(move || svc.record_result(semifinal, &payload))
    };
    let (a, b) = (submit(Side::TeamA), submit(Side::TeamB));
    let results = [a.await.unwrap(), b.await.unwrap()];

    let ok: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(ok.len(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(TournamentError::AdvancementConflict(_)))));

    let view = svc.tournament_view(tid).unwrap();
    let decided = view.matches.iter().find(|m| m.id == semifinal).unwrap();
    let seat = view
        .matches
        .iter()
        .find(|m| m.round_name == "Final")
        .unwrap()
        .team_a;
    assert_eq!(seat, decided.winning_team());
}

#[test]
fn stale_transaction_is_retried_on_fresh_state() {
    let db = Database::new(3);
    let mut calls = 0;
    let seen = db
        .transaction(|store| {
            calls += 1;
            if calls == 1 {
                // another writer commits while this attempt is still running
                std::thread::scope(|s| {
                    s.spawn(|| db.transaction(|_| Ok(())).unwrap());
                });
            }
            Ok(store.tournaments.len())
        })
        .unwrap();
    assert_eq!(seen, 0);
    assert_eq!(calls, 2);
    assert_eq!(db.revision().unwrap(), 2);
}

#[test]
fn endless_contention_gives_up() {
    let db = Database::new(2);
    let err = db
        .transaction(|_| {
            std::thread::scope(|s| {
                s.spawn(|| db.transaction(|_| Ok(())).unwrap());
            });
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err, TournamentError::TransactionConflict { attempts: 2 });
}
