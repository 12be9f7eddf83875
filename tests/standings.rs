//! Integration tests for group standings.

mod common;

use common::{decide, Fixture};
use padel_scheduler::logic::{compute_standings, generate_groups, group_standings, GroupBounds, POINTS_PER_WIN};
use padel_scheduler::{GameMatch, SetScore, Side, TournamentStatus};
use uuid::Uuid;

fn played(a: Uuid, b: Uuid, winner: Side, sets: &[(u32, u32)]) -> GameMatch {
    let mut m = GameMatch::group_stage(Uuid::new_v4(), Uuid::new_v4(), "Group A", 1, a, b);
    m.winner = Some(winner);
    m.scores = sets.iter().map(|&(x, y)| SetScore::new(x, y)).collect();
    m
}

#[test]
fn points_then_set_difference_order_the_table() {
    let teams: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let (t1, t2, t3, t4) = (teams[0], teams[1], teams[2], teams[3]);
    let matches = vec![
        played(t1, t2, Side::TeamA, &[(6, 4), (6, 3)]),
        played(t3, t4, Side::TeamA, &[(6, 4), (3, 6), (7, 5)]),
        played(t2, t4, Side::TeamA, &[(6, 2), (6, 1)]),
    ];

    let table = compute_standings(&teams, &matches);
    let order: Vec<_> = table.iter().map(|s| s.registration_id).collect();
    assert_eq!(order, vec![t1, t3, t2, t4]);

    let top = &table[0];
    assert_eq!((top.played, top.wins, top.losses, top.points), (1, 1, 0, POINTS_PER_WIN));
    assert_eq!((top.sets_for, top.sets_against), (2, 0));
    assert_eq!(table[1].set_difference(), 1);
    assert_eq!(table[2].set_difference(), 0);

    let last = &table[3];
    assert_eq!((last.played, last.losses, last.points), (2, 2, 0));
    assert_eq!((last.sets_for, last.sets_against), (1, 4));
}

#[test]
fn undecided_and_foreign_matches_are_ignored() {
    let teams: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let outsider = Uuid::new_v4();
    let mut pending = played(teams[0], teams[1], Side::TeamA, &[]);
    pending.winner = None;
    let matches = vec![pending, played(teams[2], outsider, Side::TeamA, &[(6, 0), (6, 0)])];

    let table = compute_standings(&teams, &matches);
    assert!(table.iter().all(|s| s.played == 0 && s.points == 0));
}

#[test]
fn declared_winner_counts_even_against_the_set_tally() {
    let teams: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
    // retirement: team B wins although team A took the only completed set
    let matches = vec![played(teams[0], teams[1], Side::TeamB, &[(6, 2), (1, 0)])];

    let table = compute_standings(&teams, &matches);
    assert_eq!(table[0].registration_id, teams[1]);
    assert_eq!(table[0].points, POINTS_PER_WIN);
    assert_eq!(table[0].sets_for, 0);
    assert_eq!(table[1].sets_for, 2);
}

#[test]
fn full_ties_keep_placement_order() {
    let teams: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let matches = vec![
        played(teams[0], teams[1], Side::TeamB, &[(4, 6), (4, 6)]),
        played(teams[1], teams[2], Side::TeamB, &[(4, 6), (4, 6)]),
        played(teams[2], teams[0], Side::TeamB, &[(4, 6), (4, 6)]),
    ];

    let table = compute_standings(&teams, &matches);
    let order: Vec<_> = table.iter().map(|s| s.registration_id).collect();
    assert_eq!(order, teams);
    assert!(table.iter().all(|s| s.points == POINTS_PER_WIN && s.set_difference() == 0));
}

#[test]
fn group_table_reflects_recorded_matches() {
    let mut f = Fixture::new(TournamentStatus::InProgress);
    let teams = f.add_teams(4);
    generate_groups(&mut f.store, f.modality_id, GroupBounds::default(), None).unwrap();
    let group_id = f.group_ids()[0];

    let fresh = group_standings(&f.store, group_id).unwrap();
    assert_eq!(fresh.len(), 4);
    assert!(fresh.iter().all(|s| s.played == 0));

    f.play_group_stage();
    let table = group_standings(&f.store, group_id).unwrap();
    let order: Vec<_> = table.iter().map(|s| s.registration_id).collect();
    assert_eq!(order, teams);
    assert_eq!(table[0].points, 3 * POINTS_PER_WIN);
    assert_eq!(table[3].points, 0);

    // flip one result and the table follows
    let id = f
        .store
        .matches_of_group(group_id)
        .find(|m| m.team_a == Some(teams[0]) && m.team_b == Some(teams[1]))
        .unwrap()
        .id;
    decide(&mut f.store, id, Side::TeamB, &[(3, 6), (4, 6)]);
    let table = group_standings(&f.store, group_id).unwrap();
    assert_eq!(table[0].registration_id, teams[1]);
}
