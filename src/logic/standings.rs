//! Group standings, recomputed from scratch on every call.

use crate::error::TournamentResult;
use crate::models::{GameMatch, GroupId, RegistrationId, Side};
use crate::store::Store;
use serde::Serialize;
use std::cmp::Reverse;

/// Standings points for a win. Losses score nothing.
pub const POINTS_PER_WIN: u32 = 3;

/// One row of a group table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub registration_id: RegistrationId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub sets_for: u32,
    pub sets_against: u32,
}

impl Standing {
    fn new(registration_id: RegistrationId) -> Self {
        Self {
            registration_id,
            played: 0,
            wins: 0,
            losses: 0,
            points: 0,
            sets_for: 0,
            sets_against: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_for) - i64::from(self.sets_against)
    }
}

/// Table for `teams` (in placement order) from the decided matches among `matches`.
///
/// Ordered by points, then set difference, then placement order.
pub fn compute_standings<'a>(
    teams: &[RegistrationId],
    matches: impl IntoIterator<Item = &'a GameMatch>,
) -> Vec<Standing> {
    let mut table: Vec<Standing> = teams.iter().copied().map(Standing::new).collect();
    let index = |table: &[Standing], id: Option<RegistrationId>| {
        id.and_then(|id| table.iter().position(|s| s.registration_id == id))
    };

    for m in matches {
        let Some(winner) = m.winner else { continue };
        let (Some(a), Some(b)) = (index(&table, m.team_a), index(&table, m.team_b)) else {
            continue;
        };
        let (won, lost) = match winner {
            Side::TeamA => (a, b),
            Side::TeamB => (b, a),
        };
        table[won].wins += 1;
        table[won].points += POINTS_PER_WIN;
        table[lost].losses += 1;
        table[a].played += 1;
        table[b].played += 1;

        for set in &m.scores {
            match set.taken_by() {
                Some(Side::TeamA) => {
                    table[a].sets_for += 1;
                    table[b].sets_against += 1;
                }
                Some(Side::TeamB) => {
                    table[b].sets_for += 1;
                    table[a].sets_against += 1;
                }
                None => {}
            }
        }
    }

    table.sort_by_key(|s| (Reverse(s.points), Reverse(s.set_difference())));
    table
}

/// Current standings of a group.
pub fn group_standings(store: &Store, group_id: GroupId) -> TournamentResult<Vec<Standing>> {
    store.group(group_id)?;
    let teams: Vec<RegistrationId> = store
        .placements_of(group_id)
        .iter()
        .map(|p| p.registration_id)
        .collect();
    Ok(compute_standings(&teams, store.matches_of_group(group_id)))
}
