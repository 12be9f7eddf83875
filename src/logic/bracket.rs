//! Single-elimination bracket generation with standard seeding and bye resolution.

use crate::error::{TournamentError, TournamentResult};
use crate::logic::groups::seeded_registrations;
use crate::logic::lifecycle::ensure_status;
use crate::logic::standings::{group_standings, Standing};
use crate::models::{
    GameMatch, GroupId, MatchId, ModalityId, NextMatch, RegistrationId, Side, TournamentId,
    TournamentStatus,
};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use uuid::Uuid;

/// Who enters the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Qualification {
    /// Every eligible registration, ranked by seed.
    Direct,
    /// Top `per_group` of each group plus `wildcards` best-placed others.
    FromGroups { per_group: u32, wildcards: u32 },
}

/// A team entering the bracket, remembering its group for rematch avoidance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Qualifier {
    pub registration_id: RegistrationId,
    pub group_id: Option<GroupId>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketRound {
    pub round_order: u32,
    pub round_name: String,
    pub matches: Vec<MatchId>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketReport {
    pub size: usize,
    pub qualifiers: usize,
    pub byes: usize,
    pub rounds: Vec<BracketRound>,
    /// Round-1 pairings of two teams from the same group that no swap could fix.
    pub group_rematches: usize,
}

/// Smallest power of two that holds `qualifiers` (at least 2).
pub fn bracket_size(qualifiers: usize) -> usize {
    qualifiers.max(2).next_power_of_two()
}

/// Seeds (1-based) in bracket line order; lines 2i and 2i+1 meet in round 1.
///
/// For 8: 1, 8, 4, 5, 2, 7, 3, 6.
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// Display name of a round from the number of teams still in it.
pub fn round_name(teams_remaining: usize) -> String {
    match teams_remaining {
        2 => "Final".to_string(),
        4 => "Semifinal".to_string(),
        8 => "Quarterfinal".to_string(),
        n => format!("Round of {n}"),
    }
}

/// Lay ranked qualifiers onto bracket lines; missing seeds become byes (None).
pub fn place_qualifiers(qualifiers: &[Qualifier], size: usize) -> Vec<Option<Qualifier>> {
    seed_positions(size)
        .into_iter()
        .map(|seed| qualifiers.get(seed - 1).copied())
        .collect()
}

fn same_group_pair(lines: &[Option<Qualifier>], pair: usize) -> bool {
    match (lines[2 * pair], lines[2 * pair + 1]) {
        (Some(a), Some(b)) => a.group_id.is_some() && a.group_id == b.group_id,
        _ => false,
    }
}

/// Best-effort: swap the weaker team of each same-group round-1 pair with the
/// weaker team of another pair when that leaves both pairs clean. Byes never move.
/// Returns the number of clashes left.
pub fn avoid_group_rematches(lines: &mut [Option<Qualifier>]) -> usize {
    let pairs = lines.len() / 2;
    for i in 0..pairs {
        if !same_group_pair(lines, i) {
            continue;
        }
        for j in (0..pairs).filter(|&j| j != i) {
            if lines[2 * j + 1].is_none() {
                continue;
            }
            lines.swap(2 * i + 1, 2 * j + 1);
            if !same_group_pair(lines, i) && !same_group_pair(lines, j) {
                break;
            }
            lines.swap(2 * i + 1, 2 * j + 1);
        }
    }
    (0..pairs).filter(|&i| same_group_pair(lines, i)).count()
}

/// Rank group finishers: all group winners, then all runners-up, ..., then wildcards.
fn group_qualifiers(
    store: &Store,
    modality_id: ModalityId,
    per_group: u32,
    wildcards: u32,
) -> TournamentResult<Vec<Qualifier>> {
    let groups = store.groups_of(modality_id);
    if groups.is_empty() {
        return Err(TournamentError::InvalidConfiguration(
            "qualification from groups requires a group stage".to_string(),
        ));
    }
    if per_group == 0 {
        return Err(TournamentError::OddQualificationCount(
            "zero qualifiers per group".to_string(),
        ));
    }

    let mut tables: Vec<(GroupId, Vec<Standing>)> = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut matches = store.matches_of_group(group.id).peekable();
        if matches.peek().is_none() || matches.any(|m| !m.is_decided()) {
            return Err(TournamentError::InvalidConfiguration(format!(
                "{} has not finished its matches",
                group.name
            )));
        }
        tables.push((group.id, group_standings(store, group.id)?));
    }

    let per_group = per_group as usize;
    if let Some((_, smallest)) = tables.iter().min_by_key(|(_, t)| t.len()) {
        if per_group > smallest.len() {
            return Err(TournamentError::OddQualificationCount(format!(
                "{per_group} qualifiers per group but a group has only {} teams",
                smallest.len()
            )));
        }
    }

    // (tier, group index, row)
    let rows: Vec<(usize, usize, &Standing)> = tables
        .iter()
        .enumerate()
        .flat_map(|(g, (_, table))| table.iter().enumerate().map(move |(tier, s)| (tier, g, s)))
        .collect();
    let rank_key = |&(tier, g, s): &(usize, usize, &Standing)| {
        (tier, Reverse(s.points), Reverse(s.set_difference()), g)
    };

    let mut qualified: Vec<_> = rows.iter().filter(|(tier, _, _)| *tier < per_group).collect();
    qualified.sort_by_key(|row| rank_key(*row));
    let mut pool: Vec<_> = rows.iter().filter(|(tier, _, _)| *tier >= per_group).collect();
    if wildcards as usize > pool.len() {
        return Err(TournamentError::OddQualificationCount(format!(
            "{wildcards} wildcards requested but only {} teams remain",
            pool.len()
        )));
    }
    pool.sort_by_key(|row| rank_key(*row));

    Ok(qualified
        .into_iter()
        .chain(pool.into_iter().take(wildcards as usize))
        .map(|&(_, g, s)| Qualifier {
            registration_id: s.registration_id,
            group_id: Some(tables[g].0),
        })
        .collect())
}

/// What a bracket line carries into the next round while the tree is being built.
#[derive(Clone, Copy, Debug)]
enum Feed {
    Team(RegistrationId),
    /// No team will ever arrive (bye).
    Vacant,
    /// Decided by a match still to be played.
    Pending,
}

/// Build the full bracket for a modality and resolve byes transitively.
pub fn generate_bracket(
    store: &mut Store,
    tournament_id: TournamentId,
    modality_id: ModalityId,
    qualification: Qualification,
    now: DateTime<Utc>,
) -> TournamentResult<BracketReport> {
    if store.modality(modality_id)?.tournament_id != tournament_id {
        return Err(TournamentError::InvalidConfiguration(format!(
            "modality {modality_id} does not belong to tournament {tournament_id}"
        )));
    }
    ensure_status(
        store,
        tournament_id,
        &[TournamentStatus::Open, TournamentStatus::InProgress],
        "generate bracket",
    )?;
    if store.matches_of_modality(modality_id).any(|m| m.is_knockout()) {
        return Err(TournamentError::AlreadyGenerated(
            "bracket already exists for this modality".to_string(),
        ));
    }

    let qualifiers: Vec<Qualifier> = match qualification {
        Qualification::Direct => seeded_registrations(store, modality_id)
            .into_iter()
            .map(|r| Qualifier {
                registration_id: r.id,
                group_id: None,
            })
            .collect(),
        Qualification::FromGroups {
            per_group,
            wildcards,
        } => group_qualifiers(store, modality_id, per_group, wildcards)?,
    };
    if qualifiers.len() < 2 {
        return Err(TournamentError::InsufficientTeams {
            needed: 2,
            found: qualifiers.len(),
        });
    }

    let size = bracket_size(qualifiers.len());
    let mut lines = place_qualifiers(&qualifiers, size);
    let group_rematches = avoid_group_rematches(&mut lines);
    if group_rematches > 0 {
        log::warn!("{group_rematches} first-round pairing(s) repeat a group-stage match");
    }

    let has_group_stage = !store.groups_of(modality_id).is_empty();
    let offset = u32::from(has_group_stage);
    let rounds = size.trailing_zeros() as usize;
    let ids: Vec<Vec<MatchId>> = (1..=rounds)
        .map(|r| (0..size >> r).map(|_| Uuid::new_v4()).collect())
        .collect();

    let mut feeds: Vec<Feed> = lines
        .iter()
        .map(|line| match line {
            Some(q) => Feed::Team(q.registration_id),
            None => Feed::Vacant,
        })
        .collect();
    let mut created: Vec<GameMatch> = Vec::with_capacity(size - 1);
    let mut report_rounds = Vec::with_capacity(rounds);

    for r in 0..rounds {
        let name = round_name(size >> r);
        let round_order = offset + r as u32 + 1;
        let mut next_feeds = Vec::with_capacity(feeds.len() / 2);
        for i in 0..feeds.len() / 2 {
            let next = ids.get(r + 1).map(|next_round| NextMatch {
                match_id: next_round[i / 2],
                side: if i % 2 == 0 { Side::TeamA } else { Side::TeamB },
            });
            let mut m = GameMatch::knockout(ids[r][i], modality_id, name.clone(), round_order, i as u32 + 1, next);
            let (a, b) = (feeds[2 * i], feeds[2 * i + 1]);
            if let Feed::Team(id) = a {
                m.team_a = Some(id);
            }
            if let Feed::Team(id) = b {
                m.team_b = Some(id);
            }
            let out = match (a, b) {
                (Feed::Team(id), Feed::Vacant) => {
                    resolve_bye(&mut m, Side::TeamA, now);
                    Feed::Team(id)
                }
                (Feed::Vacant, Feed::Team(id)) => {
                    resolve_bye(&mut m, Side::TeamB, now);
                    Feed::Team(id)
                }
                (Feed::Vacant, Feed::Vacant) => {
                    m.bye = true;
                    Feed::Vacant
                }
                _ => Feed::Pending,
            };
            next_feeds.push(out);
            created.push(m);
        }
        report_rounds.push(BracketRound {
            round_order,
            round_name: name,
            matches: ids[r].clone(),
        });
        feeds = next_feeds;
    }

    let report = BracketReport {
        size,
        qualifiers: qualifiers.len(),
        byes: size - qualifiers.len(),
        rounds: report_rounds,
        group_rematches,
    };
    store.matches.extend(created);
    Ok(report)
}

fn resolve_bye(m: &mut GameMatch, winner: Side, now: DateTime<Utc>) {
    m.winner = Some(winner);
    m.bye = true;
    m.played_at = Some(now);
}
