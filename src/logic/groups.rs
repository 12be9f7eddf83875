//! Group stage setup: balanced group counts and serpentine seeding of registrations.

use crate::config::SchedulingConfig;
use crate::error::{TournamentError, TournamentResult};
use crate::logic::lifecycle::ensure_status;
use crate::models::{
    Group, GroupId, GroupPlacement, ModalityId, Registration, RegistrationId, TournamentStatus,
};
use crate::store::Store;
use serde::Serialize;

/// Size limits for generated groups.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupBounds {
    pub min: usize,
    pub max: usize,
    pub preferred: usize,
}

impl From<&SchedulingConfig> for GroupBounds {
    fn from(config: &SchedulingConfig) -> Self {
        Self {
            min: config.group_min_size,
            max: config.group_max_size,
            preferred: config.group_preferred_size,
        }
    }
}

impl Default for GroupBounds {
    fn default() -> Self {
        (&SchedulingConfig::default()).into()
    }
}

/// A generated group and its registrations in seed order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GeneratedGroup {
    pub group: Group,
    pub registrations: Vec<RegistrationId>,
}

/// Whether `k` groups over `n` teams keep every group within the bounds.
fn fits(n: usize, k: usize, bounds: GroupBounds) -> bool {
    k > 0 && k <= n && n / k >= bounds.min && n.div_ceil(k) <= bounds.max
}

/// Pick the group count for `n` teams: among feasible counts, the one whose
/// largest group is closest to the preferred size (fewer groups on ties).
pub fn choose_group_count(n: usize, bounds: GroupBounds) -> Option<usize> {
    if n < bounds.min || bounds.min == 0 {
        return None;
    }
    let lo = n.div_ceil(bounds.max.max(1));
    let hi = n / bounds.min;
    (lo..=hi)
        .filter(|&k| fits(n, k, bounds))
        .min_by_key(|&k| n.div_ceil(k).abs_diff(bounds.preferred))
}

/// Group index (0-based) for each of `count` ranked entries, snaking across `groups`.
///
/// With 2 groups: 0, 1, 1, 0, 0, 1, 1, 0, ...
pub fn serpentine_assignment(count: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let lap = i / groups;
            let pos = i % groups;
            if lap % 2 == 0 {
                pos
            } else {
                groups - 1 - pos
            }
        })
        .collect()
}

/// Eligible registrations of a modality ordered by seed; unseeded last, ties by creation order.
pub fn seeded_registrations(store: &Store, modality_id: ModalityId) -> Vec<&Registration> {
    let mut regs: Vec<_> = store
        .registrations_of(modality_id)
        .filter(|r| r.is_eligible())
        .collect();
    regs.sort_by_key(|r| (r.seed.is_none(), r.seed));
    regs
}

/// Create groups and placements for a modality.
///
/// `requested` forces a group count; otherwise [`choose_group_count`] decides.
pub fn generate_groups(
    store: &mut Store,
    modality_id: ModalityId,
    bounds: GroupBounds,
    requested: Option<usize>,
) -> TournamentResult<Vec<GeneratedGroup>> {
    let tournament_id = store.modality(modality_id)?.tournament_id;
    ensure_status(
        store,
        tournament_id,
        &[TournamentStatus::Open, TournamentStatus::InProgress],
        "generate groups",
    )?;
    if store.matches_of_modality(modality_id).any(|m| m.is_knockout()) {
        return Err(TournamentError::AlreadyGenerated(
            "bracket already generated for this modality".to_string(),
        ));
    }
    if !store.groups_of(modality_id).is_empty() {
        return Err(TournamentError::AlreadyGenerated(
            "groups already exist for this modality; clear them first".to_string(),
        ));
    }

    let teams: Vec<RegistrationId> = seeded_registrations(store, modality_id)
        .into_iter()
        .map(|r| r.id)
        .collect();
    let n = teams.len();
    if n < bounds.min {
        return Err(TournamentError::InsufficientTeams {
            needed: bounds.min,
            found: n,
        });
    }

    let k = match requested {
        Some(k) if fits(n, k, bounds) => k,
        Some(k) => {
            return Err(TournamentError::InvalidConfiguration(format!(
                "{k} group(s) for {n} teams breaks the {}..={} group size bounds",
                bounds.min, bounds.max
            )))
        }
        None => choose_group_count(n, bounds).ok_or_else(|| {
            TournamentError::InvalidConfiguration(format!(
                "no group count fits {n} teams into groups of {}..={}",
                bounds.min, bounds.max
            ))
        })?,
    };

    let mut buckets: Vec<Vec<RegistrationId>> = vec![Vec::new(); k];
    for (team, g) in teams.into_iter().zip(serpentine_assignment(n, k)) {
        buckets[g].push(team);
    }

    let mut generated = Vec::with_capacity(k);
    for (i, bucket) in buckets.into_iter().enumerate() {
        let group = Group::new(modality_id, i as u32 + 1, bucket.len() as u32);
        for (pos, &registration_id) in bucket.iter().enumerate() {
            store.placements.push(GroupPlacement {
                group_id: group.id,
                registration_id,
                seed: pos as u32 + 1,
            });
        }
        store.groups.push(group.clone());
        generated.push(GeneratedGroup {
            group,
            registrations: bucket,
        });
    }
    Ok(generated)
}

/// Remove all groups of a modality, their placements and their unplayed matches.
pub fn clear_groups(store: &mut Store, modality_id: ModalityId) -> TournamentResult<usize> {
    let tournament_id = store.modality(modality_id)?.tournament_id;
    ensure_status(
        store,
        tournament_id,
        &[TournamentStatus::Open, TournamentStatus::InProgress],
        "clear groups",
    )?;
    if store.matches_of_modality(modality_id).any(|m| m.is_knockout()) {
        return Err(TournamentError::AlreadyGenerated(
            "bracket already built on these groups".to_string(),
        ));
    }
    let group_ids: Vec<GroupId> = store.groups_of(modality_id).iter().map(|g| g.id).collect();
    let group_matches: Vec<_> = store
        .matches
        .iter()
        .filter(|m| m.group_id().is_some_and(|g| group_ids.contains(&g)))
        .collect();
    if group_matches.iter().any(|m| m.is_decided()) {
        return Err(TournamentError::AlreadyScheduled(
            "group results already recorded".to_string(),
        ));
    }
    let slot_ids: Vec<_> = group_matches.iter().filter_map(|m| m.slot_id).collect();
    for slot_id in slot_ids {
        store.release_slot(slot_id)?;
    }
    store
        .matches
        .retain(|m| !m.group_id().is_some_and(|g| group_ids.contains(&g)));
    store.placements.retain(|p| !group_ids.contains(&p.group_id));
    store.groups.retain(|g| !group_ids.contains(&g.id));
    Ok(group_ids.len())
}

/// Exchange the groups of two registrations of the same modality (before any group match exists).
pub fn swap_placements(
    store: &mut Store,
    first: RegistrationId,
    second: RegistrationId,
) -> TournamentResult<()> {
    let find = |store: &Store, reg: RegistrationId| {
        store
            .placements
            .iter()
            .position(|p| p.registration_id == reg)
            .ok_or(TournamentError::not_found("group placement", reg))
    };
    let (i, j) = (find(store, first)?, find(store, second)?);
    let (ga, gb) = (store.placements[i].group_id, store.placements[j].group_id);
    if store.group(ga)?.modality_id != store.group(gb)?.modality_id {
        return Err(TournamentError::InvalidConfiguration(
            "registrations belong to different modalities".to_string(),
        ));
    }
    if store.matches_of_group(ga).next().is_some() || store.matches_of_group(gb).next().is_some() {
        return Err(TournamentError::AlreadyScheduled(
            "group matches already generated".to_string(),
        ));
    }
    store.placements[i].registration_id = second;
    store.placements[j].registration_id = first;
    Ok(())
}

/// Drop a registration that no group or bracket has picked up yet.
pub fn withdraw_registration(store: &mut Store, registration_id: RegistrationId) -> TournamentResult<()> {
    let modality_id = store.registration(registration_id)?.modality_id;
    let tournament_id = store.modality(modality_id)?.tournament_id;
    ensure_status(
        store,
        tournament_id,
        &[
            TournamentStatus::Draft,
            TournamentStatus::Open,
            TournamentStatus::InProgress,
        ],
        "withdraw registrations",
    )?;
    if store.placements.iter().any(|p| p.registration_id == registration_id)
        || store
            .matches_of_modality(modality_id)
            .any(|m| m.involves(registration_id))
    {
        return Err(TournamentError::AlreadyGenerated(
            "registration is already placed in a group or bracket".to_string(),
        ));
    }
    store.registrations.retain(|r| r.id != registration_id);
    Ok(())
}
